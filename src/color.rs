//! RGBA colors and CSS-style color parsing.
//!
//! Gradient stops are configured as strings (`"white"`, `"gold"`,
//! `"#ff4500"`) and parsed into [`Color`] values once, when the
//! configuration is built or deserialized.
//!
//! ```ignore
//! let gold: Color = "gold".parse()?;
//! let half_red: Color = "#ff000080".parse()?;
//! ```

use std::fmt;
use std::str::FromStr;

use glam::Vec4;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ColorParseError;

/// Named colors understood by the parser, as `0xRRGGBB`.
const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xffffff),
    ("red", 0xff0000),
    ("lime", 0x00ff00),
    ("green", 0x008000),
    ("blue", 0x0000ff),
    ("yellow", 0xffff00),
    ("cyan", 0x00ffff),
    ("aqua", 0x00ffff),
    ("magenta", 0xff00ff),
    ("fuchsia", 0xff00ff),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("silver", 0xc0c0c0),
    ("maroon", 0x800000),
    ("olive", 0x808000),
    ("navy", 0x000080),
    ("purple", 0x800080),
    ("teal", 0x008080),
    ("orange", 0xffa500),
    ("orangered", 0xff4500),
    ("gold", 0xffd700),
    ("goldenrod", 0xdaa520),
    ("crimson", 0xdc143c),
    ("coral", 0xff7f50),
    ("tomato", 0xff6347),
    ("salmon", 0xfa8072),
    ("pink", 0xffc0cb),
    ("hotpink", 0xff69b4),
    ("deeppink", 0xff1493),
    ("violet", 0xee82ee),
    ("indigo", 0x4b0082),
    ("skyblue", 0x87ceeb),
    ("deepskyblue", 0x00bfff),
    ("dodgerblue", 0x1e90ff),
    ("royalblue", 0x4169e1),
    ("midnightblue", 0x191970),
    ("turquoise", 0x40e0d0),
    ("khaki", 0xf0e68c),
    ("lavender", 0xe6e6fa),
];

/// A straight (non-premultiplied) RGBA color with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub Vec4);

impl Color {
    pub const TRANSPARENT: Color = Color(Vec4::ZERO);
    pub const BLACK: Color = Color(Vec4::new(0.0, 0.0, 0.0, 1.0));
    pub const WHITE: Color = Color(Vec4::ONE);

    /// Opaque color from 0-1 channels.
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self(Vec4::new(r, g, b, 1.0))
    }

    /// Color from 0-1 channels including alpha.
    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self(Vec4::new(r, g, b, a))
    }

    /// Opaque color from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self::from_rgba8(
            ((hex >> 16) & 0xff) as u8,
            ((hex >> 8) & 0xff) as u8,
            (hex & 0xff) as u8,
            255,
        )
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0)
    }

    pub fn r(&self) -> f32 {
        self.0.x
    }

    pub fn g(&self) -> f32 {
        self.0.y
    }

    pub fn b(&self) -> f32 {
        self.0.z
    }

    pub fn alpha(&self) -> f32 {
        self.0.w
    }

    /// Same color with its alpha multiplied by `factor`.
    pub fn with_alpha_scaled(self, factor: f32) -> Self {
        let mut v = self.0;
        v.w *= factor.clamp(0.0, 1.0);
        Self(v)
    }

    /// Linear interpolation between two colors, `t` in `0.0..=1.0`.
    pub fn lerp(self, other: Color, t: f32) -> Self {
        Self(self.0.lerp(other.0, t.clamp(0.0, 1.0)))
    }

    /// Channels as 8-bit values, rounded and clamped.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let c = (self.0.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
        [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
    }

    fn parse_hex(text: &str) -> Result<Self, ColorParseError> {
        let digits = &text[1..];
        let invalid = || ColorParseError::InvalidHex(text.to_string());
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).map(|n| n * 17);
        let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16);

        let channels = match digits.len() {
            3 => [nibble(0), nibble(1), nibble(2), Ok(255)],
            4 => [nibble(0), nibble(1), nibble(2), nibble(3)],
            6 => [byte(0), byte(2), byte(4), Ok(255)],
            8 => [byte(0), byte(2), byte(4), byte(6)],
            _ => return Err(invalid()),
        };
        let [r, g, b, a] = channels;
        match (r, g, b, a) {
            (Ok(r), Ok(g), Ok(b), Ok(a)) => Ok(Self::from_rgba8(r, g, b, a)),
            _ => Err(invalid()),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.starts_with('#') {
            return Self::parse_hex(text);
        }
        let name = text.to_ascii_lowercase();
        if name == "transparent" {
            return Ok(Color::TRANSPARENT);
        }
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, hex)| Color::from_hex(*hex))
            .ok_or(ColorParseError::UnknownName(text.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
