//! Error types for the constellation effect.
//!
//! The simulation core never fails. These errors belong to the edges of the
//! crate: parsing colors, loading configuration files and exporting frames.

use std::fmt;

/// Error returned when a color string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    /// The string is not a known color name.
    UnknownName(String),
    /// The string starts with `#` but is not a valid hex color.
    InvalidHex(String),
}

impl fmt::Display for ColorParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorParseError::UnknownName(name) => write!(f, "Unknown color name: '{}'", name),
            ColorParseError::InvalidHex(text) => write!(f, "Invalid hex color: '{}'. Expected #rgb, #rrggbb or #rrggbbaa.", text),
        }
    }
}

impl std::error::Error for ColorParseError {}

/// Errors that can occur while loading or saving a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    Io(std::io::Error),
    /// The file is not valid configuration JSON.
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Json(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors that can occur when exporting a rendered frame.
#[derive(Debug)]
pub enum ExportError {
    /// Failed to encode the image.
    Image(image::ImageError),
    /// Failed to write the output file.
    Io(std::io::Error),
    /// Pixel buffer length does not match the canvas dimensions.
    BufferSize {
        width: u32,
        height: u32,
        len: usize,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Image(e) => write!(f, "Failed to encode image: {}", e),
            ExportError::Io(e) => write!(f, "Failed to write image file: {}", e),
            ExportError::BufferSize { width, height, len } => write!(
                f,
                "Pixel buffer of {} bytes does not fit a {}x{} canvas",
                len, width, height
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Image(e) => Some(e),
            ExportError::Io(e) => Some(e),
            ExportError::BufferSize { .. } => None,
        }
    }
}

impl From<image::ImageError> for ExportError {
    fn from(e: image::ImageError) -> Self {
        ExportError::Image(e)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(e: std::io::Error) -> Self {
        ExportError::Io(e)
    }
}
