//! CPU rasterizer implementing [`DrawContext`].
//!
//! Pixels are straight-alpha RGBA8, row-major, origin at the top-left.
//! Fills use non-zero winding sampled at pixel centers. Strokes are
//! anti-aliased by distance to the segment.

use std::f32::consts::TAU;
use std::path::Path;

use glam::Vec2;
use image::RgbaImage;

use super::{DrawContext, FillStyle};
use crate::color::Color;
use crate::error::ExportError;

#[derive(Debug, Clone)]
struct PaintState {
    fill: FillStyle,
    stroke: Color,
    line_width: f32,
    global_alpha: f32,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill: FillStyle::default(),
            stroke: Color::BLACK,
            line_width: 1.0,
            global_alpha: 1.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Subpath {
    points: Vec<Vec2>,
    closed: bool,
}

/// Software canvas with an RGBA8 pixel buffer.
pub struct RasterCanvas {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
    state: PaintState,
    saved: Vec<PaintState>,
    path: Vec<Subpath>,
}

impl RasterCanvas {
    /// Create a transparent canvas.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; 4]; width as usize * height as usize],
            state: PaintState::default(),
            saved: Vec::new(),
            path: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Resize the backing buffer. Contents are cleared, paint state is kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![[0; 4]; width as usize * height as usize];
    }

    /// Pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x < self.width && y < self.height {
            Some(self.pixels[(y * self.width + x) as usize])
        } else {
            None
        }
    }

    /// Raw pixel bytes, four per pixel.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Copy the buffer into an image.
    pub fn to_image(&self) -> Result<RgbaImage, ExportError> {
        let bytes = self.as_bytes().to_vec();
        let len = bytes.len();
        RgbaImage::from_raw(self.width, self.height, bytes).ok_or(ExportError::BufferSize {
            width: self.width,
            height: self.height,
            len,
        })
    }

    /// Copy the buffer into an image, composited over an opaque background.
    pub fn to_image_over(&self, background: Color) -> Result<RgbaImage, ExportError> {
        let mut image = self.to_image()?;
        let bg = Color::rgb(background.r(), background.g(), background.b());
        for pixel in image.pixels_mut() {
            let [r, g, b, a] = pixel.0;
            let src = Color::from_rgba8(r, g, b, 255);
            let out = bg.lerp(src, a as f32 / 255.0);
            pixel.0 = out.to_rgba8();
        }
        Ok(image)
    }

    /// Write the canvas to a PNG file, composited over `background`.
    pub fn save_png(&self, path: impl AsRef<Path>, background: Color) -> Result<(), ExportError> {
        let image = self.to_image_over(background)?;
        image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    fn current_subpath(&mut self) -> Option<&mut Subpath> {
        self.path.last_mut().filter(|s| !s.closed)
    }

    /// Alpha-blend `color` into the pixel at `(x, y)`, scaled by coverage.
    fn blend(&mut self, x: i64, y: i64, color: Color, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let color = color.with_alpha_scaled(self.state.global_alpha * coverage);
        let src_a = color.alpha();
        if src_a <= 0.0 {
            return;
        }
        let index = (y as u32 * self.width + x as u32) as usize;
        let [r, g, b, a] = self.pixels[index];
        let dst = Color::from_rgba8(r, g, b, a);
        let dst_a = dst.alpha();
        let out_a = src_a + dst_a * (1.0 - src_a);
        let mix = |s: f32, d: f32| (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
        let out = Color::rgba(
            mix(color.r(), dst.r()),
            mix(color.g(), dst.g()),
            mix(color.b(), dst.b()),
            out_a,
        );
        self.pixels[index] = out.to_rgba8();
    }

    /// Edges of the current path, every subpath implicitly closed.
    fn fill_edges(&self) -> Vec<(Vec2, Vec2)> {
        let mut edges = Vec::new();
        for subpath in &self.path {
            let pts = &subpath.points;
            if pts.len() < 2 {
                continue;
            }
            for i in 0..pts.len() {
                let a = pts[i];
                let b = pts[(i + 1) % pts.len()];
                if a.y != b.y {
                    edges.push((a, b));
                }
            }
        }
        edges
    }

    fn stroke_segment(&mut self, a: Vec2, b: Vec2, color: Color) {
        let half = (self.state.line_width * 0.5).max(0.5);
        let min = a.min(b) - Vec2::splat(half + 1.0);
        let max = a.max(b) + Vec2::splat(half + 1.0);
        let (x0, y0) = (min.x.floor() as i64, min.y.floor() as i64);
        let (x1, y1) = (max.x.ceil() as i64, max.y.ceil() as i64);
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(self.width as i64 - 1);
        let y1 = y1.min(self.height as i64 - 1);

        let ab = b - a;
        let len_sq = ab.length_squared();
        for y in y0..=y1 {
            for x in x0..=x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let t = if len_sq > 0.0 {
                    ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                let distance = p.distance(a + ab * t);
                let coverage = (half + 0.5 - distance).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }
}

impl DrawContext for RasterCanvas {
    fn save(&mut self) {
        self.saved.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let x0 = x.max(0.0).round() as u32;
        let y0 = y.max(0.0).round() as u32;
        let x1 = ((x + width).round().max(0.0) as u32).min(self.width);
        let y1 = ((y + height).round().max(0.0) as u32).min(self.height);
        for py in y0..y1 {
            for px in x0..x1 {
                self.pixels[(py * self.width + px) as usize] = [0; 4];
            }
        }
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn close_path(&mut self) {
        if let Some(subpath) = self.current_subpath() {
            subpath.closed = true;
        }
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.path.push(Subpath {
            points: vec![Vec2::new(x, y)],
            closed: false,
        });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        match self.current_subpath() {
            Some(subpath) => subpath.points.push(Vec2::new(x, y)),
            None => self.move_to(x, y),
        }
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32) {
        let center = Vec2::new(x, y);
        let sweep = (end_angle - start_angle).clamp(-TAU, TAU);
        let steps = ((sweep.abs() * radius.max(1.0)).ceil() as usize).clamp(8, 256);
        let points = (0..=steps).map(|i| {
            let angle = start_angle + sweep * i as f32 / steps as f32;
            center + Vec2::from_angle(angle) * radius
        });
        match self.current_subpath() {
            Some(subpath) => subpath.points.extend(points),
            None => self.path.push(Subpath {
                points: points.collect(),
                closed: false,
            }),
        }
    }

    fn fill(&mut self) {
        let edges = self.fill_edges();
        if edges.is_empty() || self.width == 0 || self.height == 0 {
            return;
        }
        let (min_y, max_y) = edges.iter().fold((f32::MAX, f32::MIN), |(lo, hi), (a, b)| {
            (lo.min(a.y).min(b.y), hi.max(a.y).max(b.y))
        });
        let y0 = (min_y.floor().max(0.0)) as u32;
        let y1 = (max_y.ceil().max(0.0) as u32).min(self.height);
        let style = self.state.fill.clone();

        let mut crossings: Vec<(f32, i32)> = Vec::new();
        for py in y0..y1 {
            let sy = py as f32 + 0.5;
            crossings.clear();
            for &(a, b) in &edges {
                let (top, bottom, winding) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
                if sy >= top.y && sy < bottom.y {
                    let t = (sy - top.y) / (bottom.y - top.y);
                    crossings.push((top.x + (bottom.x - top.x) * t, winding));
                }
            }
            crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding == 0 {
                    continue;
                }
                let start = (pair[0].0 - 0.5).ceil().max(0.0) as u32;
                let end = ((pair[1].0 - 0.5).ceil().max(0.0) as u32).min(self.width);
                for px in start..end {
                    let color = style.color_at(Vec2::new(px as f32 + 0.5, sy));
                    self.blend(px as i64, py as i64, color, 1.0);
                }
            }
        }
    }

    fn stroke(&mut self) {
        let color = self.state.stroke;
        let segments: Vec<(Vec2, Vec2)> = self
            .path
            .iter()
            .flat_map(|subpath| {
                let pts = &subpath.points;
                let closing = match (subpath.closed, pts.first(), pts.last()) {
                    (true, Some(&first), Some(&last)) if pts.len() > 2 => Some((last, first)),
                    _ => None,
                };
                pts.windows(2).map(|w| (w[0], w[1])).chain(closing)
            })
            .collect();
        for (a, b) in segments {
            self.stroke_segment(a, b, color);
        }
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        let color = self.state.stroke;
        let corners = [
            Vec2::new(x, y),
            Vec2::new(x + width, y),
            Vec2::new(x + width, y + height),
            Vec2::new(x, y + height),
        ];
        for i in 0..4 {
            self.stroke_segment(corners[i], corners[(i + 1) % 4], color);
        }
    }

    fn set_fill_style(&mut self, style: FillStyle) {
        self.state.fill = style;
    }

    fn set_stroke_style(&mut self, color: Color) {
        self.state.stroke = color;
    }

    fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width > 0.0 {
            self.state.line_width = width;
        }
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        if (0.0..=1.0).contains(&alpha) {
            self.state.global_alpha = alpha;
        }
    }
}
