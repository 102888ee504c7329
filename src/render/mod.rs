//! Drawing surface abstraction.
//!
//! The simulation never owns a window or a GPU surface. Each frame it is
//! handed something that implements [`DrawContext`], a small subset of the
//! familiar 2D canvas API: paths, arcs, strokes, rectangles, a paint-state
//! stack and linear gradients.
//!
//! Two backends ship with the crate:
//! - [`RecordingContext`] - records every call, useful for tests and tooling
//! - [`RasterCanvas`] - CPU rasterizer into an RGBA buffer with PNG export

mod raster;
mod recording;

pub use raster::RasterCanvas;
pub use recording::{DrawCommand, LineStroke, RecordingContext};

use glam::Vec2;

use crate::color::Color;

/// A color stop on a [`LinearGradient`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    /// Position along the gradient axis, `0.0..=1.0`.
    pub offset: f32,
    pub color: Color,
}

/// Linear gradient between two points.
///
/// Stops are kept sorted by offset. Sampling before the first stop or after
/// the last one returns that stop's color; a gradient without stops is
/// fully transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: Vec2,
    pub end: Vec2,
    stops: Vec<ColorStop>,
}

impl LinearGradient {
    pub fn new(start: Vec2, end: Vec2) -> Self {
        Self {
            start,
            end,
            stops: Vec::new(),
        }
    }

    /// Add a stop. Offsets outside `0.0..=1.0` are clamped.
    pub fn add_color_stop(&mut self, offset: f32, color: Color) {
        let offset = offset.clamp(0.0, 1.0);
        // Equal offsets keep insertion order.
        let index = self.stops.partition_point(|s| s.offset <= offset);
        self.stops.insert(index, ColorStop { offset, color });
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Color at parameter `t` along the axis.
    pub fn sample(&self, t: f32) -> Color {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Color::TRANSPARENT,
        };
        if t <= first.offset {
            return first.color;
        }
        if t >= last.offset {
            return last.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t >= a.offset && t <= b.offset {
                let span = b.offset - a.offset;
                if span <= f32::EPSILON {
                    return b.color;
                }
                return a.color.lerp(b.color, (t - a.offset) / span);
            }
        }
        last.color
    }

    /// Color at a point in surface space, projected onto the gradient axis.
    pub fn sample_at(&self, point: Vec2) -> Color {
        let axis = self.end - self.start;
        let len_sq = axis.length_squared();
        let t = if len_sq > 0.0 {
            (point - self.start).dot(axis) / len_sq
        } else {
            0.0
        };
        self.sample(t)
    }
}

/// Paint used by [`DrawContext::fill`].
#[derive(Debug, Clone, PartialEq)]
pub enum FillStyle {
    Solid(Color),
    Gradient(LinearGradient),
}

impl FillStyle {
    /// Color of this paint at a surface point.
    pub fn color_at(&self, point: Vec2) -> Color {
        match self {
            FillStyle::Solid(color) => *color,
            FillStyle::Gradient(gradient) => gradient.sample_at(point),
        }
    }
}

impl Default for FillStyle {
    fn default() -> Self {
        FillStyle::Solid(Color::BLACK)
    }
}

impl From<Color> for FillStyle {
    fn from(color: Color) -> Self {
        FillStyle::Solid(color)
    }
}

impl From<LinearGradient> for FillStyle {
    fn from(gradient: LinearGradient) -> Self {
        FillStyle::Gradient(gradient)
    }
}

/// Immediate-mode 2D drawing context.
///
/// Mirrors the canvas model: a current path built with `move_to`,
/// `line_to` and `arc`, painted with `fill`/`stroke`, plus a paint state
/// (fill style, stroke style, line width, global alpha) that `save` pushes
/// and `restore` pops. Angles are in radians.
pub trait DrawContext {
    fn save(&mut self);
    fn restore(&mut self);

    /// Reset a rectangle to transparent.
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    fn begin_path(&mut self);
    fn close_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32);

    fn fill(&mut self);
    fn stroke(&mut self);
    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32);

    fn set_fill_style(&mut self, style: FillStyle);
    fn set_stroke_style(&mut self, color: Color);
    fn set_line_width(&mut self, width: f32);
    fn set_global_alpha(&mut self, alpha: f32);

    /// Create an empty gradient from `(x0, y0)` to `(x1, y1)`.
    fn create_linear_gradient(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> LinearGradient {
        LinearGradient::new(Vec2::new(x0, y0), Vec2::new(x1, y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_stop() -> LinearGradient {
        let mut g = LinearGradient::new(Vec2::ZERO, Vec2::new(100.0, 0.0));
        g.add_color_stop(0.0, Color::WHITE);
        g.add_color_stop(0.5, Color::from_hex(0xffd700));
        g.add_color_stop(1.0, Color::from_hex(0xff4500));
        g
    }

    #[test]
    fn test_sample_hits_stops() {
        let g = three_stop();
        assert_eq!(g.sample(0.0), Color::WHITE);
        assert_eq!(g.sample(0.5).to_rgba8(), [255, 215, 0, 255]);
        assert_eq!(g.sample(1.0).to_rgba8(), [255, 69, 0, 255]);
    }

    #[test]
    fn test_sample_clamps_outside_axis() {
        let g = three_stop();
        assert_eq!(g.sample_at(Vec2::new(-50.0, 10.0)), Color::WHITE);
        assert_eq!(g.sample_at(Vec2::new(500.0, 0.0)).to_rgba8(), [255, 69, 0, 255]);
    }

    #[test]
    fn test_stops_sorted_on_insert() {
        let mut g = LinearGradient::new(Vec2::ZERO, Vec2::ONE);
        g.add_color_stop(1.0, Color::BLACK);
        g.add_color_stop(0.0, Color::WHITE);
        g.add_color_stop(2.0, Color::WHITE);
        let offsets: Vec<f32> = g.stops().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_empty_and_single_stop() {
        let mut g = LinearGradient::new(Vec2::ZERO, Vec2::ONE);
        assert_eq!(g.sample(0.3), Color::TRANSPARENT);

        g.add_color_stop(0.0, Color::from_hex(0xffd700));
        assert_eq!(g.sample(0.0), g.sample(0.9));
    }

    #[test]
    fn test_degenerate_axis_uses_first_stop() {
        let mut g = LinearGradient::new(Vec2::splat(5.0), Vec2::splat(5.0));
        g.add_color_stop(0.0, Color::WHITE);
        g.add_color_stop(1.0, Color::BLACK);
        assert_eq!(g.sample_at(Vec2::new(80.0, 3.0)), Color::WHITE);
    }
}
