//! A [`DrawContext`] that records calls instead of drawing.

use glam::Vec2;

use super::{DrawContext, FillStyle, LinearGradient};
use crate::color::Color;

/// One recorded drawing call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    ClearRect { x: f32, y: f32, width: f32, height: f32 },
    BeginPath,
    ClosePath,
    MoveTo(Vec2),
    LineTo(Vec2),
    Arc { center: Vec2, radius: f32, start_angle: f32, end_angle: f32 },
    Fill,
    Stroke,
    StrokeRect { x: f32, y: f32, width: f32, height: f32 },
    SetFillStyle(FillStyle),
    SetStrokeStyle(Color),
    SetLineWidth(f32),
    SetGlobalAlpha(f32),
    CreateLinearGradient { start: Vec2, end: Vec2 },
}

/// A straight line that was stroked, with the paint state in effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStroke {
    pub from: Vec2,
    pub to: Vec2,
    pub alpha: f32,
    pub color: Color,
    pub width: f32,
}

#[derive(Debug, Clone, Copy)]
struct PaintState {
    alpha: f32,
    color: Color,
    width: f32,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

/// Records every call made through [`DrawContext`].
#[derive(Debug, Default, Clone)]
pub struct RecordingContext {
    commands: Vec<DrawCommand>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Number of recorded `fill` calls.
    pub fn fill_count(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, DrawCommand::Fill)).count()
    }

    /// Rectangles passed to `stroke_rect`, as `[x, y, width, height]`.
    pub fn stroked_rects(&self) -> Vec<[f32; 4]> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                DrawCommand::StrokeRect { x, y, width, height } => Some([x, y, width, height]),
                _ => None,
            })
            .collect()
    }

    /// The most recent fill style set, if any.
    pub fn last_fill_style(&self) -> Option<&FillStyle> {
        self.commands.iter().rev().find_map(|c| match c {
            DrawCommand::SetFillStyle(style) => Some(style),
            _ => None,
        })
    }

    /// Replay the recording and return every straight segment that was
    /// stroked, with the alpha, color and width in effect at the time.
    ///
    /// Arcs move the pen but do not produce segments.
    pub fn line_strokes(&self) -> Vec<LineStroke> {
        let mut strokes = Vec::new();
        let mut state = PaintState::default();
        let mut stack: Vec<PaintState> = Vec::new();
        let mut segments: Vec<(Vec2, Vec2)> = Vec::new();
        let mut subpath_start: Option<Vec2> = None;
        let mut pen: Option<Vec2> = None;

        for command in &self.commands {
            match command {
                DrawCommand::Save => stack.push(state),
                DrawCommand::Restore => {
                    if let Some(saved) = stack.pop() {
                        state = saved;
                    }
                }
                DrawCommand::BeginPath => {
                    segments.clear();
                    subpath_start = None;
                    pen = None;
                }
                DrawCommand::MoveTo(p) => {
                    subpath_start = Some(*p);
                    pen = Some(*p);
                }
                DrawCommand::LineTo(p) => {
                    match pen {
                        Some(from) => segments.push((from, *p)),
                        None => subpath_start = Some(*p),
                    }
                    pen = Some(*p);
                }
                DrawCommand::Arc { center, radius, end_angle, .. } => {
                    pen = Some(*center + Vec2::from_angle(*end_angle) * *radius);
                }
                DrawCommand::ClosePath => {
                    if let (Some(from), Some(start)) = (pen, subpath_start) {
                        if from != start {
                            segments.push((from, start));
                        }
                        pen = Some(start);
                    }
                }
                DrawCommand::Stroke => {
                    strokes.extend(segments.iter().map(|&(from, to)| LineStroke {
                        from,
                        to,
                        alpha: state.alpha,
                        color: state.color,
                        width: state.width,
                    }));
                }
                DrawCommand::SetStrokeStyle(color) => state.color = *color,
                DrawCommand::SetLineWidth(width) => state.width = *width,
                DrawCommand::SetGlobalAlpha(alpha) => state.alpha = *alpha,
                _ => {}
            }
        }

        strokes
    }
}

impl DrawContext for RecordingContext {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::ClearRect { x, y, width, height });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::MoveTo(Vec2::new(x, y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::LineTo(Vec2::new(x, y)));
    }

    fn arc(&mut self, x: f32, y: f32, radius: f32, start_angle: f32, end_angle: f32) {
        self.commands.push(DrawCommand::Arc {
            center: Vec2::new(x, y),
            radius,
            start_angle,
            end_angle,
        });
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::Fill);
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::Stroke);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        self.commands.push(DrawCommand::StrokeRect { x, y, width, height });
    }

    fn set_fill_style(&mut self, style: FillStyle) {
        self.commands.push(DrawCommand::SetFillStyle(style));
    }

    fn set_stroke_style(&mut self, color: Color) {
        self.commands.push(DrawCommand::SetStrokeStyle(color));
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::SetLineWidth(width));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.commands.push(DrawCommand::SetGlobalAlpha(alpha));
    }

    fn create_linear_gradient(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) -> LinearGradient {
        let (start, end) = (Vec2::new(x0, y0), Vec2::new(x1, y1));
        self.commands.push(DrawCommand::CreateLinearGradient { start, end });
        LinearGradient::new(start, end)
    }
}
