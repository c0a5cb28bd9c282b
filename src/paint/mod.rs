// src/paint/mod.rs
//
// Toolkit-independent drawing surface.
//
// The overlay model never talks to a GUI painter directly. Everything it
// produces (filled ribbons, marker outlines, tick lines, labels) goes through
// a `DrawSink`, so the projection and overlay math can run headless in tests
// and in the replay binary.

pub mod color;
pub mod primitives;
pub mod recorder;

pub use color::{palette, Color};
pub use primitives::{Brush, Composition, Font, FontWeight, GradientStop, Pen, Point, Rect, TextAlign};
pub use recorder::{DrawCommand, RecordingSink};

/// Minimal painter capability consumed by the render pass.
pub trait DrawSink {
    fn fill_polygon(&mut self, points: &[Point], brush: &Brush);

    fn stroke_line(&mut self, from: Point, to: Point, pen: &Pen);

    fn stroke_rect(&mut self, rect: Rect, pen: &Pen);

    fn fill_rect(&mut self, rect: Rect, brush: &Brush);

    fn draw_rounded_rect(&mut self, rect: Rect, radius: f32, pen: &Pen, brush: &Brush);

    fn draw_text(&mut self, rect: Rect, align: TextAlign, font: Font, color: Color, text: &str);

    /// Switch blending mode for subsequent calls. Sinks that cannot blend
    /// additively may ignore this.
    fn set_composition(&mut self, _mode: Composition) {}
}
