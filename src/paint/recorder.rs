// src/paint/recorder.rs
//
// A sink that records every call. Used by the replay binary to dump a frame's
// overlay as JSON, and by tests to assert on what was drawn.

use serde::Serialize;

use super::{Brush, Color, Composition, DrawSink, Font, Pen, Point, Rect, TextAlign};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Polygon {
        points: Vec<Point>,
        brush: Brush,
    },
    Line {
        from: Point,
        to: Point,
        pen: Pen,
    },
    RectOutline {
        rect: Rect,
        pen: Pen,
    },
    RectFill {
        rect: Rect,
        brush: Brush,
    },
    RoundedRect {
        rect: Rect,
        radius: f32,
        pen: Pen,
        brush: Brush,
    },
    Text {
        rect: Rect,
        align: TextAlign,
        font: Font,
        color: Color,
        text: String,
    },
    Composition {
        mode: Composition,
    },
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn polygons(&self) -> impl Iterator<Item = (&[Point], &Brush)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Polygon { points, brush } => Some((points.as_slice(), brush)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = (&str, Color)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, color, .. } => Some((text.as_str(), *color)),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (Point, Point, &Pen)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { from, to, pen } => Some((*from, *to, pen)),
            _ => None,
        })
    }

    pub fn rect_outlines(&self) -> impl Iterator<Item = (Rect, &Pen)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::RectOutline { rect, pen } => Some((*rect, pen)),
            _ => None,
        })
    }
}

impl DrawSink for RecordingSink {
    fn fill_polygon(&mut self, points: &[Point], brush: &Brush) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            brush: brush.clone(),
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, pen: &Pen) {
        self.commands.push(DrawCommand::Line { from, to, pen: *pen });
    }

    fn stroke_rect(&mut self, rect: Rect, pen: &Pen) {
        self.commands.push(DrawCommand::RectOutline { rect, pen: *pen });
    }

    fn fill_rect(&mut self, rect: Rect, brush: &Brush) {
        self.commands.push(DrawCommand::RectFill {
            rect,
            brush: brush.clone(),
        });
    }

    fn draw_rounded_rect(&mut self, rect: Rect, radius: f32, pen: &Pen, brush: &Brush) {
        self.commands.push(DrawCommand::RoundedRect {
            rect,
            radius,
            pen: *pen,
            brush: brush.clone(),
        });
    }

    fn draw_text(&mut self, rect: Rect, align: TextAlign, font: Font, color: Color, text: &str) {
        self.commands.push(DrawCommand::Text {
            rect,
            align,
            font,
            color,
            text: text.to_string(),
        });
    }

    fn set_composition(&mut self, mode: Composition) {
        self.commands.push(DrawCommand::Composition { mode });
    }
}
