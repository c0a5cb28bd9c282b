// src/path_style.rs
//
// Brushes for the lane lines, road edges and the driving path.
//
// The path is either colored by the planned acceleration (experimental mode:
// green when speeding up, red when slowing down, grey when coasting) or by a
// throttle / no-throttle gradient that cross-fades whenever the planner's
// throttle permission flips.

use crate::geometry::ScreenPolygon;
use crate::paint::{Brush, Color, GradientStop, Point};

/// Fraction of the cross-fade completed per frame (0.5 s at 20 Hz)
const TRANSITION_SPEED: f32 = 0.1;
const LANE_LINE_MAX_ALPHA: f32 = 0.7;

/// Linear map of `x` from [x0, x1] onto [y0, y1], clamping `x` first.
pub fn map_val(x: f32, x0: f32, x1: f32, y0: f32, y1: f32) -> f32 {
    let x = x.clamp(x0.min(x1), x0.max(x1));
    (x - x0) * (y1 - y0) / (x1 - x0) + y0
}

pub fn lane_line_brush(prob: f32) -> Brush {
    Brush::Solid(Color::rgba(1.0, 1.0, 1.0, prob.clamp(0.0, LANE_LINE_MAX_ALPHA)))
}

pub fn road_edge_brush(std: f32) -> Brush {
    Brush::Solid(Color::rgba(1.0, 0.0, 0.0, (1.0 - std).clamp(0.0, 1.0)))
}

fn vertical_gradient(height: f32, stops: Vec<GradientStop>) -> Brush {
    Brush::LinearGradient {
        start: Point::new(0.0, height),
        end: Point::new(0.0, 0.0),
        stops,
    }
}

/// Acceleration-colored gradient along the path's right rail.
///
/// Sample `i` of `acceleration` is paired with the i-th right-rail point
/// counted from the bottom of the screen; every other sample is used, and
/// points outside the frame vertically are skipped.
pub fn acceleration_gradient(track: &ScreenPolygon, acceleration: &[f32], height: f32) -> Brush {
    let right = track.right_rail();
    let max_len = right.len().min(acceleration.len());
    let mut stops = Vec::with_capacity(max_len / 2 + 1);

    let mut i = 0;
    while i < max_len {
        let track_idx = max_len - i - 1;
        let y = right[track_idx].y;
        if y < 0.0 || y > height {
            i += 1;
            continue;
        }

        // 0 at the bottom of the frame
        let position = (height - y) / height;

        // speed up: 120, slow down: 0
        let hue = (60.0 + acceleration[i] * 35.0).clamp(0.0, 120.0);
        // Whole degrees only; keeps the number of distinct colors down
        let hue = ((hue * 100.0 + 0.5) as i32 / 100) as f32;

        let saturation = (acceleration[i] * 1.5).abs().min(1.0);
        let lightness = map_val(saturation, 0.0, 1.0, 0.95, 0.62);
        let alpha = map_val(position, 0.75 / 2.0, 0.75, 0.4, 0.0);
        stops.push(GradientStop {
            position,
            color: Color::hsla(hue / 360.0, saturation, lightness, alpha),
        });

        // Skip a point, unless the next one is the last
        i += if i + 2 < max_len { 2 } else { 1 };
    }

    vertical_gradient(height, stops)
}

fn throttle_colors() -> [Color; 3] {
    [
        Color::hsla(148.0 / 360.0, 0.94, 0.51, 0.4),
        Color::hsla(112.0 / 360.0, 1.0, 0.68, 0.35),
        Color::hsla(112.0 / 360.0, 1.0, 0.68, 0.0),
    ]
}

fn no_throttle_colors() -> [Color; 3] {
    [
        Color::hsla(148.0 / 360.0, 0.0, 0.95, 0.4),
        Color::hsla(112.0 / 360.0, 0.0, 0.95, 0.35),
        Color::hsla(112.0 / 360.0, 0.0, 0.95, 0.0),
    ]
}

/// Cross-fade state between the throttle and no-throttle path gradients.
#[derive(Debug, Clone)]
pub struct ThrottleBlend {
    blend_factor: f32,
    prev_allow_throttle: bool,
}

impl Default for ThrottleBlend {
    fn default() -> Self {
        Self {
            blend_factor: 1.0,
            prev_allow_throttle: true,
        }
    }
}

impl ThrottleBlend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blend_factor(&self) -> f32 {
        self.blend_factor
    }

    /// Advances the fade by one frame and returns this frame's path brush.
    pub fn update(&mut self, allow_throttle: bool, height: f32) -> Brush {
        if allow_throttle != self.prev_allow_throttle {
            self.prev_allow_throttle = allow_throttle;
            // Invert so a flip mid-fade continues from the current mix
            self.blend_factor = (1.0 - self.blend_factor).max(0.0);
        }

        let (begin, end) = if allow_throttle {
            (no_throttle_colors(), throttle_colors())
        } else {
            (throttle_colors(), no_throttle_colors())
        };
        if self.blend_factor < 1.0 {
            self.blend_factor = (self.blend_factor + TRANSITION_SPEED).min(1.0);
        }

        let stops = [0.0, 0.5, 1.0]
            .iter()
            .enumerate()
            .map(|(k, &position)| GradientStop {
                position,
                color: Color::blend(begin[k], end[k], self.blend_factor),
            })
            .collect();
        vertical_gradient(height, stops)
    }
}
