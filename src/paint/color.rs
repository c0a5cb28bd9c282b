// src/paint/color.rs

use serde::{Deserialize, Serialize};

/// RGBA color with float channels in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Build from 8-bit channels. Alpha is also given on the 0..255 scale.
    pub fn rgba8(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::rgba(r / 255.0, g / 255.0, b / 255.0, (a / 255.0).clamp(0.0, 1.0))
    }

    /// HSL constructor, every component in [0, 1] (hue is a turn fraction).
    pub fn hsla(h: f32, s: f32, l: f32, a: f32) -> Self {
        if s <= 0.0 {
            return Self::rgba(l, l, l, a);
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        let h = h.rem_euclid(1.0);
        Self::rgba(
            hue_to_channel(p, q, h + 1.0 / 3.0),
            hue_to_channel(p, q, h),
            hue_to_channel(p, q, h - 1.0 / 3.0),
            a,
        )
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Channel-wise linear interpolation, `t == 1` returns `end` exactly.
    pub fn blend(start: Color, end: Color, t: f32) -> Color {
        if t == 1.0 {
            return end;
        }
        Color::rgba(
            (1.0 - t) * start.r + t * end.r,
            (1.0 - t) * start.g + t * end.g,
            (1.0 - t) * start.b + t * end.b,
            (1.0 - t) * start.a + t * end.a,
        )
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

/// Fixed overlay colors (alpha filled in per use).
pub mod palette {
    use super::Color;

    pub const LOCK_GREEN: Color = Color::rgba(0.09, 0.945, 0.26, 1.0);
    pub const BRAKE_RED: Color = Color::rgba(245.0 / 255.0, 0.0, 0.0, 1.0);
    pub const CHEVRON_RED: Color = Color::rgba(201.0 / 255.0, 34.0 / 255.0, 49.0 / 255.0, 1.0);
    pub const GLOW_YELLOW: Color = Color::rgba(218.0 / 255.0, 202.0 / 255.0, 37.0 / 255.0, 210.0 / 255.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const SHADOW: Color = Color::rgba(0.0, 0.0, 0.0, 200.0 / 255.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_hsl_primaries() {
        let red = Color::hsla(0.0, 1.0, 0.5, 1.0);
        assert_abs_diff_eq!(red.r, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(red.g, 0.0, epsilon = 1e-6);

        let green = Color::hsla(120.0 / 360.0, 1.0, 0.5, 0.4);
        assert_abs_diff_eq!(green.g, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(green.r, 0.0, epsilon = 1e-6);
        assert_eq!(green.a, 0.4);
    }

    #[test]
    fn test_grey_when_unsaturated() {
        let grey = Color::hsla(0.3, 0.0, 0.95, 0.35);
        assert_eq!(grey, Color::rgba(0.95, 0.95, 0.95, 0.35));
    }

    #[test]
    fn test_blend_midpoint_and_end() {
        let a = Color::rgba(0.0, 0.0, 0.0, 0.0);
        let b = Color::rgba(1.0, 0.5, 0.2, 0.8);
        let mid = Color::blend(a, b, 0.5);
        assert_abs_diff_eq!(mid.r, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(mid.a, 0.4, epsilon = 1e-6);
        assert_eq!(Color::blend(a, b, 1.0), b);
    }
}
