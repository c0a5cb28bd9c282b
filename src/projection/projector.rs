// src/projection/projector.rs

use nalgebra::{Matrix3, Vector3};

use crate::paint::{Point, Rect};
use crate::types::Viewport;

/// Denominators smaller than this are treated as "at the camera plane".
const MIN_DEPTH: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub point: Point,
    /// Inside the viewport grown by the clip margin
    pub inside: bool,
}

/// Maps vehicle-space points through the current calibration transform.
///
/// Callers are expected to drop points behind the camera (x < 0) before
/// projecting; the projector itself only guards against a vanishing
/// denominator, reporting such points as outside.
#[derive(Debug, Clone)]
pub struct Projector {
    transform: Matrix3<f32>,
    clip: Rect,
}

impl Projector {
    pub fn new(transform: Matrix3<f32>, viewport: Viewport, clip_margin: f32) -> Self {
        Self {
            transform,
            clip: viewport.rect().expanded(clip_margin),
        }
    }

    /// Projector with an all-zero transform: every point is outside.
    pub fn inert(viewport: Viewport) -> Self {
        Self::new(Matrix3::zeros(), viewport, 0.0)
    }

    pub fn clip_region(&self) -> Rect {
        self.clip
    }

    /// Perspective-projects a point; `None` when the denominator vanishes.
    pub fn to_screen(&self, x: f32, y: f32, z: f32) -> Option<Point> {
        let pt = self.transform * Vector3::new(x, y, z);
        if pt.z.abs() < MIN_DEPTH || !pt.z.is_finite() {
            return None;
        }
        Some(Point::new(pt.x / pt.z, pt.y / pt.z))
    }

    pub fn project(&self, x: f32, y: f32, z: f32) -> Projection {
        match self.to_screen(x, y, z) {
            Some(point) => Projection {
                point,
                inside: self.clip.contains(point),
            },
            None => Projection {
                point: Point::default(),
                inside: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn simple_projector() -> Projector {
        // u = 1000 * y / x + 960, v = 1000 * z / x + 540
        let m = Matrix3::new(
            960.0, 1000.0, 0.0, //
            540.0, 0.0, 1000.0, //
            1.0, 0.0, 0.0,
        );
        Projector::new(m, Viewport::new(1920.0, 1080.0), 500.0)
    }

    #[test]
    fn test_project_matches_matrix_then_divide() {
        let p = simple_projector();
        let r = p.project(10.0, 1.0, 1.5);
        assert_relative_eq!(r.point.x, 1060.0, epsilon = 1e-3);
        assert_relative_eq!(r.point.y, 690.0, epsilon = 1e-3);
        assert!(r.inside);
    }

    #[test]
    fn test_margin_bounds_are_inclusive() {
        let p = simple_projector();
        // u = -500 exactly: y/x = -1.46
        let edge = p.project(100.0, -146.0, 0.0);
        assert_relative_eq!(edge.point.x, -500.0, epsilon = 1e-2);
        assert!(p.project(100.0, -145.9, 0.0).inside);
        assert!(!p.project(100.0, -146.1, 0.0).inside);
        // v beyond height + 500
        assert!(!p.project(1.0, 0.0, 1.1).inside);
    }

    #[test]
    fn test_degenerate_depth_is_outside() {
        let p = simple_projector();
        assert!(!p.project(0.0, 0.0, 0.0).inside);
        let inert = Projector::inert(Viewport::new(1920.0, 1080.0));
        assert!(!inert.project(20.0, 0.0, 1.0).inside);
    }
}
