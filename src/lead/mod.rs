// src/lead/mod.rs
//
// Lead-vehicle overlays.
//
//   model leads (ranked) → lockon::LockonBank → LockonMarker (boxes, ticks, meter)
//   radar lead one/two   → chevron::build_chevron → ChevronMarker (legacy chevrons)
//
// Both are anchored at a point projected just above the road surface at the
// lead's distance along the predicted path.

pub mod chevron;
pub mod lockon;

pub use chevron::{build_chevron, draw_chevron, AccelColorLatch, ChevronMarker};
pub use lockon::{
    draw_lockon, LeadObservation, LeadState, LockonBank, LockonMarker, MarkerContext, LEAD_SLOTS,
};

use crate::geometry::path_length_idx;
use crate::paint::Point;
use crate::projection::Projector;
use crate::types::XyztLine;

/// Height above the path (m) at which lead markers are anchored.
pub const LEAD_ANCHOR_HEIGHT: f32 = 1.22;

/// Screen anchor for a lead at `distance` ahead and `lateral` to the left.
///
/// The anchor's height follows the path profile at that distance. Returns
/// `None` for an empty path or a degenerate projection.
pub fn lead_anchor(
    projector: &Projector,
    path: &XyztLine,
    distance: f32,
    lateral: f32,
) -> Option<Point> {
    if path.is_empty() {
        return None;
    }
    let z = path.z[path_length_idx(path, distance)];
    projector.to_screen(distance, -lateral, z + LEAD_ANCHOR_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Viewport;
    use nalgebra::Matrix3;

    #[test]
    fn test_anchor_follows_path_height() {
        let m = Matrix3::new(
            960.0, 1000.0, 0.0, //
            540.0, 0.0, 1000.0, //
            1.0, 0.0, 0.0,
        );
        let projector = Projector::new(m, Viewport::new(1920.0, 1080.0), 500.0);
        let path = XyztLine {
            x: vec![0.0, 10.0, 20.0, 30.0],
            y: vec![0.0; 4],
            z: vec![0.0, 0.0, -1.22, 0.0],
            t: vec![0.0; 4],
        };
        // At 20 m the path dips by the anchor height: the anchor sits on the
        // horizon row.
        let p = lead_anchor(&projector, &path, 20.0, 0.0).unwrap();
        assert!((p.y - 540.0).abs() < 1e-3);
        // Lateral is mirrored: a lead to the left lands left of center.
        let left = lead_anchor(&projector, &path, 10.0, 2.0).unwrap();
        assert!(left.x < 960.0);
        assert!(lead_anchor(&projector, &XyztLine::default(), 10.0, 0.0).is_none());
    }
}
