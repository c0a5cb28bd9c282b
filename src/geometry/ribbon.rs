// src/geometry/ribbon.rs
//
// Builds the filled "ribbon" polygons for the path, lane lines and road
// edges. Each sample is offset left and right by a half-width, both rails are
// projected, and the result is stitched into one closed outline:
//
//   right rail (far → near) ++ left rail (near → far)
//
// Samples whose rails leave the padded viewport are dropped, which can leave
// visible gaps; that is accepted.

use std::collections::VecDeque;

use crate::paint::Point;
use crate::projection::Projector;
use crate::types::XyztLine;

/// Lead distance is doubled, then pulled back by at most this much (m).
const LEAD_PULLBACK_CAP: f32 = 10.0;
const LEAD_PULLBACK_RATIO: f32 = 0.35;

/// One frame's outline; no identity across frames.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScreenPolygon {
    pub points: Vec<Point>,
}

impl ScreenPolygon {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Right rail, far to near.
    pub fn right_rail(&self) -> &[Point] {
        &self.points[..self.points.len() / 2]
    }

    /// Left rail, near to far.
    pub fn left_rail(&self) -> &[Point] {
        &self.points[self.points.len() / 2..]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RibbonParams {
    /// Lateral offset of each rail from the sample (m)
    pub half_width: f32,
    /// Added to every sample's z (m)
    pub vertical_offset: f32,
    /// Last sample index to consider (inclusive)
    pub horizon_index: usize,
    /// When false, samples that would fold the left rail back toward the
    /// camera are skipped (hill crests on wide ribbons).
    pub allow_inversion: bool,
}

pub fn build_ribbon(projector: &Projector, line: &XyztLine, params: RibbonParams) -> ScreenPolygon {
    let len = line.len();
    if len == 0 {
        return ScreenPolygon::default();
    }
    let last = params.horizon_index.min(len - 1);

    let mut outline: VecDeque<Point> = VecDeque::with_capacity(2 * (last + 1));
    let mut prev_left_y: Option<f32> = None;

    for i in 0..=last {
        // Points behind the camera plane would be drawn above the frame.
        if line.x[i] < 0.0 {
            continue;
        }
        let z = line.z[i] + params.vertical_offset;
        let left = projector.project(line.x[i], line.y[i] - params.half_width, z);
        let right = projector.project(line.x[i], line.y[i] + params.half_width, z);
        if !(left.inside && right.inside) {
            continue;
        }
        if !params.allow_inversion {
            if let Some(prev_y) = prev_left_y {
                if left.point.y > prev_y {
                    continue;
                }
            }
        }
        prev_left_y = Some(left.point.y);
        outline.push_back(left.point);
        outline.push_front(right.point);
    }

    ScreenPolygon {
        points: outline.into(),
    }
}

/// Last index whose forward distance stays within `distance`, scanning from
/// index 1 and stopping at the first sample beyond it.
pub fn path_length_idx(line: &XyztLine, distance: f32) -> usize {
    let xs = &line.x[..line.len()];
    let mut max_idx = 0;
    for (i, &x) in xs.iter().enumerate().skip(1) {
        if x > distance {
            break;
        }
        max_idx = i;
    }
    max_idx
}

/// Draw distance for a clear road: the path's reach, clamped.
pub fn max_draw_distance(line: &XyztLine, min_distance: f32, max_distance: f32) -> f32 {
    line.last_x()
        .unwrap_or(min_distance)
        .clamp(min_distance, max_distance)
}

/// Shortens the path so it stops short of a close lead vehicle.
pub fn path_draw_distance(max_distance: f32, lead_distance: Option<f32>) -> f32 {
    match lead_distance {
        Some(d) => {
            let lead_d = d * 2.0;
            (lead_d - (lead_d * LEAD_PULLBACK_RATIO).min(LEAD_PULLBACK_CAP)).clamp(0.0, max_distance)
        }
        None => max_distance,
    }
}
