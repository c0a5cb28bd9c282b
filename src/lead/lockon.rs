// src/lead/lockon.rs
//
// "Lock-on" lead markers: a box around each ranked lead whose position, size
// and decorations are low-pass filtered frame to frame.
//
// Per-slot state lives in `LockonBank`, owned by the render pass. Slots are
// keyed by rank (closest, second closest, ...), not by track identity, so a
// marker can visibly jump when the ranking flips.
//
// Each frame runs in two passes:
//
//   1. core:   every slot smooths x / y / distance / acceleration toward its
//               raw observation, or decays toward rest when unoccupied.
//   2. derive: box geometry, indicator line and lock confidence. Slots 0 and
//               1 read each other's smoothed values here, after pass 1 has
//               settled both.

use serde::Serialize;

use crate::paint::{
    palette, Brush, Color, Composition, DrawSink, Font, FontWeight, Pen, Point, Rect, TextAlign,
};
use crate::types::Viewport;

pub const LEAD_SLOTS: usize = 5;

// ============================================================================
// SMOOTHING RATES (fraction of the error removed per frame)
// ============================================================================
const POSITION_RATE: f32 = 1.0 / 6.0;
const ACCEL_RATE: f32 = 1.0 / 10.0;
const INDICATOR_RATE: f32 = 1.0 / 20.0;
const LOCK_RATE: f32 = 1.0 / 5.0;

// ============================================================================
// LOCK CONFIDENCE
// ============================================================================
const LOCK_TARGET: f32 = 40.0;
/// Lateral-proxy gap above which slots 0/1 are treated as side by side
const LATERAL_SWAP_THRESHOLD: f32 = 300.0;
/// Ticks are hidden below this confidence
const MIN_TICK_CONFIDENCE: f32 = 3.0;
const TICK_WIDTH: f32 = 8.0;

// ============================================================================
// GEOMETRY
// ============================================================================
const MIN_DISTANCE: f32 = 1.0;
const BASE_BOX_PX: f32 = 300.0;
/// Slot 0 indicator prefers the right side unless slot 0 is this far left
/// of slot 1
const INDICATOR_HYSTERESIS_PX: f32 = 20.0;
const METER_MIN_BOX_WIDTH: f32 = 40.0;
const LABEL_MIN_BOX_WIDTH: f32 = 80.0;
const OUTLINE_WIDTH: f32 = 2.0;
/// Second-lead label distance limits (m)
const SECOND_LABEL_DIST_WIDE: f32 = 12.0;
const SECOND_LABEL_DIST_NARROW: f32 = 32.0;
const MAX_STROKE_ALPHA: f32 = 245.0;

#[inline]
fn approach(current: f32, target: f32, rate: f32) -> f32 {
    current + (target - current) * rate
}

/// Smoothed overlay state for one rank slot. Zero is the resting state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LeadState {
    /// Screen x of the anchor
    pub x: f32,
    /// Screen y of the anchor
    pub y: f32,
    /// Longitudinal distance (m)
    pub d: f32,
    /// Relative acceleration (m/s^2)
    pub a: f32,
    /// Indicator line anchor x on the box top edge
    pub indicator_anchor: f32,
    /// Indicator line far end x on the screen top edge
    pub indicator_far: f32,
    pub lock_confidence: f32,
}

impl LeadState {
    fn track(&mut self, x: f32, y: f32, d: f32, a: f32) {
        self.x = approach(self.x, x, POSITION_RATE);
        self.y = approach(self.y, y, POSITION_RATE);
        self.d = approach(self.d, d, POSITION_RATE).max(MIN_DISTANCE);
        self.a = approach(self.a, a, ACCEL_RATE);
    }

    /// Relax every field toward rest at its own rate.
    fn decay(&mut self) {
        let rest = LeadState::default();
        self.x = approach(self.x, rest.x, POSITION_RATE);
        self.y = approach(self.y, rest.y, POSITION_RATE);
        self.d = approach(self.d, rest.d, POSITION_RATE);
        self.a = approach(self.a, rest.a, ACCEL_RATE);
        self.indicator_anchor = approach(self.indicator_anchor, rest.indicator_anchor, INDICATOR_RATE);
        self.indicator_far = approach(self.indicator_far, rest.indicator_far, INDICATOR_RATE);
        self.lock_confidence = approach(self.lock_confidence, rest.lock_confidence, LOCK_RATE);
    }

    /// Screen x scaled by distance; a cheap stand-in for lateral position.
    pub fn lateral_proxy(&self) -> f32 {
        self.x * self.d
    }
}

/// Raw, unsmoothed input for one slot this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeadObservation {
    pub anchor: Point,
    /// Forward distance (m)
    pub distance: f32,
    pub accel: f32,
    /// Existence probability in [0, 1]
    pub prob: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerContext {
    pub viewport: Viewport,
    pub wide_cam: bool,
    pub marker_scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillMeter {
    pub points: [Point; 4],
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub align: TextAlign,
}

/// Everything needed to draw one lock-on marker; no further math at paint time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LockonMarker {
    pub slot: usize,
    pub rect: Rect,
    pub outline: Color,
    pub label: Option<Label>,
    pub indicator: Option<(Point, Point)>,
    pub meter: Option<FillMeter>,
    pub ticks: Option<[(Point, Point); 4]>,
    pub tick_color: Color,
}

/// Fixed-capacity arena of per-rank lead states.
#[derive(Debug, Clone, Default)]
pub struct LockonBank {
    slots: [LeadState; LEAD_SLOTS],
    last_raw_accel: f32,
}

impl LockonBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, slot: usize) -> Option<&LeadState> {
        self.slots.get(slot)
    }

    /// Raw acceleration of the last lead fed in (the highest occupied slot of
    /// the latest frame that had any). Persists across frames without leads.
    pub fn last_raw_accel(&self) -> f32 {
        self.last_raw_accel
    }

    /// Advance every slot by one frame. `observations[i]` feeds slot `i`;
    /// entries past `LEAD_SLOTS` are ignored and missing entries count as
    /// unoccupied.
    pub fn update(
        &mut self,
        observations: &[Option<LeadObservation>],
        ctx: &MarkerContext,
    ) -> Vec<LockonMarker> {
        let obs_at = |i: usize| observations.get(i).copied().flatten();

        // Pass 1: core smoothing
        for i in 0..LEAD_SLOTS {
            match obs_at(i) {
                Some(obs) => {
                    let sz = chevron_box_size(obs.distance);
                    let max_x = (ctx.viewport.width - sz / 2.0).max(0.0);
                    let x = obs.anchor.x.clamp(0.0, max_x);
                    let d = obs.distance.max(MIN_DISTANCE);
                    self.slots[i].track(x, obs.anchor.y, d, obs.accel);
                    self.last_raw_accel = obs.accel;
                }
                None => self.slots[i].decay(),
            }
        }

        // Pass 2: cross-slot derived fields
        let lateral_gap = (self.slots[0].lateral_proxy() - self.slots[1].lateral_proxy()).abs();
        let laterally_stable = lateral_gap <= LATERAL_SWAP_THRESHOLD;
        let first_is_right = self.slots[0].x > self.slots[1].x - INDICATOR_HYSTERESIS_PX;

        let mut markers = Vec::new();
        for i in 0..LEAD_SLOTS {
            let Some(obs) = obs_at(i) else {
                continue;
            };
            let geom = BoxGeometry::compute(&self.slots[i], ctx);
            let stroke_alpha = obs.prob.clamp(0.0, 1.0) * MAX_STROKE_ALPHA;
            let green = palette::LOCK_GREEN.with_alpha(stroke_alpha / 255.0);

            let marker = match i {
                0 => self.derive_primary(&geom, stroke_alpha, green, first_is_right, laterally_stable, ctx),
                1 => {
                    let outline = if laterally_stable {
                        green
                    } else {
                        palette::BRAKE_RED.with_alpha(stroke_alpha / 255.0)
                    };
                    let indicator = steer_indicator(
                        &mut self.slots[1],
                        &geom.rect,
                        !first_is_right,
                        ctx.viewport.width,
                    );
                    let d_lim = if ctx.wide_cam {
                        SECOND_LABEL_DIST_WIDE
                    } else {
                        SECOND_LABEL_DIST_NARROW
                    };
                    let show_label = geom.width >= LABEL_MIN_BOX_WIDTH
                        && (obs.distance < d_lim || !laterally_stable);
                    LockonMarker {
                        slot: 1,
                        rect: geom.rect,
                        outline,
                        label: show_label.then(|| rank_label(1, TextAlign::BottomLeft)),
                        indicator: Some(indicator),
                        meter: None,
                        ticks: None,
                        tick_color: green,
                    }
                }
                _ => LockonMarker {
                    slot: i,
                    rect: geom.rect,
                    outline: green,
                    label: (geom.width >= LABEL_MIN_BOX_WIDTH)
                        .then(|| rank_label(i, TextAlign::BottomLeft)),
                    indicator: None,
                    meter: None,
                    ticks: None,
                    tick_color: green,
                },
            };
            markers.push(marker);
        }
        markers
    }

    fn derive_primary(
        &mut self,
        geom: &BoxGeometry,
        stroke_alpha: f32,
        green: Color,
        first_is_right: bool,
        laterally_stable: bool,
        ctx: &MarkerContext,
    ) -> LockonMarker {
        let indicator = steer_indicator(&mut self.slots[0], &geom.rect, first_is_right, ctx.viewport.width);

        let state = &mut self.slots[0];
        let meter = if geom.width >= METER_MIN_BOX_WIDTH {
            fill_meter(geom, state.a, stroke_alpha)
        } else {
            None
        };

        let lock_target = if laterally_stable { LOCK_TARGET } else { 0.0 };
        state.lock_confidence = approach(state.lock_confidence, lock_target, LOCK_RATE);
        let ticks = (state.lock_confidence >= MIN_TICK_CONFIDENCE)
            .then(|| corner_ticks(&geom.rect, tick_length(state.lock_confidence, state.d)));

        LockonMarker {
            slot: 0,
            rect: geom.rect,
            outline: green,
            label: Some(rank_label(0, TextAlign::TopLeft)),
            indicator: Some(indicator),
            meter,
            ticks,
            tick_color: green,
        }
    }
}

/// Legacy chevron size, reused to keep lock-on anchors on screen.
pub(crate) fn chevron_box_size(d_rel: f32) -> f32 {
    ((25.0 * 30.0) / (d_rel / 3.0 + 30.0)).clamp(15.0, 30.0) * 2.35
}

fn rank_label(slot: usize, align: TextAlign) -> Label {
    Label {
        text: format!(" {}", slot + 1),
        align,
    }
}

#[derive(Debug, Clone, Copy)]
struct BoxGeometry {
    rect: Rect,
    width: f32,
    height: f32,
}

impl BoxGeometry {
    fn compute(state: &LeadState, ctx: &MarkerContext) -> Self {
        let d = state.d.max(MIN_DISTANCE);
        let mut ww = BASE_BOX_PX * ctx.marker_scale;
        let mut hh = BASE_BOX_PX * ctx.marker_scale;

        let dh = if ctx.wide_cam {
            // Wide lens: smaller box, offset falls off quadratically
            ww *= 0.5;
            hh *= 0.5;
            let dd = ((d - 5.0) / (95.0 / 10.0) + 1.0).max(1.0);
            100.0 / (dd * dd)
        } else {
            let dd = ((d - 25.0) / (75.0 / 2.0) + 1.0).max(1.0);
            50.0 / dd
        };

        ww = ww * 2.0 * 5.0 / d;
        hh = hh * 2.0 * 5.0 / d;
        let y = (state.y - dh).min(ctx.viewport.height) + dh;

        Self {
            rect: Rect::new(state.x - ww / 2.0, y - hh - dh, ww, hh),
            width: ww,
            height: hh,
        }
    }
}

/// Smooths the indicator ends toward the chosen side and returns the line to
/// draw, from the box top edge to the top of the screen.
fn steer_indicator(state: &mut LeadState, rect: &Rect, to_right: bool, screen_width: f32) -> (Point, Point) {
    let (anchor_target, far_target) = if to_right {
        (rect.right(), screen_width)
    } else {
        (rect.left(), 0.0)
    };
    state.indicator_anchor = approach(state.indicator_anchor, anchor_target, INDICATOR_RATE);
    state.indicator_far = approach(state.indicator_far, far_target, INDICATOR_RATE);

    let anchor_x = state.indicator_anchor.clamp(rect.left(), rect.right().max(rect.left()));
    (
        Point::new(anchor_x, rect.top()),
        Point::new(state.indicator_far, 0.0),
    )
}

/// Diagonally cut acceleration meter on the box's right edge.
///
/// Fill fraction is `1 - 0.1 / |a|`, floored at 0, so small decelerations
/// already show a partial fill. Acceleration fills bottom-up in green,
/// deceleration top-down in red.
fn fill_meter(geom: &BoxGeometry, a: f32, stroke_alpha: f32) -> Option<FillMeter> {
    if a == 0.0 {
        return None;
    }
    let (ww, hh) = (geom.width, geom.height);
    let wwa = (ww * 0.15).clamp(10.0, 40.0).min(ww);
    let right = geom.rect.right();
    let top = geom.rect.top();
    let inner = right - wwa / 2.0;

    if a > 0.0 {
        let hha = (1.0 - 0.1 / a).max(0.0) * hh;
        let cut = inner - wwa / 2.0 * hha / hh;
        Some(FillMeter {
            points: [
                Point::new(cut, top + (hh - hha)),
                Point::new(right, top + (hh - hha)),
                Point::new(right, top + hh),
                Point::new(inner, top + hh),
            ],
            color: palette::LOCK_GREEN.with_alpha(stroke_alpha * 0.9 / 255.0),
        })
    } else {
        let hha = (1.0 + 0.1 / a).max(0.0) * hh;
        let cut = inner - wwa / 2.0 * hha / hh;
        Some(FillMeter {
            points: [
                Point::new(inner, top),
                Point::new(right, top),
                Point::new(right, top + hha),
                Point::new(cut, top + hha),
            ],
            color: palette::BRAKE_RED.with_alpha(stroke_alpha / 255.0),
        })
    }
}

/// Tick length shrinks from full at 10 m to a third at 100 m.
fn tick_length(confidence: f32, distance: f32) -> f32 {
    let dd = (distance.max(10.0) - 10.0) / (90.0 / 2.0) + 1.0;
    confidence / dd
}

fn corner_ticks(rect: &Rect, length: f32) -> [(Point, Point); 4] {
    let half = TICK_WIDTH / 2.0;
    let c = rect.center();
    [
        (Point::new(c.x, rect.top() - half), Point::new(c.x, rect.top() - length)),
        (Point::new(rect.left() - half, c.y), Point::new(rect.left() - length, c.y)),
        (Point::new(rect.right() + half, c.y), Point::new(rect.right() + length, c.y)),
        (Point::new(c.x, rect.bottom() + half), Point::new(c.x, rect.bottom() + length)),
    ]
}

const LABEL_FONT: Font = Font::new(38, FontWeight::DemiBold);

pub fn draw_lockon(sink: &mut dyn DrawSink, marker: &LockonMarker) {
    sink.set_composition(Composition::Plus);
    let outline = Pen::new(marker.outline, OUTLINE_WIDTH);

    if let Some((from, to)) = marker.indicator {
        sink.stroke_line(from, to, &outline);
    }
    sink.stroke_rect(marker.rect, &outline);
    if let Some(label) = &marker.label {
        sink.draw_text(marker.rect, label.align, LABEL_FONT, marker.outline, &label.text);
    }
    if let Some(meter) = &marker.meter {
        sink.fill_polygon(&meter.points, &Brush::Solid(meter.color));
    }
    if let Some(ticks) = &marker.ticks {
        let pen = Pen::new(marker.tick_color, TICK_WIDTH);
        for (from, to) in ticks {
            sink.stroke_line(*from, *to, &pen);
        }
    }
    sink.set_composition(Composition::SourceOver);
}
