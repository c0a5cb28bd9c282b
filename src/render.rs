// src/render.rs
//
// Per-frame orchestration. One `RenderPass` lives as long as the onroad view
// and is fed a `FrameInputs` snapshot on every display refresh:
//
//   camera selection → calibration transform → ribbons → lanes/edges → path
//     → lock-on markers → chevrons → HUD
//
// Nothing here fails. Missing or stale upstream samples only suppress the
// overlay for that frame; the HUD is always drawn.

use serde::Serialize;
use tracing::{debug, info};

use crate::geometry::{
    build_ribbon, max_draw_distance, path_draw_distance, path_length_idx, RibbonParams, ScreenPolygon,
};
use crate::hud::HudState;
use crate::lead::{
    build_chevron, draw_chevron, draw_lockon, lead_anchor, AccelColorLatch, LeadObservation, LockonBank,
    MarkerContext, LEAD_ANCHOR_HEIGHT, LEAD_SLOTS,
};
use crate::metrics::OverlayMetrics;
use crate::paint::{Brush, DrawSink, Point};
use crate::path_style::{acceleration_gradient, lane_line_brush, road_edge_brush, ThrottleBlend};
use crate::projection::{CalibrationTransform, CameraSelector, Projector};
use crate::types::{Config, FrameInputs, ModelSample, RadarSample, StreamType};

const LANE_LINE_WIDTH: f32 = 0.025;
const ROAD_EDGE_HALF_WIDTH: f32 = 0.025;
const PATH_HALF_WIDTH: f32 = 0.9;
/// Second radar lead is only drawn when it is this far (m) from the first
const SECOND_LEAD_MIN_GAP: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PassState {
    WaitingForFrame,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    WorldObjectsHidden,
    NoCalibration,
    StaleCalibration,
    NoModel,
    StaleModel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub stream: StreamType,
    pub polygons: usize,
    pub lockon_markers: usize,
    pub chevrons: usize,
    pub fps: f32,
}

/// Result of one paint. `Skipped` still means the HUD was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum FrameOutcome {
    Skipped(SkipReason),
    Drawn(FrameStats),
}

/// Ribbons rebuilt from one model sample.
#[derive(Debug, Clone, Default)]
pub struct SceneGeometry {
    pub lane_lines: Vec<ScreenPolygon>,
    pub road_edges: Vec<ScreenPolygon>,
    pub track: ScreenPolygon,
}

impl SceneGeometry {
    pub fn build(projector: &Projector, model: &ModelSample, radar: Option<&RadarSample>, config: &Config) -> Self {
        let overlay = &config.overlay;
        let max_distance = max_draw_distance(&model.position, overlay.min_draw_distance, overlay.max_draw_distance);

        let max_idx = path_length_idx(&model.lane_lines[0], max_distance);
        let lane_lines = model
            .lane_lines
            .iter()
            .zip(model.lane_line_probs.iter())
            .map(|(line, &prob)| {
                build_ribbon(
                    projector,
                    line,
                    RibbonParams {
                        half_width: LANE_LINE_WIDTH * prob,
                        vertical_offset: 0.0,
                        horizon_index: max_idx,
                        allow_inversion: true,
                    },
                )
            })
            .collect();
        let road_edges = model
            .road_edges
            .iter()
            .map(|edge| {
                build_ribbon(
                    projector,
                    edge,
                    RibbonParams {
                        half_width: ROAD_EDGE_HALF_WIDTH,
                        vertical_offset: 0.0,
                        horizon_index: max_idx,
                        allow_inversion: true,
                    },
                )
            })
            .collect();

        let lead_distance = radar.map(|r| r.lead_one).filter(|l| l.status).map(|l| l.d_rel);
        let path_distance = path_draw_distance(max_distance, lead_distance);
        let track = build_ribbon(
            projector,
            &model.position,
            RibbonParams {
                half_width: PATH_HALF_WIDTH,
                vertical_offset: LEAD_ANCHOR_HEIGHT,
                horizon_index: path_length_idx(&model.position, path_distance),
                allow_inversion: false,
            },
        );

        Self {
            lane_lines,
            road_edges,
            track,
        }
    }
}

pub struct RenderPass {
    config: Config,
    state: PassState,
    selector: CameraSelector,
    bank: LockonBank,
    throttle: ThrottleBlend,
    accel_latch: AccelColorLatch,
    hud: HudState,
    metrics: OverlayMetrics,
    transform: Option<CalibrationTransform>,
    /// Last on-screen anchors of radar lead one and two. Kept across frames
    /// and refreshed only while the radar reports that lead.
    lead_vertices: [Option<Point>; 2],
}

impl RenderPass {
    pub fn new(config: Config) -> Self {
        Self {
            selector: CameraSelector::new(&config.camera),
            hud: HudState::new(&config.hud),
            metrics: OverlayMetrics::new(config.overlay.ui_freq, config.overlay.slow_fps_threshold),
            state: PassState::WaitingForFrame,
            bank: LockonBank::new(),
            throttle: ThrottleBlend::new(),
            accel_latch: AccelColorLatch::new(),
            transform: None,
            lead_vertices: [None; 2],
            config,
        }
    }

    pub fn state(&self) -> PassState {
        self.state
    }

    pub fn metrics(&self) -> &OverlayMetrics {
        &self.metrics
    }

    pub fn lockon_bank(&self) -> &LockonBank {
        &self.bank
    }

    /// Anchor shared by the lock-on box and chevron of radar lead `rank`.
    pub fn lead_vertex(&self, rank: usize) -> Option<Point> {
        self.lead_vertices.get(rank).copied().flatten()
    }

    /// Transform used by the last drawn frame.
    pub fn transform(&self) -> Option<&CalibrationTransform> {
        self.transform.as_ref()
    }

    pub fn paint(&mut self, inputs: &FrameInputs, sink: &mut dyn DrawSink) -> FrameOutcome {
        let stream_before = self.selector.stream();
        let stream = self.selector.update(inputs);
        if stream != stream_before {
            self.metrics.inc(&self.metrics.camera_switches);
        }

        let outcome = match self.check_freshness(inputs) {
            Err(reason) => {
                self.set_state(PassState::WaitingForFrame, inputs.frame_id);
                self.metrics.inc(&self.metrics.frames_skipped);
                debug!(frame = inputs.frame_id, ?reason, "overlay skipped");
                FrameOutcome::Skipped(reason)
            }
            Ok(()) => {
                self.set_state(PassState::Ready, inputs.frame_id);
                let stats = self.draw_overlay(inputs, stream, sink);
                self.metrics.inc(&self.metrics.frames_painted);
                FrameOutcome::Drawn(stats)
            }
        };

        self.hud.update(inputs);
        self.hud.draw(sink, inputs.viewport);

        let fps = self.metrics.record_frame_time(inputs.timestamp_ms);
        match outcome {
            FrameOutcome::Drawn(stats) => FrameOutcome::Drawn(FrameStats { fps, ..stats }),
            skipped => skipped,
        }
    }

    fn check_freshness(&self, inputs: &FrameInputs) -> Result<(), SkipReason> {
        if !inputs.world_objects_visible {
            return Err(SkipReason::WorldObjectsHidden);
        }
        match &inputs.calibration {
            None => return Err(SkipReason::NoCalibration),
            Some(c) if c.frame_id < inputs.started_frame => return Err(SkipReason::StaleCalibration),
            Some(_) => {}
        }
        match &inputs.model {
            None => Err(SkipReason::NoModel),
            Some(m) if m.frame_id < inputs.started_frame => Err(SkipReason::StaleModel),
            Some(_) => Ok(()),
        }
    }

    fn set_state(&mut self, next: PassState, frame_id: u64) {
        if self.state != next {
            info!(frame = frame_id, from = ?self.state, to = ?next, "render pass state change");
            self.state = next;
        }
    }

    fn draw_overlay(&mut self, inputs: &FrameInputs, stream: StreamType, sink: &mut dyn DrawSink) -> FrameStats {
        let mut stats = FrameStats {
            stream,
            ..FrameStats::default()
        };
        let (Some(calibration), Some(model)) = (&inputs.calibration, &inputs.model) else {
            return stats;
        };

        let transform = CalibrationTransform::derive(calibration, stream, &self.config.camera, inputs.viewport);
        let projector = Projector::new(transform.car_space, inputs.viewport, self.config.overlay.clip_margin);
        self.transform = Some(transform);

        let scene = SceneGeometry::build(&projector, model, inputs.radar.as_ref(), &self.config);

        for (polygon, &prob) in scene.lane_lines.iter().zip(model.lane_line_probs.iter()) {
            stats.polygons += fill(sink, polygon, &lane_line_brush(prob));
        }
        for (polygon, &std) in scene.road_edges.iter().zip(model.road_edge_stds.iter()) {
            stats.polygons += fill(sink, polygon, &road_edge_brush(std));
        }

        let height = inputs.viewport.height;
        let path_brush = if inputs.experimental_mode {
            acceleration_gradient(&scene.track, &model.acceleration_x, height)
        } else {
            let allow_throttle = inputs.allow_throttle || !inputs.longitudinal_control;
            self.throttle.update(allow_throttle, height)
        };
        stats.polygons += fill(sink, &scene.track, &path_brush);
        self.metrics.add(&self.metrics.polygons_drawn, stats.polygons as u64);

        if !inputs.longitudinal_control {
            return stats;
        }
        let Some(radar) = inputs.radar.as_ref().filter(|r| r.frame_id > inputs.started_frame) else {
            return stats;
        };

        for (vertex, lead) in self.lead_vertices.iter_mut().zip([radar.lead_one, radar.lead_two]) {
            if !lead.status {
                continue;
            }
            if let Some(anchor) = lead_anchor(&projector, &model.position, lead.d_rel, lead.y_rel) {
                *vertex = Some(anchor);
            }
        }

        let observations: Vec<Option<LeadObservation>> = model
            .leads
            .iter()
            .take(LEAD_SLOTS)
            .enumerate()
            .map(|(slot, lead)| {
                if lead.prob <= self.config.overlay.lead_prob_threshold {
                    return None;
                }
                // Slots 0 and 1 frame the radar leads; deeper slots use the
                // model's own position, which is right-positive.
                let anchor = match self.lead_vertex(slot) {
                    Some(vertex) => vertex,
                    None => lead_anchor(&projector, &model.position, lead.x, -lead.y)?,
                };
                Some(LeadObservation {
                    anchor,
                    distance: lead.x,
                    accel: lead.a,
                    prob: lead.prob,
                })
            })
            .collect();
        let ctx = MarkerContext {
            viewport: inputs.viewport,
            wide_cam: stream == StreamType::WideRoad,
            marker_scale: self.config.overlay.marker_scale,
        };
        let markers = self.bank.update(&observations, &ctx);
        for marker in &markers {
            draw_lockon(sink, marker);
        }
        stats.lockon_markers = markers.len();
        self.metrics.add(&self.metrics.lockon_markers, markers.len() as u64);

        let (one, two) = (radar.lead_one, radar.lead_two);
        let mut chevron_leads = Vec::with_capacity(2);
        if one.status {
            chevron_leads.push((0, one));
        }
        if two.status && (one.d_rel - two.d_rel).abs() > SECOND_LEAD_MIN_GAP {
            chevron_leads.push((1, two));
        }
        for (rank, lead) in chevron_leads {
            let Some(anchor) = self.lead_vertex(rank) else {
                continue;
            };
            let chevron = build_chevron(&lead, anchor, inputs.viewport, rank, inputs.v_ego());
            // The speed label color only advances when it is drawn
            let accelerating = chevron.labels.is_some() && self.accel_latch.update(self.bank.last_raw_accel());
            draw_chevron(sink, &chevron, accelerating);
            stats.chevrons += 1;
        }
        self.metrics.add(&self.metrics.chevrons_drawn, stats.chevrons as u64);

        debug!(
            frame = inputs.frame_id,
            polygons = stats.polygons,
            markers = stats.lockon_markers,
            chevrons = stats.chevrons,
            "overlay drawn"
        );
        stats
    }
}

fn fill(sink: &mut dyn DrawSink, polygon: &ScreenPolygon, brush: &Brush) -> usize {
    if polygon.is_empty() {
        return 0;
    }
    sink.fill_polygon(&polygon.points, brush);
    1
}
