// src/types.rs
//
// Configuration tree plus the read-only per-frame snapshots the overlay
// consumes. Snapshots are owned by the upstream feeds; the render pass only
// borrows them for the duration of one paint.

use serde::{Deserialize, Serialize};

use crate::paint::Rect;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub camera: CameraConfig,
    pub overlay: OverlayConfig,
    pub hud: HudConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Focal length (px) of the narrow road camera
    pub narrow_focal: f32,
    /// Focal length (px) of the wide road camera
    pub wide_focal: f32,
    /// Principal point shared by both sensors
    pub center_x: f32,
    pub center_y: f32,
    pub narrow_zoom: f32,
    pub wide_zoom: f32,
    /// Below this ego speed (m/s) the wide stream is requested
    pub wide_enter_speed: f32,
    /// Above this ego speed (m/s) the narrow stream is restored
    pub wide_exit_speed: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub clip_margin: f32,
    pub min_draw_distance: f32,
    pub max_draw_distance: f32,
    /// Lead marker size multiplier (1.25 on the large display)
    pub marker_scale: f32,
    pub lead_prob_threshold: f32,
    pub ui_freq: f32,
    pub slow_fps_threshold: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HudConfig {
    pub header_height: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

// ============================================================================
// PER-FRAME SNAPSHOTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StreamType {
    #[default]
    Road,
    WideRoad,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(2160.0, 1080.0)
    }
}

/// Forward-indexed samples in vehicle space (x forward, y right, z down).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XyztLine {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub t: Vec<f32>,
}

impl XyztLine {
    /// Number of complete (x, y, z) samples.
    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len()).min(self.z.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_x(&self) -> Option<f32> {
        self.x[..self.len()].last().copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSample {
    pub frame_id: u64,
    /// Device-from-calibration roll, pitch, yaw (rad)
    pub rpy_calib: [f32; 3],
    /// Wide-from-device roll, pitch, yaw (rad)
    pub wide_from_device_euler: [f32; 3],
}

/// One model-predicted lead, ranked by distance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelLead {
    /// Forward distance (m)
    pub x: f32,
    /// Lateral position (m, right positive like the model lines)
    pub y: f32,
    /// Relative speed (m/s)
    pub v: f32,
    /// Relative acceleration (m/s^2)
    pub a: f32,
    pub prob: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSample {
    pub frame_id: u64,
    pub position: XyztLine,
    pub lane_lines: [XyztLine; 4],
    pub lane_line_probs: [f32; 4],
    pub road_edges: [XyztLine; 2],
    pub road_edge_stds: [f32; 2],
    /// Planned longitudinal acceleration along `position`
    pub acceleration_x: Vec<f32>,
    pub leads: Vec<ModelLead>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarLead {
    pub status: bool,
    pub d_rel: f32,
    /// Lateral offset (m, left positive)
    pub y_rel: f32,
    pub v_rel: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadarSample {
    pub frame_id: u64,
    pub lead_one: RadarLead,
    pub lead_two: RadarLead,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarState {
    pub v_ego: f32,
    pub v_ego_cluster: f32,
    pub v_cruise_cluster: f32,
    pub v_cruise_deprecated: f32,
    pub brake_lights: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngagementStatus {
    #[default]
    Disengaged,
    Override,
    Engaged,
}

/// Everything the render pass reads for one paint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameInputs {
    pub frame_id: u64,
    pub timestamp_ms: f64,
    pub viewport: Viewport,
    /// Frame marker recorded when the drive session started
    pub started_frame: u64,
    pub calibration: Option<CalibrationSample>,
    pub model: Option<ModelSample>,
    pub radar: Option<RadarSample>,
    /// `None` while the car state feed is not alive
    pub car: Option<CarState>,
    pub longitudinal_control: bool,
    pub experimental_mode: bool,
    pub allow_throttle: bool,
    pub world_objects_visible: bool,
    pub available_streams: Vec<StreamType>,
    pub is_metric: bool,
    pub status: EngagementStatus,
}

impl Default for FrameInputs {
    fn default() -> Self {
        Self {
            frame_id: 0,
            timestamp_ms: 0.0,
            viewport: Viewport::default(),
            started_frame: 0,
            calibration: None,
            model: None,
            radar: None,
            car: None,
            longitudinal_control: false,
            experimental_mode: false,
            allow_throttle: true,
            world_objects_visible: true,
            available_streams: vec![StreamType::Road],
            is_metric: true,
            status: EngagementStatus::Disengaged,
        }
    }
}

impl FrameInputs {
    pub fn v_ego(&self) -> f32 {
        self.car.map(|c| c.v_ego).unwrap_or(0.0)
    }

    pub fn has_stream(&self, stream: StreamType) -> bool {
        self.available_streams.contains(&stream)
    }
}
