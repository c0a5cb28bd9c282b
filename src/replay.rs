// src/replay.rs
//
// Offline driving of the render pass: a scenario is a list of per-frame input
// snapshots, loaded from JSON or generated synthetically, replayed into a
// recording sink so every frame's draw calls can be inspected or dumped.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::paint::{DrawCommand, RecordingSink};
use crate::render::{FrameOutcome, RenderPass};
use crate::types::{
    CalibrationSample, CarState, EngagementStatus, FrameInputs, ModelLead, ModelSample, RadarLead, RadarSample,
    StreamType, Viewport, XyztLine,
};

/// Samples per model line, spaced quadratically in time over 10 s.
const MODEL_SAMPLES: usize = 33;
const MODEL_HORIZON_S: f32 = 10.0;
const LANE_WIDTH: f32 = 3.6;
const FRAME_MS: f64 = 50.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    pub frames: Vec<FrameInputs>,
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&content)
            .with_context(|| format!("parsing scenario {}", path.display()))?;
        Ok(scenario)
    }

    /// Lead closing in from 60 m at 4 m/s on a gentle right curve, with a
    /// second car one lane over. The first frames have no model output yet
    /// and the planner stops allowing throttle once the gap drops under 35 m.
    pub fn synthetic_approach(frame_count: usize) -> Self {
        let v_ego = 20.0;
        let curvature = 0.0005;
        let warmup = 3;

        let frames = (0..frame_count)
            .map(|i| {
                let frame_id = i as u64 + 1;
                let t = i as f32 * (FRAME_MS as f32 / 1000.0);
                let d_one = (60.0 - 4.0 * t).max(5.0);
                let d_two = d_one + 25.0;
                let y_one = 0.3 * (t * 0.8).sin();

                let model = (i >= warmup).then(|| ModelSample {
                    frame_id,
                    position: curved_line(v_ego, 0.0, curvature),
                    lane_lines: [
                        curved_line(v_ego, -1.5 * LANE_WIDTH, curvature),
                        curved_line(v_ego, -0.5 * LANE_WIDTH, curvature),
                        curved_line(v_ego, 0.5 * LANE_WIDTH, curvature),
                        curved_line(v_ego, 1.5 * LANE_WIDTH, curvature),
                    ],
                    lane_line_probs: [0.4, 0.95, 0.95, 0.4],
                    road_edges: [
                        curved_line(v_ego, -2.0 * LANE_WIDTH, curvature),
                        curved_line(v_ego, 2.0 * LANE_WIDTH, curvature),
                    ],
                    road_edge_stds: [0.3, 0.3],
                    acceleration_x: vec![if d_one < 35.0 { -0.8 } else { 0.2 }; MODEL_SAMPLES],
                    leads: vec![
                        ModelLead {
                            x: d_one,
                            y: -y_one,
                            v: v_ego - 4.0,
                            a: -0.2,
                            prob: 0.9,
                        },
                        ModelLead {
                            x: d_two,
                            y: -LANE_WIDTH,
                            v: v_ego,
                            a: 0.0,
                            prob: 0.6,
                        },
                    ],
                });

                FrameInputs {
                    frame_id,
                    timestamp_ms: i as f64 * FRAME_MS,
                    viewport: Viewport::default(),
                    started_frame: 0,
                    calibration: Some(CalibrationSample {
                        frame_id,
                        rpy_calib: [0.0, 0.02, -0.01],
                        wide_from_device_euler: [0.0, 0.0, 0.0],
                    }),
                    model,
                    radar: Some(RadarSample {
                        frame_id,
                        lead_one: RadarLead {
                            status: true,
                            d_rel: d_one,
                            y_rel: y_one,
                            v_rel: -4.0,
                        },
                        lead_two: RadarLead {
                            status: true,
                            d_rel: d_two,
                            y_rel: LANE_WIDTH,
                            v_rel: 0.0,
                        },
                    }),
                    car: Some(CarState {
                        v_ego,
                        v_ego_cluster: v_ego,
                        v_cruise_cluster: 100.0,
                        v_cruise_deprecated: 0.0,
                        brake_lights: d_one < 25.0,
                    }),
                    longitudinal_control: true,
                    experimental_mode: false,
                    allow_throttle: d_one >= 35.0,
                    world_objects_visible: true,
                    available_streams: vec![StreamType::Road, StreamType::WideRoad],
                    is_metric: true,
                    status: EngagementStatus::Engaged,
                }
            })
            .collect();

        Self {
            name: "synthetic-approach".to_string(),
            frames,
        }
    }
}

fn curved_line(v_ego: f32, lateral: f32, curvature: f32) -> XyztLine {
    let t: Vec<f32> = (0..MODEL_SAMPLES)
        .map(|i| MODEL_HORIZON_S * (i as f32 / (MODEL_SAMPLES - 1) as f32).powi(2))
        .collect();
    let x: Vec<f32> = t.iter().map(|t| t * v_ego).collect();
    let y = x.iter().map(|x| lateral + curvature * x * x).collect();
    XyztLine {
        y,
        z: vec![0.0; MODEL_SAMPLES],
        x,
        t,
    }
}

/// One replayed frame: what the pass decided and everything it drew.
#[derive(Debug, Clone, Serialize)]
pub struct FrameRecord {
    pub frame_id: u64,
    pub outcome: FrameOutcome,
    pub commands: Vec<DrawCommand>,
}

pub fn replay(pass: &mut RenderPass, scenario: &Scenario) -> Vec<FrameRecord> {
    info!("▶ Replaying '{}' ({} frames)", scenario.name, scenario.frames.len());
    let mut sink = RecordingSink::new();
    scenario
        .frames
        .iter()
        .map(|inputs| {
            sink.clear();
            let outcome = pass.paint(inputs, &mut sink);
            FrameRecord {
                frame_id: inputs.frame_id,
                outcome,
                commands: std::mem::take(&mut sink.commands),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SkipReason;
    use crate::types::Config;

    #[test]
    fn test_synthetic_scenario_warms_up_then_draws() {
        let scenario = Scenario::synthetic_approach(40);
        let mut pass = RenderPass::new(Config::default());
        let records = replay(&mut pass, &scenario);

        assert_eq!(records.len(), 40);
        assert_eq!(records[0].outcome, FrameOutcome::Skipped(SkipReason::NoModel));
        let FrameOutcome::Drawn(stats) = records[39].outcome else {
            panic!("expected a drawn frame");
        };
        assert_eq!(stats.lockon_markers, 2);
        assert_eq!(stats.chevrons, 2);
        // Fast enough for the narrow camera
        assert_eq!(stats.stream, StreamType::Road);
        assert!(records[39].commands.len() > records[0].commands.len());
    }

    #[test]
    fn test_lead_distance_closes() {
        let scenario = Scenario::synthetic_approach(200);
        let first = scenario.frames[0].radar.as_ref().map(|r| r.lead_one.d_rel);
        let last = scenario.frames[199].radar.as_ref().map(|r| r.lead_one.d_rel);
        assert_eq!(first, Some(60.0));
        assert!(last.unwrap_or(f32::MAX) < 21.0);
        assert!(!scenario.frames[199].allow_throttle);
    }

    #[test]
    fn test_load_round_trip_and_errors() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("onroad_overlay_scenario_{}.json", std::process::id()));
        let scenario = Scenario::synthetic_approach(5);
        std::fs::write(&path, serde_json::to_string(&scenario).unwrap()).unwrap();

        let loaded = Scenario::load(&path).unwrap();
        assert_eq!(loaded.name, "synthetic-approach");
        assert_eq!(loaded.frames.len(), 5);
        assert_eq!(loaded.frames[4].model, scenario.frames[4].model);

        std::fs::write(&path, "{ not json").unwrap();
        let err = Scenario::load(&path).unwrap_err();
        assert!(err.to_string().contains("parsing scenario"));
        std::fs::remove_file(&path).ok();

        assert!(Scenario::load(dir.join("does_not_exist_scenario.json")).is_err());
    }

    #[test]
    fn test_sparse_frame_json_uses_defaults() {
        let json = r#"{ "frames": [ { "frame_id": 3 } ] }"#;
        let scenario: Scenario = serde_json::from_str(json).unwrap();
        let frame = &scenario.frames[0];
        assert_eq!(frame.frame_id, 3);
        assert!(frame.allow_throttle);
        assert!(frame.world_objects_visible);
        assert!(frame.model.is_none());
    }
}
