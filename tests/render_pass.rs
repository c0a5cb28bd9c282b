// tests/render_pass.rs: end-to-end replays through the render pass.

use onroad_overlay::paint::{Brush, DrawCommand, RecordingSink};
use onroad_overlay::types::{
    CalibrationSample, CarState, ModelLead, ModelSample, RadarLead, RadarSample, StreamType, XyztLine,
};
use onroad_overlay::{replay, Config, FrameInputs, FrameOutcome, PassState, RenderPass, Scenario};

fn straight(y: f32) -> XyztLine {
    let x: Vec<f32> = (0..33).map(|i| 200.0 * (i as f32 / 32.0).powi(2)).collect();
    XyztLine {
        y: vec![y; 33],
        z: vec![0.0; 33],
        t: x.iter().map(|x| x / 20.0).collect(),
        x,
    }
}

fn frame(frame_id: u64, leads: Vec<ModelLead>) -> FrameInputs {
    FrameInputs {
        frame_id,
        timestamp_ms: frame_id as f64 * 50.0,
        calibration: Some(CalibrationSample {
            frame_id,
            ..Default::default()
        }),
        model: Some(ModelSample {
            frame_id,
            position: straight(0.0),
            lane_lines: [straight(-5.4), straight(-1.8), straight(1.8), straight(5.4)],
            lane_line_probs: [0.5, 0.9, 0.9, 0.5],
            road_edges: [straight(-7.2), straight(7.2)],
            road_edge_stds: [0.1, 0.1],
            acceleration_x: vec![0.0; 33],
            leads,
        }),
        radar: Some(RadarSample {
            frame_id,
            lead_one: RadarLead {
                status: true,
                d_rel: 20.0,
                y_rel: 0.0,
                v_rel: -1.0,
            },
            lead_two: RadarLead::default(),
        }),
        car: Some(CarState {
            v_ego: 20.0,
            v_cruise_cluster: 90.0,
            ..Default::default()
        }),
        longitudinal_control: true,
        ..Default::default()
    }
}

fn lead(x: f32) -> ModelLead {
    ModelLead {
        x,
        y: 0.0,
        v: 19.0,
        a: 0.0,
        prob: 0.9,
    }
}

// ===== Synthetic approach =====

#[test]
fn synthetic_approach_replays_every_frame() {
    let scenario = Scenario::synthetic_approach(200);
    let mut pass = RenderPass::new(Config::default());
    let records = replay(&mut pass, &scenario);

    assert_eq!(records.len(), 200);
    let drawn = records
        .iter()
        .filter(|r| matches!(r.outcome, FrameOutcome::Drawn(_)))
        .count();
    assert_eq!(drawn, 197, "only the warm-up frames are skipped");
    assert_eq!(pass.state(), PassState::Ready);

    let summary = pass.metrics().summary();
    assert_eq!(summary.frames_painted, 197);
    assert_eq!(summary.frames_skipped, 3);
    assert!((summary.fps - 20.0).abs() < 0.5);

    // Every frame carries the HUD
    for record in &records {
        assert!(record
            .commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Text { text, .. } if text == "MAX")));
    }
}

#[test]
fn synthetic_dump_serializes_draw_commands() {
    let scenario = Scenario::synthetic_approach(10);
    let mut pass = RenderPass::new(Config::default());
    let records = replay(&mut pass, &scenario);

    let line = serde_json::to_string(&records[9]).unwrap();
    assert!(line.contains("\"op\":\"polygon\""));
    assert!(line.contains("\"op\":\"composition\""));
    assert!(line.contains("\"Drawn\""));
}

// ===== Lock-on =====

#[test]
fn aligned_leads_gain_lock_ticks() {
    let mut pass = RenderPass::new(Config::default());
    let mut sink = RecordingSink::new();

    for i in 1..=10 {
        sink.clear();
        let outcome = pass.paint(&frame(i, vec![lead(20.0), lead(20.1)]), &mut sink);
        let FrameOutcome::Drawn(stats) = outcome else {
            panic!("frame {i}: expected a drawn frame");
        };
        assert_eq!(stats.lockon_markers, 2);
    }

    let ticks = sink.lines().filter(|(_, _, pen)| pen.width == 8.0).count();
    assert_eq!(ticks, 4);
    let confidence = pass
        .lockon_bank()
        .state(0)
        .map(|s| s.lock_confidence)
        .unwrap_or(0.0);
    assert!(confidence > 35.0 && confidence < 40.0);
}

#[test]
fn vanished_leads_stop_drawing_and_decay() {
    let mut pass = RenderPass::new(Config::default());
    let mut sink = RecordingSink::new();
    for i in 1..=20 {
        pass.paint(&frame(i, vec![lead(20.0), lead(20.1)]), &mut sink);
    }
    let before = pass.lockon_bank().state(0).map(|s| s.x).unwrap_or(0.0);

    sink.clear();
    let FrameOutcome::Drawn(stats) = pass.paint(&frame(21, Vec::new()), &mut sink) else {
        panic!("expected a drawn frame");
    };
    assert_eq!(stats.lockon_markers, 0);
    let after = pass.lockon_bank().state(0).map(|s| s.x).unwrap_or(0.0);
    assert!(after < before);
}

// ===== Camera =====

#[test]
fn slow_experimental_drive_uses_wide_camera() {
    let mut pass = RenderPass::new(Config::default());
    let mut sink = RecordingSink::new();

    let mut inputs = frame(1, vec![lead(20.0)]);
    inputs.available_streams = vec![StreamType::Road, StreamType::WideRoad];
    inputs.experimental_mode = true;
    if let Some(car) = inputs.car.as_mut() {
        car.v_ego = 5.0;
    }
    let FrameOutcome::Drawn(stats) = pass.paint(&inputs, &mut sink) else {
        panic!("expected a drawn frame");
    };
    assert_eq!(stats.stream, StreamType::WideRoad);
    assert_eq!(pass.transform().map(|t| t.stream), Some(StreamType::WideRoad));

    // Experimental mode colors the path by acceleration
    let path = sink.polygons().nth(6).map(|(_, b)| b.clone());
    let Some(Brush::LinearGradient { stops, .. }) = path else {
        panic!("expected a gradient path");
    };
    // Stops sit at the path's on-screen points, not at fixed positions
    assert!(stops[0].position > 0.0);

    // Inside the hysteresis band the wide camera is kept
    inputs.frame_id = 2;
    if let Some(car) = inputs.car.as_mut() {
        car.v_ego = 12.0;
    }
    let FrameOutcome::Drawn(stats) = pass.paint(&inputs, &mut sink) else {
        panic!("expected a drawn frame");
    };
    assert_eq!(stats.stream, StreamType::WideRoad);

    inputs.frame_id = 3;
    if let Some(car) = inputs.car.as_mut() {
        car.v_ego = 16.0;
    }
    let FrameOutcome::Drawn(stats) = pass.paint(&inputs, &mut sink) else {
        panic!("expected a drawn frame");
    };
    assert_eq!(stats.stream, StreamType::Road);
    assert_eq!(pass.metrics().summary().camera_switches, 2);
}
