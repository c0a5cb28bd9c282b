// src/projection/selector.rs
//
// Narrow/wide camera selection with a speed hysteresis band. The wide stream
// is only ever requested in experimental mode.

use tracing::info;

use crate::types::{CameraConfig, FrameInputs, StreamType};

#[derive(Debug, Clone)]
pub struct CameraSelector {
    wide_requested: bool,
    enter_speed: f32,
    exit_speed: f32,
}

impl CameraSelector {
    pub fn new(camera: &CameraConfig) -> Self {
        Self {
            wide_requested: false,
            enter_speed: camera.wide_enter_speed,
            exit_speed: camera.wide_exit_speed,
        }
    }

    pub fn update(&mut self, inputs: &FrameInputs) -> StreamType {
        let before = self.wide_requested;

        if inputs.has_stream(StreamType::WideRoad) {
            let v_ego = inputs.v_ego();
            if v_ego < self.enter_speed || inputs.available_streams.len() == 1 {
                self.wide_requested = true;
            } else if v_ego > self.exit_speed {
                self.wide_requested = false;
            }
            self.wide_requested = self.wide_requested && inputs.experimental_mode;
        }

        if before != self.wide_requested {
            info!(
                "Switching to {} camera at {:.1} m/s",
                if self.wide_requested { "wide" } else { "narrow" },
                inputs.v_ego()
            );
        }
        self.stream()
    }

    pub fn stream(&self) -> StreamType {
        if self.wide_requested {
            StreamType::WideRoad
        } else {
            StreamType::Road
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CarState;

    fn inputs(v_ego: f32, experimental: bool, streams: Vec<StreamType>) -> FrameInputs {
        FrameInputs {
            car: Some(CarState {
                v_ego,
                ..Default::default()
            }),
            experimental_mode: experimental,
            available_streams: streams,
            ..Default::default()
        }
    }

    fn both() -> Vec<StreamType> {
        vec![StreamType::Road, StreamType::WideRoad]
    }

    #[test]
    fn test_hysteresis_band() {
        let mut sel = CameraSelector::new(&CameraConfig::default());
        assert_eq!(sel.update(&inputs(5.0, true, both())), StreamType::WideRoad);
        // Inside the band the previous choice sticks.
        assert_eq!(sel.update(&inputs(12.0, true, both())), StreamType::WideRoad);
        assert_eq!(sel.update(&inputs(16.0, true, both())), StreamType::Road);
        assert_eq!(sel.update(&inputs(12.0, true, both())), StreamType::Road);
        assert_eq!(sel.update(&inputs(9.9, true, both())), StreamType::WideRoad);
    }

    #[test]
    fn test_requires_experimental_mode() {
        let mut sel = CameraSelector::new(&CameraConfig::default());
        assert_eq!(sel.update(&inputs(3.0, false, both())), StreamType::Road);
        assert_eq!(sel.update(&inputs(3.0, true, both())), StreamType::WideRoad);
        assert_eq!(sel.update(&inputs(3.0, false, both())), StreamType::Road);
    }

    #[test]
    fn test_no_wide_stream_keeps_narrow() {
        let mut sel = CameraSelector::new(&CameraConfig::default());
        assert_eq!(
            sel.update(&inputs(3.0, true, vec![StreamType::Road])),
            StreamType::Road
        );
    }

    #[test]
    fn test_wide_only_stream_forces_wide_at_speed() {
        let mut sel = CameraSelector::new(&CameraConfig::default());
        assert_eq!(
            sel.update(&inputs(30.0, true, vec![StreamType::WideRoad])),
            StreamType::WideRoad
        );
    }
}
