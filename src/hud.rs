// src/hud.rs
//
// Speed widgets drawn on top of the road overlay: header shade, the set-speed
// ("MAX") box and the current speed readout.

use tracing::debug;

use crate::paint::{palette, Brush, Color, DrawSink, Font, FontWeight, GradientStop, Pen, Point, Rect, TextAlign};
use crate::types::{EngagementStatus, FrameInputs, HudConfig, Viewport};

pub const KM_TO_MILE: f32 = 0.621371;
pub const MS_TO_KPH: f32 = 3.6;
pub const MS_TO_MPH: f32 = MS_TO_KPH * KM_TO_MILE;

/// Sentinel for "no set speed" in the cruise cluster fields.
pub const SET_SPEED_NA: f32 = 255.0;

const SET_SPEED_DEFAULT_WIDTH: f32 = 172.0;
const SET_SPEED_METRIC_WIDTH: f32 = 200.0;
const SET_SPEED_HEIGHT: f32 = 204.0;
const SET_SPEED_ORIGIN: Point = Point::new(60.0, 45.0);

#[derive(Debug, Clone)]
pub struct HudState {
    is_metric: bool,
    status: EngagementStatus,
    is_cruise_set: bool,
    set_speed: f32,
    speed: f32,
    brake_lights: bool,
    v_ego_cluster_seen: bool,
    header_height: f32,
}

impl HudState {
    pub fn new(config: &HudConfig) -> Self {
        Self {
            is_metric: true,
            status: EngagementStatus::Disengaged,
            is_cruise_set: false,
            set_speed: SET_SPEED_NA,
            speed: 0.0,
            brake_lights: false,
            v_ego_cluster_seen: false,
            header_height: config.header_height,
        }
    }

    pub fn is_cruise_set(&self) -> bool {
        self.is_cruise_set
    }

    /// Set speed in display units (km/h or mph).
    pub fn set_speed(&self) -> f32 {
        self.set_speed
    }

    /// Current speed in display units (km/h or mph).
    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn update(&mut self, inputs: &FrameInputs) {
        self.is_metric = inputs.is_metric;
        self.status = inputs.status;

        let Some(car) = inputs.car else {
            self.is_cruise_set = false;
            self.set_speed = SET_SPEED_NA;
            self.speed = 0.0;
            return;
        };

        // Older logs leave the cluster field at zero
        self.set_speed = if car.v_cruise_cluster == 0.0 {
            car.v_cruise_deprecated
        } else {
            car.v_cruise_cluster
        };
        self.is_cruise_set = self.set_speed > 0.0 && self.set_speed != SET_SPEED_NA;
        self.brake_lights = car.brake_lights;

        if self.is_cruise_set && !self.is_metric {
            self.set_speed *= KM_TO_MILE;
        }

        self.v_ego_cluster_seen = self.v_ego_cluster_seen || car.v_ego_cluster != 0.0;
        let v_ego = if self.v_ego_cluster_seen {
            car.v_ego_cluster
        } else {
            car.v_ego
        };
        let factor = if self.is_metric { MS_TO_KPH } else { MS_TO_MPH };
        self.speed = (v_ego * factor).max(0.0);

        debug!(speed = self.speed, set_speed = self.set_speed, cruise = self.is_cruise_set, "HUD updated");
    }

    pub fn draw(&self, sink: &mut dyn DrawSink, viewport: Viewport) {
        let top = self.header_height - self.header_height / 2.5;
        let shade = if self.brake_lights {
            Color::rgba(1.0, 0.48, 0.5, 0.45)
        } else {
            Color::rgba(0.0, 0.0, 0.0, 0.45)
        };
        let header = Brush::LinearGradient {
            start: Point::new(0.0, top),
            end: Point::new(0.0, self.header_height),
            stops: vec![
                GradientStop { position: 0.0, color: shade },
                GradientStop { position: 1.0, color: palette::TRANSPARENT },
            ],
        };
        sink.fill_rect(Rect::new(0.0, 0.0, viewport.width, self.header_height), &header);

        self.draw_set_speed(sink);
        self.draw_current_speed(sink, viewport);
    }

    fn set_speed_rect(&self) -> Rect {
        let width = if self.is_metric {
            SET_SPEED_METRIC_WIDTH
        } else {
            SET_SPEED_DEFAULT_WIDTH
        };
        Rect::new(
            SET_SPEED_ORIGIN.x + (SET_SPEED_DEFAULT_WIDTH - width) / 2.0,
            SET_SPEED_ORIGIN.y,
            width,
            SET_SPEED_HEIGHT,
        )
    }

    fn draw_set_speed(&self, sink: &mut dyn DrawSink) {
        let rect = self.set_speed_rect();
        sink.draw_rounded_rect(
            rect,
            32.0,
            &Pen::new(Color::rgba8(255.0, 255.0, 255.0, 75.0), 6.0),
            &Brush::Solid(Color::rgba8(0.0, 0.0, 0.0, 166.0)),
        );

        let mut max_color = Color::rgba8(0xa6 as f32, 0xa6 as f32, 0xa6 as f32, 255.0);
        let mut set_speed_color = Color::rgba8(0x72 as f32, 0x72 as f32, 0x72 as f32, 255.0);
        if self.is_cruise_set {
            set_speed_color = palette::WHITE;
            max_color = match self.status {
                EngagementStatus::Disengaged => palette::WHITE,
                EngagementStatus::Override => Color::rgba8(0x91 as f32, 0x9b as f32, 0x95 as f32, 255.0),
                EngagementStatus::Engaged => Color::rgba8(0x80 as f32, 0xd8 as f32, 0xa6 as f32, 255.0),
            };
        }

        let below = |offset: f32| Rect::new(rect.x, rect.y + offset, rect.width, rect.height - offset);
        sink.draw_text(below(27.0), TextAlign::TopCenter, Font::new(40, FontWeight::DemiBold), max_color, "MAX");

        let text = if self.is_cruise_set {
            format!("{}", self.set_speed.round_ties_even() as i32)
        } else {
            "–".to_string()
        };
        sink.draw_text(below(77.0), TextAlign::TopCenter, Font::new(90, FontWeight::Bold), set_speed_color, &text);
    }

    fn draw_current_speed(&self, sink: &mut dyn DrawSink, viewport: Viewport) {
        let speed = format!("{}", self.speed.round_ties_even() as i32);
        centered_text(sink, viewport, 210.0, Font::new(176, FontWeight::Bold), palette::WHITE, &speed);

        let unit = if self.is_metric { "km/h" } else { "mph" };
        let unit_color = palette::WHITE.with_alpha(200.0 / 255.0);
        centered_text(sink, viewport, 290.0, Font::new(66, FontWeight::Normal), unit_color, unit);
    }
}

/// Text horizontally centered on the viewport with its baseline at `baseline`.
fn centered_text(sink: &mut dyn DrawSink, viewport: Viewport, baseline: f32, font: Font, color: Color, text: &str) {
    let height = font.size as f32;
    let rect = Rect::new(0.0, baseline - height, viewport.width, height);
    sink.draw_text(rect, TextAlign::Center, font, color, text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::{DrawCommand, RecordingSink};
    use crate::types::CarState;
    use approx::assert_abs_diff_eq;

    fn hud() -> HudState {
        HudState::new(&HudConfig::default())
    }

    fn inputs(car: Option<CarState>, is_metric: bool) -> FrameInputs {
        FrameInputs {
            car,
            is_metric,
            ..FrameInputs::default()
        }
    }

    #[test]
    fn test_metric_speed_and_set_speed() {
        let mut h = hud();
        let car = CarState {
            v_ego: 20.0,
            v_cruise_cluster: 100.0,
            ..CarState::default()
        };
        h.update(&inputs(Some(car), true));
        assert!(h.is_cruise_set());
        assert_eq!(h.set_speed(), 100.0);
        assert_abs_diff_eq!(h.speed(), 72.0, epsilon = 1e-3);
    }

    #[test]
    fn test_imperial_conversion() {
        let mut h = hud();
        let car = CarState {
            v_ego: 10.0,
            v_cruise_cluster: 100.0,
            ..CarState::default()
        };
        h.update(&inputs(Some(car), false));
        assert_abs_diff_eq!(h.set_speed(), 62.1371, epsilon = 1e-3);
        assert_abs_diff_eq!(h.speed(), 22.3694, epsilon = 1e-3);
    }

    #[test]
    fn test_deprecated_cruise_fallback_and_na() {
        let mut h = hud();
        let car = CarState {
            v_cruise_deprecated: 80.0,
            ..CarState::default()
        };
        h.update(&inputs(Some(car), true));
        assert_eq!(h.set_speed(), 80.0);

        let na = CarState {
            v_cruise_cluster: SET_SPEED_NA,
            ..CarState::default()
        };
        h.update(&inputs(Some(na), true));
        assert!(!h.is_cruise_set());
    }

    #[test]
    fn test_cluster_speed_latches() {
        let mut h = hud();
        let first = CarState {
            v_ego: 10.0,
            v_ego_cluster: 11.0,
            ..CarState::default()
        };
        h.update(&inputs(Some(first), true));
        assert_abs_diff_eq!(h.speed(), 39.6, epsilon = 1e-3);

        // Cluster value dropping to zero is now trusted
        let later = CarState {
            v_ego: 10.0,
            v_ego_cluster: 0.0,
            ..CarState::default()
        };
        h.update(&inputs(Some(later), true));
        assert_eq!(h.speed(), 0.0);
    }

    #[test]
    fn test_car_state_lost_resets() {
        let mut h = hud();
        let car = CarState {
            v_ego: 20.0,
            v_cruise_cluster: 100.0,
            ..CarState::default()
        };
        h.update(&inputs(Some(car), true));
        h.update(&inputs(None, true));
        assert!(!h.is_cruise_set());
        assert_eq!(h.speed(), 0.0);
        assert_eq!(h.set_speed(), SET_SPEED_NA);
    }

    #[test]
    fn test_draw_texts() {
        let mut h = hud();
        let car = CarState {
            v_ego: 20.0,
            v_cruise_cluster: 100.0,
            ..CarState::default()
        };
        h.update(&inputs(Some(car), true));
        let mut sink = RecordingSink::new();
        h.draw(&mut sink, Viewport::default());

        let texts: Vec<&str> = sink.texts().map(|(t, _)| t).collect();
        assert_eq!(texts, vec!["MAX", "100", "72", "km/h"]);
        assert!(matches!(sink.commands[0], DrawCommand::RectFill { .. }));
        match &sink.commands[1] {
            DrawCommand::RoundedRect { rect, .. } => {
                assert_eq!(rect.x, 46.0);
                assert_eq!(rect.width, 200.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_no_cruise_draws_dash() {
        let h = hud();
        let mut sink = RecordingSink::new();
        h.draw(&mut sink, Viewport::default());
        let texts: Vec<&str> = sink.texts().map(|(t, _)| t).collect();
        assert_eq!(texts[1], "–");
        assert_eq!(texts[2], "0");
    }
}
