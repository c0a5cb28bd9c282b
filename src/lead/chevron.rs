// src/lead/chevron.rs
//
// Radar lead chevrons: a yellow glow with a red chevron on top whose opacity
// grows as the lead gets closer or closes in. The nearest lead also gets a
// distance label and a speed label.

use serde::Serialize;

use super::lockon::chevron_box_size;
use crate::hud::MS_TO_KPH;
use crate::paint::{palette, Brush, Color, DrawSink, Font, FontWeight, Point, Rect, TextAlign};
use crate::types::{RadarLead, Viewport};

/// Beyond this distance (m) the chevron is unfilled
const LEAD_BUFF: f32 = 40.0;
/// Closing speed (m/s) that saturates the fill on its own
const SPEED_BUFF: f32 = 10.0;
const HOME_BASE_H: f32 = 12.0;

const LABEL_FONT: Font = Font::new(44, FontWeight::DemiBold);
const LABEL_W: f32 = 200.0;
const LABEL_H: f32 = 50.0;
const LABEL_DX: f32 = 2.0;
const SHADOW_OFFSET: f32 = 2.0;

/// Fill opacity on the 0..255 scale, truncated to an integer value.
pub fn fill_alpha(d_rel: f32, v_rel: f32) -> f32 {
    if d_rel >= LEAD_BUFF {
        return 0.0;
    }
    let mut alpha = 255.0 * (1.0 - d_rel / LEAD_BUFF);
    if v_rel < 0.0 {
        alpha += 255.0 * (-v_rel / SPEED_BUFF);
    }
    alpha.min(255.0).trunc()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChevronLabels {
    pub distance: String,
    pub speed: String,
    /// Top-left reference point the label boxes hang from
    pub origin: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChevronMarker {
    pub glow: [Point; 6],
    pub chevron: [Point; 6],
    pub fill_alpha: f32,
    pub labels: Option<ChevronLabels>,
}

/// Lays out the chevron for `lead` at `anchor`. `rank` 0 (the nearest lead)
/// carries labels; `v_ego` turns relative speed into absolute lead speed.
pub fn build_chevron(
    lead: &RadarLead,
    anchor: Point,
    viewport: Viewport,
    rank: usize,
    v_ego: f32,
) -> ChevronMarker {
    let sz = chevron_box_size(lead.d_rel);
    let x = anchor.x.clamp(0.0, (viewport.width - sz / 2.0).max(0.0));
    let y = anchor.y.min(viewport.height - sz * 0.6);

    let g_xo = sz / 5.0;
    let g_yo = sz / 10.0;
    let glow_dx = sz * 1.35 + g_xo;
    let glow = [
        Point::new(x + glow_dx, y + sz + g_yo + HOME_BASE_H),
        Point::new(x + glow_dx, y + sz + g_yo),
        Point::new(x, y - g_yo),
        Point::new(x - glow_dx, y + sz + g_yo),
        Point::new(x - glow_dx, y + sz + g_yo + HOME_BASE_H),
        Point::new(x, y + sz + HOME_BASE_H + g_yo + 10.0),
    ];

    let chev_dx = sz * 1.25;
    let chevron = [
        Point::new(x + chev_dx, y + sz + HOME_BASE_H),
        Point::new(x + chev_dx, y + sz),
        Point::new(x, y),
        Point::new(x - chev_dx, y + sz),
        Point::new(x - chev_dx, y + sz + HOME_BASE_H),
        Point::new(x, y + sz + HOME_BASE_H - 7.0),
    ];

    let labels = (rank == 0).then(|| ChevronLabels {
        distance: format!("{:.0}m", lead.d_rel),
        speed: format!("{:.0}k", (lead.v_rel + v_ego) * MS_TO_KPH),
        origin: Point::new(x, y),
    });

    ChevronMarker {
        glow,
        chevron,
        fill_alpha: fill_alpha(lead.d_rel, lead.v_rel),
        labels,
    }
}

/// Green/red choice for the lead speed label with a small dead band so the
/// color does not flicker around zero acceleration.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccelColorLatch {
    threshold: f32,
}

impl AccelColorLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true while the lead counts as accelerating.
    pub fn update(&mut self, accel: f32) -> bool {
        if accel >= self.threshold {
            self.threshold = -0.1;
            true
        } else {
            self.threshold = 0.0;
            false
        }
    }
}

pub fn draw_chevron(sink: &mut dyn DrawSink, marker: &ChevronMarker, accelerating: bool) {
    sink.fill_polygon(&marker.glow, &Brush::Solid(palette::GLOW_YELLOW));
    sink.fill_polygon(
        &marker.chevron,
        &Brush::Solid(palette::CHEVRON_RED.with_alpha(marker.fill_alpha / 255.0)),
    );

    let Some(labels) = &marker.labels else {
        return;
    };
    let Point { x, y } = labels.origin;
    let dist_rect = Rect::new(x + LABEL_DX, y - LABEL_H, LABEL_W, LABEL_H);
    let speed_rect = Rect::new(x - LABEL_DX - LABEL_W - 2.0, y - LABEL_H, LABEL_W, LABEL_H);
    let shadow = |r: Rect| Rect::new(r.x + SHADOW_OFFSET, r.y + SHADOW_OFFSET, r.width, r.height);

    sink.draw_text(shadow(dist_rect), TextAlign::BottomLeft, LABEL_FONT, palette::SHADOW, &labels.distance);
    sink.draw_text(shadow(speed_rect), TextAlign::BottomRight, LABEL_FONT, palette::SHADOW, &labels.speed);
    sink.draw_text(dist_rect, TextAlign::BottomLeft, LABEL_FONT, palette::WHITE, &labels.distance);

    let speed_color: Color = if accelerating {
        palette::LOCK_GREEN
    } else {
        palette::BRAKE_RED
    };
    sink.draw_text(speed_rect, TextAlign::BottomRight, LABEL_FONT, speed_color, &labels.speed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::RecordingSink;

    fn lead(d_rel: f32, v_rel: f32) -> RadarLead {
        RadarLead {
            status: true,
            d_rel,
            y_rel: 0.0,
            v_rel,
        }
    }

    #[test]
    fn test_fill_alpha_zero_beyond_buffer() {
        assert_eq!(fill_alpha(50.0, -5.0), 0.0);
        assert_eq!(fill_alpha(40.0, -5.0), 0.0);
    }

    #[test]
    fn test_fill_alpha_grows_when_close_and_closing() {
        // 255 * 0.5 + 255 * 0.5
        assert_eq!(fill_alpha(20.0, -5.0), 255.0);
        assert_eq!(fill_alpha(20.0, 0.0), 127.0);
        // Opening speed does not reduce the fill
        assert_eq!(fill_alpha(20.0, 3.0), 127.0);
        assert_eq!(fill_alpha(0.0, -20.0), 255.0);
    }

    #[test]
    fn test_labels_only_for_nearest() {
        let vp = Viewport::new(2160.0, 1080.0);
        let first = build_chevron(&lead(20.0, -5.0), Point::new(1000.0, 600.0), vp, 0, 25.0);
        let labels = first.labels.unwrap();
        assert_eq!(labels.distance, "20m");
        assert_eq!(labels.speed, "72k");
        assert!(build_chevron(&lead(30.0, 0.0), Point::new(900.0, 600.0), vp, 1, 25.0)
            .labels
            .is_none());
    }

    #[test]
    fn test_chevron_stays_above_screen_bottom() {
        let vp = Viewport::new(2160.0, 1080.0);
        let m = build_chevron(&lead(5.0, 0.0), Point::new(-40.0, 5000.0), vp, 1, 0.0);
        let sz = chevron_box_size(5.0);
        assert_eq!(m.chevron[2], Point::new(0.0, 1080.0 - sz * 0.6));
    }

    #[test]
    fn test_accel_latch_dead_band() {
        let mut latch = AccelColorLatch::new();
        assert!(latch.update(0.0));
        // Small deceleration stays green once accelerating
        assert!(latch.update(-0.05));
        assert!(!latch.update(-0.2));
        // Needs to climb back to zero to flip green again
        assert!(!latch.update(-0.05));
        assert!(latch.update(0.0));
    }

    #[test]
    fn test_draw_emits_glow_chevron_and_labels() {
        let vp = Viewport::new(2160.0, 1080.0);
        let m = build_chevron(&lead(20.0, -5.0), Point::new(1000.0, 600.0), vp, 0, 25.0);
        let mut sink = RecordingSink::new();
        draw_chevron(&mut sink, &m, false);
        let polys: Vec<_> = sink.polygons().collect();
        assert_eq!(polys.len(), 2);
        assert_eq!(polys[1].1.max_alpha(), 1.0);
        let texts: Vec<_> = sink.texts().collect();
        assert_eq!(texts.len(), 4);
        assert_eq!(texts[2].0, "20m");
        assert_eq!(texts[3].1, palette::BRAKE_RED);
    }
}
