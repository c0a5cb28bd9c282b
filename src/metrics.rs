// src/metrics.rs
//
// Render pass observability. Counters for painted and skipped frames plus a
// smoothed frame-rate estimate. Export via the replay summary or logs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

/// Discrete first-order low-pass filter.
#[derive(Debug, Clone)]
pub struct FirstOrderFilter {
    x: f32,
    k: f32,
    initialized: bool,
}

impl FirstOrderFilter {
    /// `ts` is the time constant and `dt` the update period, both in seconds.
    pub fn new(x0: f32, ts: f32, dt: f32, initialized: bool) -> Self {
        let ratio = dt / ts;
        Self {
            x: x0,
            k: ratio / (1.0 + ratio),
            initialized,
        }
    }

    pub fn update(&mut self, x: f32) -> f32 {
        if self.initialized {
            self.x = (1.0 - self.k) * self.x + self.k * x;
        } else {
            self.initialized = true;
            self.x = x;
        }
        self.x
    }

    pub fn x(&self) -> f32 {
        self.x
    }
}

/// Counters are shared handles: a clone observes the same counts, so a host
/// can hand one to a status reporter on another thread while the pass keeps
/// painting. The frame-rate filter is per instance.
#[derive(Debug, Clone)]
pub struct OverlayMetrics {
    pub frames_painted: Arc<AtomicU64>,
    pub frames_skipped: Arc<AtomicU64>,
    pub polygons_drawn: Arc<AtomicU64>,
    pub lockon_markers: Arc<AtomicU64>,
    pub chevrons_drawn: Arc<AtomicU64>,
    pub camera_switches: Arc<AtomicU64>,
    fps_filter: FirstOrderFilter,
    last_timestamp_ms: Option<f64>,
    slow_fps_threshold: f32,
}

impl OverlayMetrics {
    pub fn new(ui_freq: f32, slow_fps_threshold: f32) -> Self {
        Self {
            frames_painted: Arc::new(AtomicU64::new(0)),
            frames_skipped: Arc::new(AtomicU64::new(0)),
            polygons_drawn: Arc::new(AtomicU64::new(0)),
            lockon_markers: Arc::new(AtomicU64::new(0)),
            chevrons_drawn: Arc::new(AtomicU64::new(0)),
            camera_switches: Arc::new(AtomicU64::new(0)),
            fps_filter: FirstOrderFilter::new(ui_freq, 3.0, 1.0 / ui_freq, true),
            last_timestamp_ms: None,
            slow_fps_threshold,
        }
    }

    pub fn inc(&self, counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Feed the paint timestamp; returns the filtered frame rate.
    pub fn record_frame_time(&mut self, timestamp_ms: f64) -> f32 {
        if let Some(prev) = self.last_timestamp_ms {
            let dt_ms = timestamp_ms - prev;
            if dt_ms > 0.0 {
                let fps = self.fps_filter.update((1000.0 / dt_ms) as f32);
                if fps < self.slow_fps_threshold {
                    warn!(fps, "slow frame rate");
                }
            }
        }
        self.last_timestamp_ms = Some(timestamp_ms);
        self.fps_filter.x()
    }

    pub fn fps(&self) -> f32 {
        self.fps_filter.x()
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            frames_painted: self.frames_painted.load(Ordering::Relaxed),
            frames_skipped: self.frames_skipped.load(Ordering::Relaxed),
            polygons_drawn: self.polygons_drawn.load(Ordering::Relaxed),
            lockon_markers: self.lockon_markers.load(Ordering::Relaxed),
            chevrons_drawn: self.chevrons_drawn.load(Ordering::Relaxed),
            camera_switches: self.camera_switches.load(Ordering::Relaxed),
            fps: self.fps(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub frames_painted: u64,
    pub frames_skipped: u64,
    pub polygons_drawn: u64,
    pub lockon_markers: u64,
    pub chevrons_drawn: u64,
    pub camera_switches: u64,
    pub fps: f32,
}
