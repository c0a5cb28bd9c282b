// src/config.rs

use crate::types::{CameraConfig, Config, HudConfig, LoggingConfig, OverlayConfig};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::warn;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to built-in defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            overlay: OverlayConfig::default(),
            hud: HudConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            narrow_focal: 2648.0,
            wide_focal: 567.0,
            center_x: 1928.0 / 2.0,
            center_y: 1208.0 / 2.0,
            narrow_zoom: 1.1,
            wide_zoom: 2.0,
            wide_enter_speed: 10.0,
            wide_exit_speed: 15.0,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            clip_margin: 500.0,
            min_draw_distance: 10.0,
            max_draw_distance: 100.0,
            marker_scale: 1.0,
            lead_prob_threshold: 0.2,
            ui_freq: 20.0,
            slow_fps_threshold: 15.0,
        }
    }
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            header_height: 300.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
