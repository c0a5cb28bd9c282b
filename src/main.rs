// src/main.rs

use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use onroad_overlay::{replay, Config, FrameOutcome, RenderPass, Scenario};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "config.yaml";
const SYNTHETIC_FRAMES: usize = 200;

/// Replay recorded or synthetic onroad frames through the overlay renderer.
#[derive(Parser, Debug)]
#[command(name = "onroad-overlay", version, about, long_about = None)]
struct Args {
    /// Scenario JSON file (synthetic approach when omitted)
    scenario: Option<PathBuf>,

    /// Write every frame's draw commands as JSON lines to this file
    #[arg(long)]
    dump: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Peek at the configured level so the subscriber is up before the real
    // load reports anything.
    let level = Config::load(CONFIG_PATH)
        .map(|c| c.logging.level)
        .unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("onroad_overlay={}", level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("🚗 Onroad overlay replay starting");

    let config = Config::load_or_default(CONFIG_PATH)?;
    info!("✓ Configuration loaded");
    info!(
        "Camera: narrow f={:.0} zoom={:.1}, wide f={:.0} zoom={:.1}, wide below {:.0} m/s",
        config.camera.narrow_focal,
        config.camera.narrow_zoom,
        config.camera.wide_focal,
        config.camera.wide_zoom,
        config.camera.wide_enter_speed
    );

    let scenario = match &args.scenario {
        Some(path) => {
            let scenario = Scenario::load(path)?;
            info!("✓ Scenario loaded from {}", path.display());
            scenario
        }
        None => {
            info!("No scenario given, using synthetic approach ({} frames)", SYNTHETIC_FRAMES);
            Scenario::synthetic_approach(SYNTHETIC_FRAMES)
        }
    };
    if scenario.frames.is_empty() {
        warn!("Scenario '{}' has no frames", scenario.name);
        return Ok(());
    }

    let mut pass = RenderPass::new(config);
    let records = replay(&mut pass, &scenario);

    let drawn = records
        .iter()
        .filter(|r| matches!(r.outcome, FrameOutcome::Drawn(_)))
        .count();
    let commands: usize = records.iter().map(|r| r.commands.len()).sum();

    if let Some(path) = &args.dump {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating dump {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        for record in &records {
            writeln!(writer, "{}", serde_json::to_string(record)?)?;
        }
        writer.flush()?;
        info!("💾 Draw commands written to: {}", path.display());
    }

    let summary = pass.metrics().summary();
    info!("\n✓ Replay finished!");
    info!("  Frames: {} ({} drawn, {} skipped)", records.len(), drawn, summary.frames_skipped);
    info!("  Draw commands: {}", commands);
    info!("  Polygons: {}", summary.polygons_drawn);
    info!("  Lock-on markers: {}", summary.lockon_markers);
    info!("  Chevrons: {}", summary.chevrons_drawn);
    info!("  Camera switches: {}", summary.camera_switches);
    info!("  Frame rate: {:.1} FPS", summary.fps);
    info!("  Summary: {}", serde_json::to_string(&summary)?);

    Ok(())
}
