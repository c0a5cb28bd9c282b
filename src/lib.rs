// src/lib.rs
//
// Onroad driving overlay: projects the driving model's path, lanes and lead
// vehicles into the camera view and draws them, together with the speed HUD,
// through a toolkit-independent `DrawSink`.

pub mod config;
pub mod geometry;
pub mod hud;
pub mod lead;
pub mod metrics;
pub mod paint;
pub mod path_style;
pub mod projection;
pub mod render;
pub mod replay;
pub mod types;

pub use paint::{DrawCommand, DrawSink, RecordingSink};
pub use render::{FrameOutcome, FrameStats, PassState, RenderPass, SkipReason};
pub use replay::{replay, FrameRecord, Scenario};
pub use types::{Config, FrameInputs};
