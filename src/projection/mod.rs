// src/projection/mod.rs
//
// Vehicle space → screen space.
//
//   CalibrationSample ─┐
//   CameraConfig ──────┼→ CalibrationTransform (3x3, per paint) → Projector
//   CameraSelector ────┘

pub mod calibration;
pub mod projector;
pub mod selector;

pub use calibration::CalibrationTransform;
pub use projector::{Projection, Projector};
pub use selector::CameraSelector;
