// src/geometry/mod.rs

pub mod ribbon;

pub use ribbon::{
    build_ribbon, max_draw_distance, path_draw_distance, path_length_idx, RibbonParams,
    ScreenPolygon,
};
