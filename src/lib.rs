pub mod compose;
pub mod config;
pub mod css;
pub mod frames;

// Re-export alignment types for convenience
pub use hairfit_align::{
    AlignmentEngine, AnchorMode, EngineConfig, FaceGeometry, LandmarkSet, OverlayTransform,
    Placement, Viewport,
};
