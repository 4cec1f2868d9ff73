//! Per-frame overlay alignment from face-mesh landmarks.
//!
//! The engine turns one frame's landmark set and the current viewport into an
//! [`OverlayTransform`]: the pixel center, width and roll a renderer needs to
//! pin a 2D overlay onto the detected face. Every frame is computed on its own;
//! nothing carries over between calls.

pub mod anchor;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod landmarks;

// Re-export commonly used types
pub use anchor::AnchorMode;
pub use engine::{AlignmentEngine, EngineConfig, FaceGeometry, OverlayTransform, Placement};
pub use error::{AlignError, Result};
pub use geometry::{EyeLine, FacePoints, Point, Viewport};
pub use landmarks::{FaceLandmark, Landmark, LandmarkScheme, LandmarkSet, FACE_MESH};
