use thiserror::Error;

use crate::landmarks::FaceLandmark;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlignError {
    #[error("malformed landmark set: got {len} points, expected one of {expected:?}")]
    MalformedLandmarkSet {
        len: usize,
        expected: &'static [usize],
    },

    #[error("landmark {landmark} (index {index}) missing from a set of {len} points")]
    MissingLandmark {
        landmark: FaceLandmark,
        index: usize,
        len: usize,
    },

    #[error("landmark {landmark} (index {index}) has a non-finite coordinate")]
    NonFiniteLandmark { landmark: FaceLandmark, index: usize },

    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("overlay width fraction must be a positive number, got {0}")]
    InvalidWidthFraction(f32),

    #[error("nose drop must be a finite number, got {0}")]
    InvalidNoseDrop(f32),

    #[error("unknown anchor mode: {0}")]
    UnknownAnchorMode(String),
}

pub type Result<T> = std::result::Result<T, AlignError>;
