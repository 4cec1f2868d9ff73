//! Landmark sets and the index table that ties semantic face points to a
//! detector's landmark scheme.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AlignError, Result};

/// A detector landmark in normalized frame coordinates.
///
/// `x` and `y` are nominally in `[0, 1]` but partially occluded faces can push
/// them outside; such values are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Every landmark of one detected face, in detector order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    /// Create a set of `len` copies of `fill`.
    pub fn filled(len: usize, fill: Landmark) -> Self {
        Self {
            points: vec![fill; len],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Landmark> {
        self.points.get(idx)
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// Apply `f` to every point, e.g. to rotate or shift the whole face.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(Landmark) -> Landmark,
    {
        Self {
            points: self.points.iter().copied().map(f).collect(),
        }
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        Self::new(points)
    }
}

impl std::ops::Index<usize> for LandmarkSet {
    type Output = Landmark;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.points[idx]
    }
}

impl std::ops::IndexMut<usize> for LandmarkSet {
    fn index_mut(&mut self, idx: usize) -> &mut Self::Output {
        &mut self.points[idx]
    }
}

/// The face points the alignment math reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaceLandmark {
    Forehead,
    LeftEyeOuter,
    LeftEyeInner,
    RightEyeOuter,
    RightEyeInner,
    MouthLeft,
    MouthRight,
    MouthTop,
    MouthBottom,
    LeftFaceEdge,
    RightFaceEdge,
}

impl FaceLandmark {
    pub const ALL: [FaceLandmark; 11] = [
        FaceLandmark::Forehead,
        FaceLandmark::LeftEyeOuter,
        FaceLandmark::LeftEyeInner,
        FaceLandmark::RightEyeOuter,
        FaceLandmark::RightEyeInner,
        FaceLandmark::MouthLeft,
        FaceLandmark::MouthRight,
        FaceLandmark::MouthTop,
        FaceLandmark::MouthBottom,
        FaceLandmark::LeftFaceEdge,
        FaceLandmark::RightFaceEdge,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FaceLandmark::Forehead => "forehead",
            FaceLandmark::LeftEyeOuter => "left-eye-outer",
            FaceLandmark::LeftEyeInner => "left-eye-inner",
            FaceLandmark::RightEyeOuter => "right-eye-outer",
            FaceLandmark::RightEyeInner => "right-eye-inner",
            FaceLandmark::MouthLeft => "mouth-left",
            FaceLandmark::MouthRight => "mouth-right",
            FaceLandmark::MouthTop => "mouth-top",
            FaceLandmark::MouthBottom => "mouth-bottom",
            FaceLandmark::LeftFaceEdge => "left-face-edge",
            FaceLandmark::RightFaceEdge => "right-face-edge",
        }
    }
}

impl fmt::Display for FaceLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index table mapping each [`FaceLandmark`] to a position in a detector's
/// landmark set. Retargeting to another detector means swapping this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandmarkScheme {
    pub forehead: usize,
    pub left_eye_outer: usize,
    pub left_eye_inner: usize,
    pub right_eye_outer: usize,
    pub right_eye_inner: usize,
    pub mouth_left: usize,
    pub mouth_right: usize,
    pub mouth_top: usize,
    pub mouth_bottom: usize,
    pub left_face_edge: usize,
    pub right_face_edge: usize,
    /// Set lengths the detector may emit.
    pub lengths: &'static [usize],
}

/// MediaPipe face mesh: 468 points, or 478 with refined iris landmarks
/// appended after the base mesh.
pub const FACE_MESH: LandmarkScheme = LandmarkScheme {
    forehead: 10,
    left_eye_outer: 33,
    left_eye_inner: 133,
    right_eye_outer: 263,
    right_eye_inner: 362,
    mouth_left: 61,
    mouth_right: 291,
    mouth_top: 13,
    mouth_bottom: 14,
    left_face_edge: 234,
    right_face_edge: 454,
    lengths: &[468, 478],
};

impl Default for LandmarkScheme {
    fn default() -> Self {
        FACE_MESH
    }
}

impl LandmarkScheme {
    pub fn index(&self, landmark: FaceLandmark) -> usize {
        match landmark {
            FaceLandmark::Forehead => self.forehead,
            FaceLandmark::LeftEyeOuter => self.left_eye_outer,
            FaceLandmark::LeftEyeInner => self.left_eye_inner,
            FaceLandmark::RightEyeOuter => self.right_eye_outer,
            FaceLandmark::RightEyeInner => self.right_eye_inner,
            FaceLandmark::MouthLeft => self.mouth_left,
            FaceLandmark::MouthRight => self.mouth_right,
            FaceLandmark::MouthTop => self.mouth_top,
            FaceLandmark::MouthBottom => self.mouth_bottom,
            FaceLandmark::LeftFaceEdge => self.left_face_edge,
            FaceLandmark::RightFaceEdge => self.right_face_edge,
        }
    }

    /// Length of the smallest set this scheme accepts.
    pub fn base_len(&self) -> usize {
        self.lengths.iter().copied().min().unwrap_or(0)
    }

    /// Reject sets the alignment math cannot run on: wrong length, a required
    /// index out of bounds, or a required point with NaN/inf coordinates.
    pub fn validate(&self, set: &LandmarkSet) -> Result<()> {
        let len = set.len();
        if !self.lengths.contains(&len) {
            return Err(AlignError::MalformedLandmarkSet {
                len,
                expected: self.lengths,
            });
        }

        for landmark in FaceLandmark::ALL {
            let index = self.index(landmark);
            let point = set.get(index).ok_or(AlignError::MissingLandmark {
                landmark,
                index,
                len,
            })?;
            if !point.is_finite() {
                return Err(AlignError::NonFiniteLandmark { landmark, index });
            }
        }

        Ok(())
    }

    /// Fetch a required landmark, or `None` when the set is too short for it.
    pub fn lookup(&self, set: &LandmarkSet, landmark: FaceLandmark) -> Option<Landmark> {
        set.get(self.index(landmark)).copied()
    }
}
