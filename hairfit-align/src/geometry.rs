use serde::{Deserialize, Serialize};

use crate::error::{AlignError, Result};
use crate::landmarks::{FaceLandmark, Landmark, LandmarkScheme, LandmarkSet};

/// A point in viewport pixel space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn distance(&self, other: &Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rotate this point by `radians` about `pivot`.
    pub fn rotate_about(&self, pivot: &Point, radians: f32) -> Point {
        let (sin, cos) = radians.sin_cos();
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        Point::new(
            pivot.x + dx * cos - dy * sin,
            pivot.y + dx * sin + dy * cos,
        )
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Neg for Point {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Point::new(-self.x, -self.y)
    }
}

/// Size of the rendering surface for the current frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn validate(&self) -> Result<()> {
        let ok = |v: f32| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(AlignError::InvalidViewport {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Scale a normalized landmark into this viewport. Out-of-range input maps
    /// outside the viewport unchanged.
    pub fn to_pixel(&self, landmark: &Landmark) -> Point {
        Point::new(landmark.x * self.width, landmark.y * self.height)
    }
}

/// The required landmarks of one face, mapped to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacePoints {
    pub forehead: Point,
    pub left_eye_outer: Point,
    pub left_eye_inner: Point,
    pub right_eye_outer: Point,
    pub right_eye_inner: Point,
    pub mouth_left: Point,
    pub mouth_right: Point,
    pub mouth_top: Point,
    pub mouth_bottom: Point,
    pub left_face_edge: Point,
    pub right_face_edge: Point,
}

impl FacePoints {
    /// Map the scheme's required landmarks into `viewport`. A set too short
    /// for any of them is reported as [`AlignError::MissingLandmark`].
    pub fn map(set: &LandmarkSet, scheme: &LandmarkScheme, viewport: &Viewport) -> Result<Self> {
        let px = |landmark: FaceLandmark| -> Result<Point> {
            let lm = scheme
                .lookup(set, landmark)
                .ok_or(AlignError::MissingLandmark {
                    landmark,
                    index: scheme.index(landmark),
                    len: set.len(),
                })?;
            Ok(viewport.to_pixel(&lm))
        };
        Ok(Self {
            forehead: px(FaceLandmark::Forehead)?,
            left_eye_outer: px(FaceLandmark::LeftEyeOuter)?,
            left_eye_inner: px(FaceLandmark::LeftEyeInner)?,
            right_eye_outer: px(FaceLandmark::RightEyeOuter)?,
            right_eye_inner: px(FaceLandmark::RightEyeInner)?,
            mouth_left: px(FaceLandmark::MouthLeft)?,
            mouth_right: px(FaceLandmark::MouthRight)?,
            mouth_top: px(FaceLandmark::MouthTop)?,
            mouth_bottom: px(FaceLandmark::MouthBottom)?,
            left_face_edge: px(FaceLandmark::LeftFaceEdge)?,
            right_face_edge: px(FaceLandmark::RightFaceEdge)?,
        })
    }

    pub fn left_eye_center(&self) -> Point {
        self.left_eye_outer.midpoint(&self.left_eye_inner)
    }

    pub fn right_eye_center(&self) -> Point {
        self.right_eye_outer.midpoint(&self.right_eye_inner)
    }

    /// Horizontal middle of the mouth corners, vertical middle of the inner lips.
    pub fn mouth_center(&self) -> Point {
        Point::new(
            (self.mouth_left.x + self.mouth_right.x) / 2.0,
            (self.mouth_top.y + self.mouth_bottom.y) / 2.0,
        )
    }
}

/// Head roll and inter-ocular distance derived from the two eye centers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeLine {
    pub left: Point,
    pub right: Point,
    /// Signed roll in radians; 0 for level eyes, positive when the right eye
    /// sits lower on screen.
    pub roll: f32,
    /// Inter-ocular pixel distance.
    pub face_width: f32,
}

impl EyeLine {
    pub fn new(left: Point, right: Point) -> Self {
        let dx = right.x - left.x;
        let dy = right.y - left.y;
        // atan2(0, 0) is 0 here, but -0.0 inputs would give ±π
        let roll = if dx == 0.0 && dy == 0.0 {
            log::debug!("coincident eye centers at ({}, {}), using zero roll", left.x, left.y);
            0.0
        } else {
            dy.atan2(dx)
        };
        Self {
            left,
            right,
            roll,
            face_width: dx.hypot(dy),
        }
    }

    pub fn from_face(face: &FacePoints) -> Self {
        Self::new(face.left_eye_center(), face.right_eye_center())
    }

    pub fn roll_degrees(&self) -> f32 {
        self.roll.to_degrees()
    }

    pub fn midpoint(&self) -> Point {
        self.left.midpoint(&self.right)
    }

    /// Unit vector perpendicular to the eye line: `(-sin roll, cos roll)`.
    pub fn up(&self) -> Point {
        let (sin, cos) = self.roll.sin_cos();
        Point::new(-sin, cos)
    }

    pub fn down(&self) -> Point {
        -self.up()
    }
}
