use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AlignError;
use crate::geometry::{EyeLine, FacePoints, Point};

/// Which facial point the overlay is centered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnchorMode {
    /// Estimated from the eye line; no mesh point is read directly.
    #[default]
    Nose,
    Forehead,
    #[serde(alias = "eyes-mid", alias = "eyes_mid")]
    EyesMidpoint,
    LeftEye,
    RightEye,
    Mouth,
    LeftEar,
    RightEar,
}

impl AnchorMode {
    pub const ALL: [AnchorMode; 8] = [
        AnchorMode::Nose,
        AnchorMode::Forehead,
        AnchorMode::EyesMidpoint,
        AnchorMode::LeftEye,
        AnchorMode::RightEye,
        AnchorMode::Mouth,
        AnchorMode::LeftEar,
        AnchorMode::RightEar,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnchorMode::Nose => "nose",
            AnchorMode::Forehead => "forehead",
            AnchorMode::EyesMidpoint => "eyes-midpoint",
            AnchorMode::LeftEye => "left-eye",
            AnchorMode::RightEye => "right-eye",
            AnchorMode::Mouth => "mouth",
            AnchorMode::LeftEar => "left-ear",
            AnchorMode::RightEar => "right-ear",
        }
    }

    /// Overlay center in pixels.
    ///
    /// `nose_drop` is the nose offset from the eyes midpoint along the face's
    /// down direction, as a fraction of the inter-ocular distance. Keeping the
    /// offset in the eye-line frame makes the estimate rotate with the head.
    pub fn resolve(&self, face: &FacePoints, eyes: &EyeLine, nose_drop: f32) -> Point {
        match self {
            AnchorMode::Nose => eyes.midpoint() + eyes.down() * (eyes.face_width * nose_drop),
            AnchorMode::Forehead => face.forehead,
            AnchorMode::EyesMidpoint => eyes.midpoint(),
            AnchorMode::LeftEye => eyes.left,
            AnchorMode::RightEye => eyes.right,
            AnchorMode::Mouth => face.mouth_center(),
            AnchorMode::LeftEar => face.left_face_edge,
            AnchorMode::RightEar => face.right_face_edge,
        }
    }
}

impl fmt::Display for AnchorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnchorMode {
    type Err = AlignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "nose" => Ok(AnchorMode::Nose),
            "forehead" => Ok(AnchorMode::Forehead),
            "eyes-midpoint" | "eyes-mid" => Ok(AnchorMode::EyesMidpoint),
            "left-eye" => Ok(AnchorMode::LeftEye),
            "right-eye" => Ok(AnchorMode::RightEye),
            "mouth" => Ok(AnchorMode::Mouth),
            "left-ear" => Ok(AnchorMode::LeftEar),
            "right-ear" => Ok(AnchorMode::RightEar),
            _ => Err(AlignError::UnknownAnchorMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face() -> FacePoints {
        FacePoints {
            forehead: Point::new(320.0, 96.0),
            left_eye_outer: Point::new(224.0, 192.0),
            left_eye_inner: Point::new(288.0, 192.0),
            right_eye_outer: Point::new(416.0, 192.0),
            right_eye_inner: Point::new(352.0, 192.0),
            mouth_left: Point::new(280.0, 330.0),
            mouth_right: Point::new(360.0, 330.0),
            mouth_top: Point::new(320.0, 320.0),
            mouth_bottom: Point::new(320.0, 340.0),
            left_face_edge: Point::new(180.0, 220.0),
            right_face_edge: Point::new(460.0, 220.0),
        }
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for mode in AnchorMode::ALL {
            assert_eq!(mode.name().parse::<AnchorMode>().unwrap(), mode);
        }
    }

    #[test]
    fn from_str_accepts_aliases() {
        assert_eq!("eyes_mid".parse::<AnchorMode>().unwrap(), AnchorMode::EyesMidpoint);
        assert_eq!(" Left_Ear ".parse::<AnchorMode>().unwrap(), AnchorMode::LeftEar);
        assert!(matches!(
            "chin".parse::<AnchorMode>(),
            Err(AlignError::UnknownAnchorMode(s)) if s == "chin"
        ));
    }

    #[test]
    fn default_is_nose() {
        assert_eq!(AnchorMode::default(), AnchorMode::Nose);
    }

    #[test]
    fn direct_lookups() {
        let face = face();
        let eyes = EyeLine::from_face(&face);
        assert_eq!(AnchorMode::Forehead.resolve(&face, &eyes, 0.4), face.forehead);
        assert_eq!(AnchorMode::LeftEye.resolve(&face, &eyes, 0.4), Point::new(256.0, 192.0));
        assert_eq!(AnchorMode::RightEye.resolve(&face, &eyes, 0.4), Point::new(384.0, 192.0));
        assert_eq!(AnchorMode::EyesMidpoint.resolve(&face, &eyes, 0.4), Point::new(320.0, 192.0));
        assert_eq!(AnchorMode::Mouth.resolve(&face, &eyes, 0.4), Point::new(320.0, 330.0));
        assert_eq!(AnchorMode::LeftEar.resolve(&face, &eyes, 0.4), face.left_face_edge);
        assert_eq!(AnchorMode::RightEar.resolve(&face, &eyes, 0.4), face.right_face_edge);
    }

    #[test]
    fn nose_moves_along_down_vector() {
        let face = face();
        let eyes = EyeLine::from_face(&face);
        // level face: down = (0, -1), face width 128
        let nose = AnchorMode::Nose.resolve(&face, &eyes, 0.4);
        assert!((nose.x - 320.0).abs() < 1e-3);
        assert!((nose.y - (192.0 - 0.4 * 128.0)).abs() < 1e-3);
    }

    #[test]
    fn zero_nose_drop_sits_on_eyes_midpoint() {
        let face = face();
        let eyes = EyeLine::from_face(&face);
        assert_eq!(AnchorMode::Nose.resolve(&face, &eyes, 0.0), eyes.midpoint());
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&AnchorMode::EyesMidpoint).unwrap();
        assert_eq!(json, "\"eyes-midpoint\"");
        let parsed: AnchorMode = serde_json::from_str("\"eyes-mid\"").unwrap();
        assert_eq!(parsed, AnchorMode::EyesMidpoint);
    }
}
