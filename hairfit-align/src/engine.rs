use serde::Serialize;

use crate::anchor::AnchorMode;
use crate::error::{AlignError, Result};
use crate::geometry::{EyeLine, FacePoints, Point, Viewport};
use crate::landmarks::{LandmarkScheme, LandmarkSet, FACE_MESH};

/// Default nose offset below the eyes midpoint, in inter-ocular distances.
pub const DEFAULT_NOSE_DROP: f32 = 0.40;

/// Default overlay width as a fraction of the viewport width.
pub const DEFAULT_WIDTH_FRACTION: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub anchor: AnchorMode,
    /// Overlay width relative to the viewport width. Deliberately independent
    /// of the measured face width.
    pub overlay_width_fraction: f32,
    pub nose_drop: f32,
    pub scheme: LandmarkScheme,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            anchor: AnchorMode::default(),
            overlay_width_fraction: DEFAULT_WIDTH_FRACTION,
            nose_drop: DEFAULT_NOSE_DROP,
            scheme: FACE_MESH,
        }
    }
}

/// Where to draw the overlay this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub center_x: f32,
    pub center_y: f32,
    pub width_px: f32,
    pub rotation_degrees: f32,
}

impl Placement {
    pub fn center(&self) -> Point {
        Point::new(self.center_x, self.center_y)
    }
}

/// Per-frame engine output. A hidden transform carries no placement at all, so
/// a consumer cannot read stale geometry from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayTransform {
    present: bool,
    #[serde(flatten)]
    placement: Option<Placement>,
}

impl OverlayTransform {
    pub const fn hidden() -> Self {
        Self {
            present: false,
            placement: None,
        }
    }

    pub const fn shown(placement: Placement) -> Self {
        Self {
            present: true,
            placement: Some(placement),
        }
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn placement(&self) -> Option<&Placement> {
        self.placement.as_ref()
    }
}

/// Intermediate geometry of one face, used for debug markers and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceGeometry {
    pub anchor_mode: AnchorMode,
    pub left_eye: Point,
    pub right_eye: Point,
    pub eyes_midpoint: Point,
    pub roll_degrees: f32,
    pub face_width: f32,
    pub anchor: Point,
}

/// Stateless landmark-to-overlay mapper. Holds configuration only; every call
/// depends solely on its arguments.
#[derive(Debug, Clone, Default)]
pub struct AlignmentEngine {
    config: EngineConfig,
}

impl AlignmentEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let fraction = config.overlay_width_fraction;
        if !(fraction.is_finite() && fraction > 0.0) {
            return Err(AlignError::InvalidWidthFraction(fraction));
        }
        if !config.nose_drop.is_finite() {
            return Err(AlignError::InvalidNoseDrop(config.nose_drop));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute this frame's transform.
    ///
    /// `None` means the detector found no face and yields the hidden
    /// transform. A set that does not match the landmark scheme is rejected so
    /// the caller can skip the frame.
    pub fn align(
        &self,
        landmarks: Option<&LandmarkSet>,
        viewport: Viewport,
    ) -> Result<OverlayTransform> {
        let Some(set) = landmarks else {
            return Ok(OverlayTransform::hidden());
        };

        let geometry = self.measure(set, viewport)?;
        let placement = Placement {
            center_x: geometry.anchor.x,
            center_y: geometry.anchor.y,
            width_px: viewport.width * self.config.overlay_width_fraction,
            rotation_degrees: geometry.roll_degrees,
        };
        log::debug!(
            "overlay at ({:.1}, {:.1}) width {:.1} roll {:.2}deg",
            placement.center_x,
            placement.center_y,
            placement.width_px,
            placement.rotation_degrees
        );

        Ok(OverlayTransform::shown(placement))
    }

    /// Geometry behind [`align`](Self::align) for the configured anchor.
    pub fn measure(&self, set: &LandmarkSet, viewport: Viewport) -> Result<FaceGeometry> {
        self.measure_with(set, viewport, self.config.anchor)
    }

    /// Geometry for an explicit anchor mode, ignoring the configured one.
    pub fn measure_with(
        &self,
        set: &LandmarkSet,
        viewport: Viewport,
        mode: AnchorMode,
    ) -> Result<FaceGeometry> {
        viewport.validate()?;
        self.config.scheme.validate(set)?;

        let face = FacePoints::map(set, &self.config.scheme, &viewport)?;
        let eyes = EyeLine::from_face(&face);
        let anchor = mode.resolve(&face, &eyes, self.config.nose_drop);

        Ok(FaceGeometry {
            anchor_mode: mode,
            left_eye: eyes.left,
            right_eye: eyes.right,
            eyes_midpoint: eyes.midpoint(),
            roll_degrees: eyes.roll_degrees(),
            face_width: eyes.face_width,
            anchor,
        })
    }
}
