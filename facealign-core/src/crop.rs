//! Derivation of the oriented crop rectangle from landmark anchor points.

use crate::geometry::{Point, Quad};
use crate::landmarks::{mean, Landmarks};

/// Crop basis derived from the eye/mouth anchors: a center and two
/// perpendicular half-extent vectors.
#[derive(Debug, Clone, Copy)]
pub struct CropGeometry {
    pub center: Point,
    pub x: Point,
    pub y: Point,
}

impl CropGeometry {
    /// The unjittered crop quad.
    pub fn quad(&self) -> Quad {
        self.quad_at(self.center)
    }

    /// The crop quad rebuilt around an alternative center.
    pub fn quad_at(&self, c: Point) -> Quad {
        Quad::new([
            c - self.x - self.y,
            c - self.x + self.y,
            c + self.x + self.y,
            c + self.x - self.y,
        ])
    }

    /// Characteristic crop size used by the resampling stages.
    pub fn qsize(&self) -> f64 {
        self.x.hypot() * 2.0
    }
}

/// Choose the crop rectangle for a face.
///
/// With `rotate_level` the rectangle follows the tilt of the face in the
/// source image; without it the rectangle stays axis-aligned regardless of
/// tilt. The crop size is governed by whichever is larger of the eye
/// separation and the eye-to-mouth distance, and the center is biased
/// slightly toward the mouth.
pub fn crop_geometry(landmarks: &Landmarks, rotate_level: bool) -> CropGeometry {
    let eye_left = mean(landmarks.eye_left());
    let eye_right = mean(landmarks.eye_right());
    let eye_avg = (eye_left + eye_right) * 0.5;
    let eye_to_eye = eye_right - eye_left;
    let mouth_left = landmarks.mouth_outer()[0];
    let mouth_right = landmarks.mouth_outer()[6];
    let mouth_avg = (mouth_left + mouth_right) * 0.5;
    let eye_to_mouth = mouth_avg - eye_avg;

    let scale = (eye_to_eye.hypot() * 2.0).max(eye_to_mouth.hypot() * 1.8);
    let x = if rotate_level {
        let v = eye_to_eye - eye_to_mouth.rot90();
        v * (scale / v.hypot())
    } else {
        Point::new(scale, 0.0)
    };
    let y = x.rot90();
    let center = eye_avg + eye_to_mouth * 0.1;

    CropGeometry { center, x, y }
}
