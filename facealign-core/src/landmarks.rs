//! Sanitization of raw 68-point facial landmarks into source pixel space.

use crate::error::{AlignError, Result};
use crate::geometry::Point;

/// Number of points in the fixed landmark scheme.
pub const LANDMARK_COUNT: usize = 68;

/// A sanitized 68-point landmark set in source-pixel coordinates.
///
/// The fixed index ranges carry semantic meaning: both eye contours are
/// ordered clockwise starting at the outer corner, the outer mouth contour
/// clockwise starting at the mouth-left corner.
#[derive(Debug, Clone)]
pub struct Landmarks {
    points: Vec<Point>,
}

impl Landmarks {
    /// Rescale raw landmark coordinates into image pixel space.
    ///
    /// `shrink` undoes any downscaling applied to the image before the
    /// landmarks were estimated; the half-pixel offset corrects for the
    /// pixel-center vs. pixel-corner convention before undoing it.
    pub fn sanitize(raw: &[[f64; 2]], shrink: f64) -> Result<Self> {
        if raw.len() != LANDMARK_COUNT {
            return Err(AlignError::LandmarkCount(raw.len()));
        }
        let points = raw
            .iter()
            .map(|&[x, y]| Point::new((x + 0.5) * shrink, (y + 0.5) * shrink))
            .collect();
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn eye_left(&self) -> &[Point] {
        &self.points[36..42]
    }

    pub fn eye_right(&self) -> &[Point] {
        &self.points[42..48]
    }

    pub fn mouth_outer(&self) -> &[Point] {
        &self.points[48..60]
    }
}

/// Arithmetic mean of a set of points.
pub(crate) fn mean(points: &[Point]) -> Point {
    let sum = points
        .iter()
        .fold(Point::new(0.0, 0.0), |acc, &p| acc + p);
    sum * (1.0 / points.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_rejects_wrong_count() {
        let raw = vec![[0.0, 0.0]; 67];
        match Landmarks::sanitize(&raw, 1.0) {
            Err(AlignError::LandmarkCount(67)) => {}
            other => panic!("expected landmark count error, got {:?}", other),
        }
    }

    #[test]
    fn sanitize_applies_half_pixel_and_shrink() {
        let mut raw = vec![[0.0, 0.0]; LANDMARK_COUNT];
        raw[0] = [9.5, 19.5];
        let lm = Landmarks::sanitize(&raw, 2.0).unwrap();
        assert_eq!(lm.points()[0], Point::new(20.0, 40.0));
        assert_eq!(lm.points()[1], Point::new(1.0, 1.0));
    }

    #[test]
    fn named_subsets_cover_expected_ranges() {
        let raw: Vec<[f64; 2]> = (0..LANDMARK_COUNT).map(|i| [i as f64, 0.0]).collect();
        let lm = Landmarks::sanitize(&raw, 1.0).unwrap();
        assert_eq!(lm.eye_left().len(), 6);
        assert_eq!(lm.eye_right().len(), 6);
        assert_eq!(lm.mouth_outer().len(), 12);
        assert_eq!(lm.eye_left()[0].x, 36.5);
        assert_eq!(lm.mouth_outer()[6].x, 54.5);
    }
}
