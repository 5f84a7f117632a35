//! Per-face alignment pipeline: sanitize landmarks, derive the crop
//! geometry, jitter, resample.

use image::RgbImage;
use rand::Rng;

use crate::crop::crop_geometry;
use crate::error::Result;
use crate::jitter::sample_quad;
use crate::landmarks::Landmarks;
use crate::resample::resample;

/// Knobs for a single alignment call. Defaults match the reference dataset
/// tool.
#[derive(Debug, Clone)]
pub struct AlignOptions {
    /// Edge length of the square output raster.
    pub target_size: u32,
    /// Integer oversampling factor for the projective warp.
    pub supersampling: u32,
    /// Reflect-pad and blend when the crop quad leaves the source raster.
    pub enable_padding: bool,
    /// Standard deviation of the random center jitter, as a fraction of the
    /// crop size. Zero disables jitter entirely.
    pub random_shift: f64,
    /// Reject jittered crops that fall outside the source raster, retrying
    /// up to the draw limit.
    pub retry_crops: bool,
    /// Orient the crop to the tilt of the face instead of keeping it
    /// axis-aligned.
    pub rotate_level: bool,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            target_size: 1024,
            supersampling: 4,
            enable_padding: true,
            random_shift: 0.0,
            retry_crops: false,
            rotate_level: true,
        }
    }
}

/// Why a face was skipped rather than aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Every jittered crop fell outside the source raster.
    ShiftRetriesExhausted,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShiftRetriesExhausted => {
                write!(f, "no random crop shift fit inside the source image")
            }
        }
    }
}

/// Result of one alignment call. Hard failures (bad landmark data,
/// degenerate geometry) surface as `Err` from [`align_face`] instead.
#[derive(Debug)]
pub enum AlignOutcome {
    Aligned(RgbImage),
    Skipped(SkipReason),
}

/// Align one face crop to the canonical square output.
///
/// `raw_landmarks` are the 68 estimated points, `shrink` the factor that
/// rescales them back to the source resolution. The RNG is shared across a
/// run; it is only advanced when `random_shift` is non-zero.
pub fn align_face<R: Rng + ?Sized>(
    img: RgbImage,
    raw_landmarks: &[[f64; 2]],
    shrink: f64,
    opts: &AlignOptions,
    rng: &mut R,
) -> Result<AlignOutcome> {
    let landmarks = Landmarks::sanitize(raw_landmarks, shrink)?;
    let geom = crop_geometry(&landmarks, opts.rotate_level);

    let quad = match sample_quad(
        &geom,
        opts.random_shift,
        opts.retry_crops,
        img.width(),
        img.height(),
        rng,
    ) {
        Some(quad) => quad,
        None => return Ok(AlignOutcome::Skipped(SkipReason::ShiftRetriesExhausted)),
    };

    let out = resample(
        img,
        quad,
        geom.qsize(),
        opts.target_size,
        opts.supersampling,
        opts.enable_padding,
    )?;
    Ok(AlignOutcome::Aligned(out))
}
