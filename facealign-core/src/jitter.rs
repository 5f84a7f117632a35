//! Randomized jitter of the crop center with bounded-retry rejection
//! sampling.

use log::debug;
use rand::Rng;
use rand_distr::StandardNormal;

use crate::crop::CropGeometry;
use crate::geometry::{BBox, Point, Quad};

/// Maximum number of shift draws before a face is given up on.
pub const MAX_SHIFT_DRAWS: usize = 1000;

/// Sample the final crop quad, optionally jittering its center.
///
/// With `random_shift == 0` the unjittered quad is returned and the RNG is
/// never touched, keeping the non-jitter path deterministic. Otherwise each
/// attempt draws a 2D standard-normal offset (x first, then y) scaled by
/// `qsize * random_shift`. With `retry_crops` the first quad whose integer
/// bounding box lies strictly inside the raster wins; without it the first
/// draw is accepted unconditionally. Returns `None` when all
/// [`MAX_SHIFT_DRAWS`] attempts were rejected.
pub fn sample_quad<R: Rng + ?Sized>(
    geom: &CropGeometry,
    random_shift: f64,
    retry_crops: bool,
    width: u32,
    height: u32,
    rng: &mut R,
) -> Option<Quad> {
    if random_shift == 0.0 {
        return Some(geom.quad());
    }

    let scale = geom.qsize() * random_shift;
    for attempt in 0..MAX_SHIFT_DRAWS {
        let dx: f64 = rng.sample(StandardNormal);
        let dy: f64 = rng.sample(StandardNormal);
        let center = geom.center + Point::new(dx, dy) * scale;
        let quad = geom.quad_at(center);
        if !retry_crops || BBox::of_quad(&quad).fits_within(width, height) {
            if attempt > 0 {
                debug!("accepted crop shift after {} rejected draws", attempt);
            }
            return Some(quad);
        }
    }
    None
}
