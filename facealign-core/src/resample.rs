//! Multi-stage resampling: shrink, crop, reflect-pad-and-blend, projective
//! warp, supersampled downscale.
//!
//! Raster and quad coordinates must stay consistent across stages, so they
//! are threaded through as one state value; each stage consumes the state
//! and returns the updated one.

use image::{imageops, imageops::FilterType, Rgb, RgbImage};
use imageproc::geometric_transformations::{warp_into, Interpolation, Projection};
use log::debug;
use ndarray::{Array2, Array3, Axis};

use crate::error::{AlignError, Result};
use crate::geometry::{BBox, Point, Quad};

/// Raster, crop quad, and characteristic crop size moving through the
/// stages as a unit.
struct Stage {
    img: RgbImage,
    quad: Quad,
    qsize: f64,
}

/// Turn the source raster and final crop quad into the fixed-size output
/// raster. The result is always exactly `target_size` square.
pub fn resample(
    img: RgbImage,
    quad: Quad,
    qsize: f64,
    target_size: u32,
    supersampling: u32,
    enable_padding: bool,
) -> Result<RgbImage> {
    Stage { img, quad, qsize }
        .shrink(target_size)
        .crop()
        .pad(enable_padding)
        .warp(target_size, supersampling)
}

impl Stage {
    /// Border width around the quad kept by the crop and pad stages.
    fn border(&self) -> i64 {
        (self.qsize * 0.1).round().max(3.0) as i64
    }

    /// Integer pre-shrink so the padding and blur work runs at a reduced
    /// resolution instead of the full source raster.
    fn shrink(mut self, target_size: u32) -> Self {
        let factor = (self.qsize / target_size as f64 * 0.5).floor();
        if factor > 1.0 {
            let w = ((self.img.width() as f64 / factor).round() as u32).max(1);
            let h = ((self.img.height() as f64 / factor).round() as u32).max(1);
            debug!("shrinking source by {} to {}x{}", factor, w, h);
            self.img = imageops::resize(&self.img, w, h, FilterType::Lanczos3);
            self.quad = self.quad.scaled(1.0 / factor);
            self.qsize /= factor;
        }
        self
    }

    /// Crop to the quad's bounding box plus border, clamped to the raster.
    fn crop(mut self) -> Self {
        let (w, h) = (self.img.width(), self.img.height());
        let bbox = BBox::of_quad(&self.quad).expand(self.border()).clamp(w, h);
        if bbox.width() > 0
            && bbox.height() > 0
            && (bbox.width() < w as i64 || bbox.height() < h as i64)
        {
            debug!(
                "cropping to {}x{} at ({}, {})",
                bbox.width(),
                bbox.height(),
                bbox.left,
                bbox.top
            );
            self.img = imageops::crop_imm(
                &self.img,
                bbox.left as u32,
                bbox.top as u32,
                bbox.width() as u32,
                bbox.height() as u32,
            )
            .to_image();
            self.quad = self
                .quad
                .translated(Point::new(-(bbox.left as f64), -(bbox.top as f64)));
        }
        self
    }

    /// Reflect-pad the raster so the quad plus border fits, then hide the
    /// mirror seams: blend toward a Gaussian blur near the original edge and
    /// fade the deep padding toward the per-channel median color.
    fn pad(mut self, enable_padding: bool) -> Self {
        let border = self.border();
        let (w, h) = (self.img.width() as i64, self.img.height() as i64);
        let bbox = BBox::of_quad(&self.quad);
        let mut pad = [
            (border - bbox.left).max(0),
            (border - bbox.top).max(0),
            (bbox.right - w + border).max(0),
            (bbox.bottom - h + border).max(0),
        ];
        let worst = pad.iter().copied().max().unwrap_or(0);
        if !enable_padding || worst <= border - 4 {
            return self;
        }

        let min_pad = (self.qsize * 0.3).round() as i64;
        for p in &mut pad {
            *p = (*p).max(min_pad);
        }
        let [pl, pt, pr, pb] = pad.map(|p| p as usize);
        let (sw, sh) = (w as usize, h as usize);
        let (pw, ph) = (sw + pl + pr, sh + pt + pb);
        debug!("padding by (l {}, t {}, r {}, b {}) to {}x{}", pl, pt, pr, pb, pw, ph);

        // Mirror the raster into a float working buffer (edge-exclusive
        // reflection, so the boundary sample is not doubled).
        let mut buf = Array3::<f32>::zeros((ph, pw, 3));
        for y in 0..ph {
            let sy = reflect_inner(y as i64 - pt as i64, sh as i64) as u32;
            for x in 0..pw {
                let sx = reflect_inner(x as i64 - pl as i64, sw as i64) as u32;
                let px = self.img.get_pixel(sx, sy);
                for c in 0..3 {
                    buf[[y, x, c]] = px[c] as f32;
                }
            }
        }

        // Normalized distance-to-original-edge ramps: 0 inside the original
        // content (negative deep inside), 1 at the outer padding edge.
        let mut mask = Array2::<f32>::zeros((ph, pw));
        for y in 0..ph {
            let ramp_y =
                1.0 - (y as f32 / pt as f32).min((ph - 1 - y) as f32 / pb as f32);
            for x in 0..pw {
                let ramp_x =
                    1.0 - (x as f32 / pl as f32).min((pw - 1 - x) as f32 / pr as f32);
                mask[[y, x]] = ramp_x.max(ramp_y);
            }
        }

        let blur = gaussian_blur(&buf, (self.qsize * 0.02) as f32);
        for y in 0..ph {
            for x in 0..pw {
                let weight = (mask[[y, x]] * 3.0 + 1.0).clamp(0.0, 1.0);
                for c in 0..3 {
                    let v = buf[[y, x, c]];
                    buf[[y, x, c]] = v + (blur[[y, x, c]] - v) * weight;
                }
            }
        }

        let median = channel_medians(&buf);
        for y in 0..ph {
            for x in 0..pw {
                let weight = mask[[y, x]].clamp(0.0, 1.0);
                for c in 0..3 {
                    let v = buf[[y, x, c]];
                    buf[[y, x, c]] = v + (median[c] - v) * weight;
                }
            }
        }

        let mut padded = RgbImage::new(pw as u32, ph as u32);
        for (x, y, px) in padded.enumerate_pixels_mut() {
            let at = |c: usize| {
                buf[[y as usize, x as usize, c]].round().clamp(0.0, 255.0) as u8
            };
            *px = Rgb([at(0), at(1), at(2)]);
        }
        self.img = padded;
        self.quad = self.quad.translated(Point::new(pl as f64, pt as f64));
        self
    }

    /// Map the quad corners onto a supersampled square with a perspective
    /// transform, then filter down to the target size.
    fn warp(self, target_size: u32, supersampling: u32) -> Result<RgbImage> {
        let super_size = target_size * supersampling;
        let s = super_size as f32;
        // Half-pixel offset keeps the reference's pixel-center convention.
        let from = self
            .quad
            .corners
            .map(|p| ((p.x + 0.5) as f32, (p.y + 0.5) as f32));
        let to = [(0.0, 0.0), (0.0, s), (s, s), (s, 0.0)];
        let projection =
            Projection::from_control_points(from, to).ok_or(AlignError::DegenerateQuad)?;

        let mut out = RgbImage::new(super_size, super_size);
        warp_into(
            &self.img,
            &projection,
            Interpolation::Bilinear,
            Rgb([0, 0, 0]),
            &mut out,
        );

        if supersampling > 1 {
            Ok(imageops::resize(&out, target_size, target_size, FilterType::Lanczos3))
        } else {
            Ok(out)
        }
    }
}

/// Edge-exclusive mirror indexing (numpy `pad` reflect): -1 maps to 1,
/// n maps to n-2, folding repeatedly for pads wider than the raster.
fn reflect_inner(i: i64, n: i64) -> usize {
    if n <= 1 {
        return 0;
    }
    let period = 2 * (n - 1);
    let mut j = i.rem_euclid(period);
    if j >= n {
        j = period - j;
    }
    j as usize
}

/// Edge-inclusive mirror indexing used for the blur boundary: -1 maps to 0,
/// n maps to n-1.
fn reflect_edge(i: i64, n: i64) -> usize {
    let period = 2 * n;
    let mut j = i.rem_euclid(period);
    if j >= n {
        j = period - 1 - j;
    }
    j as usize
}

/// Separable Gaussian over the spatial axes only, kernel truncated at four
/// standard deviations.
fn gaussian_blur(src: &Array3<f32>, sigma: f32) -> Array3<f32> {
    let radius = (sigma * 4.0 + 0.5) as i64;
    if sigma <= 0.0 || radius < 1 {
        return src.clone();
    }
    let mut kernel: Vec<f32> = (-radius..=radius)
        .map(|k| (-((k * k) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }

    let (h, w, channels) = src.dim();
    let mut tmp = Array3::<f32>::zeros((h, w, channels));
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sx = reflect_edge(x as i64 + ki as i64 - radius, w as i64);
                for c in 0..channels {
                    acc[c] += src[[y, sx, c]] * kw;
                }
            }
            for c in 0..channels {
                tmp[[y, x, c]] = acc[c];
            }
        }
    }
    let mut out = Array3::<f32>::zeros((h, w, channels));
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sy = reflect_edge(y as i64 + ki as i64 - radius, h as i64);
                for c in 0..channels {
                    acc[c] += tmp[[sy, x, c]] * kw;
                }
            }
            for c in 0..channels {
                out[[y, x, c]] = acc[c];
            }
        }
    }
    out
}

/// Per-channel median over all pixels, averaging the middle pair for even
/// counts.
fn channel_medians(buf: &Array3<f32>) -> [f32; 3] {
    let mut medians = [0.0f32; 3];
    for (c, median) in medians.iter_mut().enumerate() {
        let mut values: Vec<f32> = buf.index_axis(Axis(2), c).iter().copied().collect();
        values.sort_unstable_by(f32::total_cmp);
        let n = values.len();
        *median = if n % 2 == 1 {
            values[n / 2]
        } else {
            (values[n / 2 - 1] + values[n / 2]) * 0.5
        };
    }
    medians
}
