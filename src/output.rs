//! Persistence of aligned face images under deterministic filenames.

use anyhow::{Context, Result};
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Deterministic output filename for a face: `{obj_id}-{face_idx:02}.png`.
pub fn face_filename(obj_id: &str, face_idx: u32) -> String {
    format!("{}-{:02}.png", obj_id, face_idx)
}

/// Write the aligned raster as a PNG inside `output_dir` and return the
/// path it was written to.
pub fn save_face(
    output_dir: &Path,
    obj_id: &str,
    face_idx: u32,
    img: &RgbImage,
) -> Result<PathBuf> {
    let path = output_dir.join(face_filename(obj_id, face_idx));
    img.save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
