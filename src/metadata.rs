//! Face-record metadata as consumed from the dataset JSON file.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// One face to align: landmark data plus where to find the source image
/// and how to name the output.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceRecord {
    pub face_spec: FaceSpec,
    /// Path of the source photograph, relative to the source-image root.
    pub source_path: String,
    pub obj_id: String,
    pub face_idx: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaceSpec {
    /// Raw 68-point landmarks as estimated on the (possibly downscaled)
    /// source image.
    pub landmarks: Vec<[f64; 2]>,
    /// Factor that rescales the landmarks back to source resolution.
    pub shrink: f64,
}

/// Read the full record list. Consumed once per run, in order.
pub fn load_faces(path: &Path) -> Result<Vec<FaceRecord>> {
    let file = File::open(path)
        .with_context(|| format!("opening metadata file {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing metadata file {}", path.display()))
}
