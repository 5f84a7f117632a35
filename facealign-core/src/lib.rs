//! Core face-alignment pipeline: landmark sanitization, oriented crop
//! geometry, randomized crop jitter, and the multi-stage resampler that
//! turns a source photograph into a canonical square face image.

pub mod crop;
pub mod error;
pub mod geometry;
pub mod jitter;
pub mod landmarks;
pub mod pipeline;
pub mod resample;

// Re-export the per-face entry point and its companions.
pub use error::{AlignError, Result};
pub use landmarks::{Landmarks, LANDMARK_COUNT};
pub use pipeline::{align_face, AlignOptions, AlignOutcome, SkipReason};
