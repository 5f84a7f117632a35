pub mod metadata;
pub mod output;

// Re-export core types for convenience
pub use facealign_core::{align_face, AlignError, AlignOptions, AlignOutcome, SkipReason};
