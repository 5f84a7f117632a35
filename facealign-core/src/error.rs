use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlignError {
    #[error("expected 68 facial landmarks, got {0}")]
    LandmarkCount(usize),

    #[error("crop quad is degenerate; no projective transform exists")]
    DegenerateQuad,
}

pub type Result<T> = std::result::Result<T, AlignError>;
