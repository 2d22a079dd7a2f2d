// src/math/error.rs
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient points for operation: expected at least {expected}, got {actual}")]
    InsufficientPoints { expected: usize, actual: usize },

    #[error("Triangulation failed: {reason}")]
    TriangulationFailed { reason: String },

    #[error("Invalid mesh: {reason}")]
    InvalidMesh { reason: String },
}

pub type MathResult<T> = Result<T, MathError>;
