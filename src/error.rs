//! Crate-wide error type.

use thiserror::Error;

use crate::layers::{LayerKind, LayerPath};

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NnError>;

#[derive(Error, Debug)]
pub enum NnError {
    /// Two operands of a matrix operation had incompatible shapes.
    #[error("shape mismatch in {op}: {left:?} vs {right:?}")]
    ShapeMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// Row vectors of differing lengths were passed to `Matrix::from_data`.
    #[error("ragged matrix data: row {row} has {found} columns, expected {expected}")]
    RaggedData {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("optimizer has no target; call prepare() before optimize()")]
    NotPrepared,

    #[error("input batch has no samples")]
    EmptyBatch,

    /// The training traversal met a layer it has no rule for.
    #[error("layer {kind} at {path} cannot appear in a training sequence")]
    UnexpectedLayer { path: LayerPath, kind: LayerKind },

    #[error("no velocity allocated for layer at {0}")]
    MissingVelocity(LayerPath),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
