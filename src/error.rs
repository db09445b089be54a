//! Error types for the classifier and the archive loader.

#[cfg(feature = "npz")]
use std::path::PathBuf;
use thiserror::Error;

/// Raised when a batch cannot be flattened to the classifier's input width.
///
/// This is fatal for the forward pass: no layer runs and no partial output
/// is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShapeError {
    #[error(
        "input must flatten to {expected} elements per sample, got {found} (input dims {dims:?})"
    )]
    Mismatch {
        expected: usize,
        found: usize,
        dims: Vec<usize>,
    },
}

/// Errors from opening a corrupted-MNIST `.npz` archive.
#[cfg(feature = "npz")]
#[derive(Debug, Error)]
pub enum DataError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("npz archive error: {0}")]
    Npz(#[from] ndarray_npy::ReadNpzError),

    #[error("archive has no `{0}` entry")]
    MissingArray(String),

    #[error("expected images of shape [n, 28, 28], got {got:?}")]
    BadImageShape { got: Vec<usize> },
}
