use thiserror::Error;
use std::io;
use std::path::PathBuf;

use crate::grid::Bounds;

/// Error types for RidgePrint
#[derive(Error, Debug)]
pub enum RidgeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Grid shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch { expected: Bounds, actual: Bounds },

    #[error("Grid of {width}x{height} has no interior to operate on")]
    NoInterior { width: u32, height: u32 },

    #[error("Expected a two-level grid but found value {value} at ({x}, {y})")]
    NotBinary { x: i32, y: i32, value: f64 },

    #[error("Background kernel task failed: {0}")]
    TaskFailed(String),

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),

    #[error("Unexpected error: {0}")]
    Other(String),
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, RidgeError>;
