//! Error types for grid construction and contour tracing.

use thiserror::Error;

/// Errors raised before any tracing starts.
///
/// Tracing is all-or-nothing: every check runs up front, so a caller never
/// sees a partial result alongside an error.
#[derive(Error, Debug)]
pub enum ContourError {
    /// X, Y and Z disagree in shape, rows are ragged, or the grid is smaller than 2x2.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The mask does not have the same shape as Z.
    #[error("invalid mask: {0}")]
    InvalidMask(String),

    /// Levels are not strictly increasing, or a band has `lower >= upper`.
    #[error("invalid levels: {0}")]
    InvalidLevels(String),

    /// An unmasked sample is NaN or infinite.
    #[error("non-finite value {value} at unmasked sample ({row}, {col})")]
    InvalidData { row: usize, col: usize, value: f64 },

    /// A sample has a NaN or infinite X or Y coordinate.
    #[error("non-finite coordinate ({x}, {y}) at sample ({row}, {col})")]
    InvalidCoordinate { row: usize, col: usize, x: f64, y: f64 },

    /// A configuration value could not be parsed or is out of range.
    #[error("configuration error: {0}")]
    InvalidConfig(String),

    /// JSON (de)serialization failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ContourError {
    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    /// Create an InvalidMask error.
    pub fn invalid_mask(msg: impl Into<String>) -> Self {
        Self::InvalidMask(msg.into())
    }

    /// Create an InvalidLevels error.
    pub fn invalid_levels(msg: impl Into<String>) -> Self {
        Self::InvalidLevels(msg.into())
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ContourError>;
