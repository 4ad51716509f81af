//! Error types for slice operations.

use thiserror::Error;

/// Error type for slice operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Invalid dimensions specified.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Images have incompatible sizes.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Building a core data type failed.
    #[error(transparent)]
    Core(#[from] slice_core::Error),
}

/// Result type for slice operations.
pub type OpsResult<T> = Result<T, OpsError>;
