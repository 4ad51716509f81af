//! Error types for the slice pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for slice pipeline operations.
pub type LogicResult<T> = Result<T, LogicError>;

/// Errors raised by the slice pipeline.
///
/// Missing inputs are not errors: a view with nothing to show simply has
/// no output.
#[derive(Debug, Error)]
pub enum LogicError {
    /// Configuration value out of range.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Config file not found.
    #[error("config file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// I/O error reading a config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Orientation preset name not recognised.
    #[error("unknown layout: {0}")]
    UnknownLayout(String),

    /// Argument out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation needs [`SliceLogic::attach`](crate::SliceLogic::attach) first.
    #[error("logic is not attached to a scene")]
    NotAttached,

    /// Scene access failed.
    #[error(transparent)]
    Scene(#[from] slice_scene::SceneError),

    /// Image operation failed.
    #[error(transparent)]
    Ops(#[from] slice_ops::OpsError),

    /// Core data construction failed.
    #[error(transparent)]
    Core(#[from] slice_core::Error),
}
