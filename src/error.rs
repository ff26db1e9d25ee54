//! Error types for basecamp operations.
//!
//! This module defines [`SetupError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `SetupError` for infrastructure failures (spawn errors, download
//!   errors, IO) that need distinct handling
//! - Expected per-item failures (an installer exiting non-zero, a probe not
//!   matching) are modeled as outcome values, not errors — a failed item is
//!   reported and the run continues
//! - Use `anyhow::Error` (via `SetupError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for basecamp operations.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Configuration file exists but could not be parsed.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Dependency name isn't in the registry.
    #[error("Unknown dependency: {name}")]
    UnknownDependency { name: String },

    /// A subprocess could not be spawned (program missing, permissions).
    #[error("Failed to launch '{program}': {message}")]
    SpawnFailed { program: String, message: String },

    /// Downloading an installer binary failed.
    #[error("Download failed for {url}: {message}")]
    DownloadFailed { url: String, message: String },

    /// No installed server instance matched the expected version.
    #[error("No MySQL server instance with version {expected} found")]
    ServerNotFound { expected: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for basecamp operations.
pub type Result<T> = std::result::Result<T, SetupError>;
