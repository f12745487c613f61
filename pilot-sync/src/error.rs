//! Error types for pilot-sync.

use std::path::PathBuf;

use thiserror::Error;

use pilot_core::ConfigError;

/// Errors that abort a sync or drift run.
///
/// Per-operation remote failures are not here: they are reported as
/// [`ProviderError`] inside the apply report and never stop the run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration problem found while planning.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state file exists but does not parse. It is never silently reset.
    #[error("state file at {path} is malformed: {source}")]
    StateParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (state store save).
    #[error("state JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure of a single remote call.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The file does not exist on the remote branch.
    #[error("{path} not found in {repo} ({branch})")]
    NotFound {
        repo: String,
        branch: String,
        path: String,
    },

    /// The remote answered with an error status.
    #[error("remote returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never got a response (DNS, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
