//! Error types for pilot-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or resolving configuration.
///
/// Every variant is fatal: configuration problems abort a run before any
/// remote call is attempted.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with the line context from serde_yaml.
    #[error("failed to parse values file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required field is still empty after layering the repo over defaults.
    #[error("repository '{repo}' has no '{field}' (set it on the repo or in defaults)")]
    MissingField { repo: String, field: &'static str },

    /// Two `repos:` entries resolve to the same repository and branch.
    #[error("repository '{repo}' branch '{branch}' is configured more than once")]
    DuplicateTarget { repo: String, branch: String },

    /// A template selection pattern is not a valid regular expression.
    #[error("repository '{repo}' has invalid template pattern '{pattern}': {source}")]
    InvalidPattern {
        repo: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Convenience constructor for [`ConfigError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
