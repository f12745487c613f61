//! Error types for pilot-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from template loading and rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error (parse failure, unresolved variable, ...).
    #[error("template engine error: {}", describe(.0))]
    Tera(#[from] tera::Error),

    /// JSON serialization error (building tera context).
    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while loading templates.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested name is not a top-level template.
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),
}

// Tera keeps the useful part ("Variable `x` not found ...") in the source chain.
fn describe(err: &tera::Error) -> String {
    let mut msg = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
