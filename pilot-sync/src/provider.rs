//! Remote repository abstraction.
//!
//! The planner, reconciler and drift detector only ever talk to a
//! [`Provider`]; choosing a concrete implementation is the CLI's job.

use std::fmt;

use crate::error::ProviderError;

/// Opaque identifier of the remote revision produced by a write
/// (a blob or commit sha for GitHub).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionRef(pub String);

impl fmt::Display for RevisionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A hosted git service that can read, write and delete single files on a
/// branch.
pub trait Provider {
    /// Stable identifier used as the first level of the state file.
    fn id(&self) -> &str;

    /// Create or update `path` on `branch` with `content`.
    fn sync_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        content: &str,
        message: &str,
    ) -> Result<RevisionRef, ProviderError>;

    /// Delete `path` on `branch`. Fails with [`ProviderError::NotFound`] when
    /// the file does not exist.
    fn delete_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        message: &str,
    ) -> Result<(), ProviderError>;

    /// Current content of `path` on `branch`, `None` when absent.
    fn get_content(&self, repo: &str, branch: &str, path: &str)
        -> Result<Option<String>, ProviderError>;
}
