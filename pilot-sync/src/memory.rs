//! In-process [`Provider`] used by tests.
//!
//! Files live in a map keyed by (repository, branch, path). Writes and reads
//! can be made to fail per path, and every call is recorded so tests can
//! assert on remote traffic.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::ProviderError;
use crate::fingerprint::fingerprint;
use crate::provider::{Provider, RevisionRef};

type FileAddr = (String, String, String);

/// One recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Sync {
        repo: String,
        branch: String,
        path: String,
    },
    Delete {
        repo: String,
        branch: String,
        path: String,
    },
    Get {
        repo: String,
        branch: String,
        path: String,
    },
}

#[derive(Debug, Default)]
struct Inner {
    files: BTreeMap<FileAddr, String>,
    fail_writes: BTreeSet<String>,
    fail_reads: BTreeSet<String>,
    calls: Vec<ProviderCall>,
}

#[derive(Debug)]
pub struct MemoryProvider {
    id: String,
    inner: RefCell<Inner>,
}

fn addr(repo: &str, branch: &str, path: &str) -> FileAddr {
    (repo.to_string(), branch.to_string(), path.to_string())
}

impl MemoryProvider {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            inner: RefCell::new(Inner::default()),
        }
    }

    /// Builder form of [`MemoryProvider::put`].
    pub fn with_file(self, repo: &str, branch: &str, path: &str, content: &str) -> Self {
        self.put(repo, branch, path, content);
        self
    }

    /// Place a file directly, without recording a call.
    pub fn put(&self, repo: &str, branch: &str, path: &str, content: &str) {
        self.inner
            .borrow_mut()
            .files
            .insert(addr(repo, branch, path), content.to_string());
    }

    /// Remove a file directly, without recording a call.
    pub fn remove(&self, repo: &str, branch: &str, path: &str) -> Option<String> {
        self.inner.borrow_mut().files.remove(&addr(repo, branch, path))
    }

    pub fn file(&self, repo: &str, branch: &str, path: &str) -> Option<String> {
        self.inner.borrow().files.get(&addr(repo, branch, path)).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.inner.borrow().files.len()
    }

    /// Make every write or delete of `path` fail with a 500.
    pub fn fail_writes_to(&self, path: &str) {
        self.inner.borrow_mut().fail_writes.insert(path.to_string());
    }

    /// Make every read of `path` fail with a transport error.
    pub fn fail_reads_from(&self, path: &str) {
        self.inner.borrow_mut().fail_reads.insert(path.to_string());
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.inner.borrow().calls.clone()
    }

    /// Number of write and delete calls recorded so far.
    pub fn mutation_count(&self) -> usize {
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|c| !matches!(c, ProviderCall::Get { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }
}

impl Provider for MemoryProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn sync_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        content: &str,
        _message: &str,
    ) -> Result<RevisionRef, ProviderError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(ProviderCall::Sync {
            repo: repo.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
        });
        if inner.fail_writes.contains(path) {
            return Err(ProviderError::Status {
                status: 500,
                message: format!("injected write failure for {path}"),
            });
        }
        inner
            .files
            .insert(addr(repo, branch, path), content.to_string());
        Ok(RevisionRef(fingerprint(content)))
    }

    fn delete_file(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
        _message: &str,
    ) -> Result<(), ProviderError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(ProviderCall::Delete {
            repo: repo.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
        });
        if inner.fail_writes.contains(path) {
            return Err(ProviderError::Status {
                status: 500,
                message: format!("injected delete failure for {path}"),
            });
        }
        match inner.files.remove(&addr(repo, branch, path)) {
            Some(_) => Ok(()),
            None => Err(ProviderError::NotFound {
                repo: repo.to_string(),
                branch: branch.to_string(),
                path: path.to_string(),
            }),
        }
    }

    fn get_content(
        &self,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<String>, ProviderError> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(ProviderCall::Get {
            repo: repo.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
        });
        if inner.fail_reads.contains(path) {
            return Err(ProviderError::Transport(format!(
                "injected read failure for {path}"
            )));
        }
        Ok(inner.files.get(&addr(repo, branch, path)).cloned())
    }
}
