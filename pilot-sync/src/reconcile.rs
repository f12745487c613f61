//! Reconciler: executes an approved operation list against a provider.
//!
//! Operations run strictly in order and independently. A failed remote call
//! is recorded and the run moves on; state only records what actually
//! succeeded. The store is saved once, after every operation was attempted.

use crate::error::{ProviderError, SyncError};
use crate::fingerprint::fingerprint;
use crate::operation::{OperationKind, PendingOperation};
use crate::provider::{Provider, RevisionRef};
use crate::state::{FileKey, StateStore};

/// Result of one operation.
#[derive(Debug)]
pub enum OperationOutcome {
    Written { revision: RevisionRef },
    Deleted,
    /// Delete of a path the remote no longer has. Counts as success.
    AlreadyAbsent,
    Failed(ProviderError),
}

impl OperationOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, OperationOutcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct OperationReport {
    pub operation: PendingOperation,
    pub outcome: OperationOutcome,
}

/// Everything that happened during one apply.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub results: Vec<OperationReport>,
}

impl ApplyReport {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &OperationReport> {
        self.results.iter().filter(|r| !r.outcome.is_success())
    }
}

pub struct Reconciler<'a> {
    provider: &'a dyn Provider,
}

impl<'a> Reconciler<'a> {
    pub fn new(provider: &'a dyn Provider) -> Self {
        Self { provider }
    }

    /// Apply `operations` in order and save `store` once at the end.
    ///
    /// Only a state persistence failure is returned as `Err`; remote failures
    /// are part of the report.
    pub fn apply(
        &self,
        operations: &[PendingOperation],
        store: &mut StateStore,
    ) -> Result<ApplyReport, SyncError> {
        let mut report = ApplyReport::default();
        for op in operations {
            let outcome = match op.kind {
                OperationKind::Delete => self.delete(op, store),
                OperationKind::Create | OperationKind::Update => self.write(op, store),
            };
            if let OperationOutcome::Failed(err) = &outcome {
                tracing::warn!(
                    "{} {}@{}: {} failed: {err}",
                    op.kind,
                    op.repository,
                    op.branch,
                    op.path
                );
            }
            report.results.push(OperationReport {
                operation: op.clone(),
                outcome,
            });
        }

        store.save()?;
        Ok(report)
    }

    fn write(&self, op: &PendingOperation, store: &mut StateStore) -> OperationOutcome {
        let content = op.content.as_deref().unwrap_or_default();
        match self.provider.sync_file(
            &op.repository,
            &op.branch,
            &op.path,
            content,
            &op.commit_message,
        ) {
            Ok(revision) => {
                tracing::info!("{} {}@{}: {} ({revision})", op.kind, op.repository, op.branch, op.path);
                if let Some(template_key) = op.template_key.as_deref() {
                    let key = FileKey {
                        provider: &op.provider,
                        repository: &op.repository,
                        branch: &op.branch,
                        template_key,
                    };
                    store.update_entry(&key, &op.path, &fingerprint(content), content);
                }
                OperationOutcome::Written { revision }
            }
            Err(err) => OperationOutcome::Failed(err),
        }
    }

    fn delete(&self, op: &PendingOperation, store: &mut StateStore) -> OperationOutcome {
        let outcome = match self.provider.delete_file(
            &op.repository,
            &op.branch,
            &op.path,
            &op.commit_message,
        ) {
            Ok(()) => {
                tracing::info!("delete {}@{}: {}", op.repository, op.branch, op.path);
                OperationOutcome::Deleted
            }
            Err(ProviderError::NotFound { .. }) => {
                tracing::debug!("{}@{}: {} already absent", op.repository, op.branch, op.path);
                OperationOutcome::AlreadyAbsent
            }
            Err(err) => return OperationOutcome::Failed(err),
        };
        store.remove_path(
            &op.provider,
            &op.repository,
            &op.branch,
            &op.path,
            op.template_key.as_deref(),
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryProvider;
    use tempfile::TempDir;

    fn op(kind: OperationKind, path: &str, content: Option<&str>) -> PendingOperation {
        PendingOperation {
            provider: "memory".into(),
            repository: "acme/svc".into(),
            branch: "main".into(),
            path: path.into(),
            template_key: Some(format!("{path}.j2")),
            content: content.map(str::to_string),
            commit_message: "msg".into(),
            kind,
        }
    }

    fn key(template_key: &str) -> FileKey<'_> {
        FileKey {
            provider: "memory",
            repository: "acme/svc",
            branch: "main",
            template_key,
        }
    }

    #[test]
    fn successful_write_records_state_and_saves() {
        let tmp = TempDir::new().unwrap();
        let mut store = StateStore::load(tmp.path().join("state.json")).unwrap();
        let provider = MemoryProvider::new("memory");

        let report = Reconciler::new(&provider)
            .apply(&[op(OperationKind::Create, "ci.yml", Some("on: push\n"))], &mut store)
            .unwrap();

        assert_eq!(report.succeeded(), 1);
        let entry = store.get_entry(&key("ci.yml.j2")).expect("entry");
        assert_eq!(entry.fingerprint, fingerprint("on: push\n"));
        assert_eq!(entry.rendered, "on: push\n");
        assert!(store.path().exists());
    }

    #[test]
    fn failed_write_leaves_state_untouched_and_continues() {
        let tmp = TempDir::new().unwrap();
        let mut store = StateStore::load(tmp.path().join("state.json")).unwrap();
        let provider = MemoryProvider::new("memory");
        provider.fail_writes_to("a.yml");

        let report = Reconciler::new(&provider)
            .apply(
                &[
                    op(OperationKind::Create, "a.yml", Some("a")),
                    op(OperationKind::Create, "b.yml", Some("b")),
                ],
                &mut store,
            )
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(report.succeeded(), 1);
        assert!(report.has_failures());
        assert!(store.get_entry(&key("a.yml.j2")).is_none());
        assert!(store.get_entry(&key("b.yml.j2")).is_some());
        assert_eq!(provider.file("acme/svc", "main", "b.yml").as_deref(), Some("b"));
    }

    #[test]
    fn delete_of_absent_path_counts_as_success() {
        let tmp = TempDir::new().unwrap();
        let mut store = StateStore::load(tmp.path().join("state.json")).unwrap();
        store.update_entry(&key("gone.yml.j2"), "gone.yml", "h", "x");
        let provider = MemoryProvider::new("memory");

        let report = Reconciler::new(&provider)
            .apply(&[op(OperationKind::Delete, "gone.yml", None)], &mut store)
            .unwrap();

        assert!(matches!(report.results[0].outcome, OperationOutcome::AlreadyAbsent));
        assert!(!report.has_failures());
        assert!(store.is_empty());
    }

    #[test]
    fn failed_delete_keeps_entry() {
        let tmp = TempDir::new().unwrap();
        let mut store = StateStore::load(tmp.path().join("state.json")).unwrap();
        store.update_entry(&key("old.yml.j2"), "old.yml", "h", "x");
        let provider = MemoryProvider::new("memory").with_file("acme/svc", "main", "old.yml", "x");
        provider.fail_writes_to("old.yml");

        let report = Reconciler::new(&provider)
            .apply(&[op(OperationKind::Delete, "old.yml", None)], &mut store)
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert!(store.get_entry(&key("old.yml.j2")).is_some());
    }
}
