//! Drift detection: compare what is live on the remote with what was last
//! written.
//!
//! Detection never mutates state. Reconciling drift goes through the same
//! [`Reconciler`](crate::reconcile::Reconciler) path as a normal sync, using
//! the content cached in the state store.

use crate::comparator::is_same;
use crate::fingerprint::fingerprint;
use crate::operation::{ChangeKind, DiffTuple, OperationKind, PendingOperation};
use crate::provider::Provider;
use crate::state::StateStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftKind {
    /// Gone from the remote (or unreadable); will be recreated.
    Missing,
    /// Present with a different fingerprint.
    Modified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftEntry {
    pub repository: String,
    pub branch: String,
    pub template_key: String,
    pub path: String,
    pub kind: DriftKind,
    /// Live content, when it could be read.
    pub live: Option<String>,
    /// Content last written by this tool.
    pub desired: String,
    /// Set when the remote read failed and the file was classified as missing.
    pub read_error: Option<String>,
    /// Modified only in leading or trailing whitespace. Still reconciled.
    pub whitespace_only: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DriftReport {
    pub drifted: Vec<DriftEntry>,
    /// Number of tracked files inspected.
    pub checked: usize,
}

impl DriftReport {
    pub fn is_clean(&self) -> bool {
        self.drifted.is_empty()
    }

    /// Display tuples for the approval step.
    pub fn diffs(&self) -> Vec<DiffTuple> {
        self.drifted
            .iter()
            .map(|d| DiffTuple {
                repository: d.repository.clone(),
                branch: d.branch.clone(),
                operation: match d.kind {
                    DriftKind::Missing => ChangeKind::Missing,
                    DriftKind::Modified => ChangeKind::Modified,
                },
                path: d.path.clone(),
                previous_content: d.live.clone(),
                new_content: Some(d.desired.clone()),
            })
            .collect()
    }

    /// Operations that restore every drifted file to its recorded content.
    pub fn reconcile_operations(&self, provider_id: &str) -> Vec<PendingOperation> {
        self.drifted
            .iter()
            .map(|d| PendingOperation {
                provider: provider_id.to_string(),
                repository: d.repository.clone(),
                branch: d.branch.clone(),
                path: d.path.clone(),
                template_key: Some(d.template_key.clone()),
                content: Some(d.desired.clone()),
                commit_message: format!("git-pilot: reconcile drift in {}", d.path),
                kind: match d.kind {
                    DriftKind::Missing => OperationKind::Create,
                    DriftKind::Modified => OperationKind::Update,
                },
            })
            .collect()
    }
}

pub struct DriftDetector<'a> {
    provider: &'a dyn Provider,
}

impl<'a> DriftDetector<'a> {
    pub fn new(provider: &'a dyn Provider) -> Self {
        Self { provider }
    }

    /// Check every file tracked under this provider.
    pub fn detect(&self, store: &StateStore) -> DriftReport {
        let mut report = DriftReport::default();
        let provider_id = self.provider.id();

        for tracked in store.tracked().filter(|t| t.provider == provider_id) {
            report.checked += 1;
            let entry = tracked.entry;
            let (live, read_error) =
                match self
                    .provider
                    .get_content(tracked.repository, tracked.branch, &entry.path)
                {
                    Ok(live) => (live, None),
                    Err(err) => {
                        tracing::warn!(
                            "{}@{}: could not read {}: {err}",
                            tracked.repository,
                            tracked.branch,
                            entry.path
                        );
                        (None, Some(err.to_string()))
                    }
                };

            let kind = match &live {
                None => DriftKind::Missing,
                Some(content) if fingerprint(content) != entry.fingerprint => DriftKind::Modified,
                Some(_) => {
                    tracing::debug!("{}@{}: {} in sync", tracked.repository, tracked.branch, entry.path);
                    continue;
                }
            };

            let whitespace_only =
                kind == DriftKind::Modified && is_same(live.as_deref(), &entry.rendered);
            report.drifted.push(DriftEntry {
                repository: tracked.repository.to_string(),
                branch: tracked.branch.to_string(),
                template_key: tracked.template_key.to_string(),
                path: entry.path.clone(),
                kind,
                live,
                desired: entry.rendered.clone(),
                read_error,
                whitespace_only,
            });
        }

        report
    }
}
