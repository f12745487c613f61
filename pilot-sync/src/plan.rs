//! Plan builder: desired state + recorded state → pending operations.
//!
//! Planning never calls the remote. Everything it needs to diff comes from
//! the rendered templates and the content cached in the [`StateStore`].
//! Stale-entry cleanup happens here, in memory; the store is only saved once
//! the plan has been applied.

use std::collections::BTreeSet;

use pilot_core::{ConfigError, RepoConfig, TemplatePatterns, Values};
use pilot_renderer::TemplateSource;

use crate::error::SyncError;
use crate::fingerprint::fingerprint;
use crate::operation::{
    remote_path, removal_message, ChangeKind, DiffTuple, OperationKind, PendingOperation,
};
use crate::state::{FileKey, StateStore};

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Why a repository entry produced no operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No template name matched the entry's patterns.
    NoTemplates,
    /// A selected template failed to render.
    Render { template: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub repository: String,
    /// `None` when the entry never resolved a branch.
    pub branch: Option<String>,
    pub reason: SkipReason,
}

/// A template whose rendered output already matches what was last written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnchangedFile {
    pub repository: String,
    pub branch: String,
    pub template_key: String,
    pub path: String,
}

/// Output of [`PlanBuilder::build`].
///
/// `operations` and `diffs` are parallel: the n-th tuple describes the n-th
/// operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub operations: Vec<PendingOperation>,
    pub diffs: Vec<DiffTuple>,
    pub unchanged: Vec<UnchangedFile>,
    pub skipped: Vec<SkippedEntry>,
}

impl Plan {
    /// `true` when there is nothing to show or apply.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn push(&mut self, op: PendingOperation, previous_content: Option<String>) {
        self.diffs.push(DiffTuple {
            repository: op.repository.clone(),
            branch: op.branch.clone(),
            operation: ChangeKind::from(op.kind),
            path: op.path.clone(),
            previous_content,
            new_content: op.content.clone(),
        });
        self.operations.push(op);
    }
}

// ---------------------------------------------------------------------------
// Entry resolution
// ---------------------------------------------------------------------------

enum Resolved {
    NoMatch {
        name: String,
        branch: Option<String>,
    },
    Ready {
        config: RepoConfig,
        selected: Vec<String>,
    },
}

impl Resolved {
    fn name(&self) -> &str {
        match self {
            Resolved::NoMatch { name, .. } => name.as_str(),
            Resolved::Ready { config, .. } => config.name.as_str(),
        }
    }

    fn branch(&self) -> Option<&str> {
        match self {
            Resolved::NoMatch { branch, .. } => branch.as_deref(),
            Resolved::Ready { config, .. } => Some(config.branch.as_str()),
        }
    }
}

// ---------------------------------------------------------------------------
// PlanBuilder
// ---------------------------------------------------------------------------

pub struct PlanBuilder<'a> {
    templates: &'a dyn TemplateSource,
    provider_id: &'a str,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(templates: &'a dyn TemplateSource, provider_id: &'a str) -> Self {
        Self {
            templates,
            provider_id,
        }
    }

    /// Build the plan for `values` against `store`.
    ///
    /// Every entry is validated before anything else happens, so a
    /// [`ConfigError`] leaves `store` untouched. Stale entries are removed
    /// from `store` in memory as their deletes are planned.
    pub fn build(&self, values: &Values, store: &mut StateStore) -> Result<Plan, SyncError> {
        let resolved = self.resolve(values)?;

        let mut groups: Vec<(String, Vec<Resolved>)> = Vec::new();
        for entry in resolved {
            match groups.iter_mut().find(|(name, _)| name == entry.name()) {
                Some((_, group)) => group.push(entry),
                None => groups.push((entry.name().to_string(), vec![entry])),
            }
        }

        let mut plan = Plan::default();
        for (repository, entries) in groups {
            let active: BTreeSet<String> = entries
                .iter()
                .filter_map(|e| e.branch().map(str::to_string))
                .collect();
            let any_ready = entries.iter().any(|e| matches!(e, Resolved::Ready { .. }));

            for entry in entries {
                match entry {
                    Resolved::NoMatch { name, branch } => {
                        tracing::warn!("{name}: no template matches its patterns, skipping");
                        plan.skipped.push(SkippedEntry {
                            repository: name,
                            branch,
                            reason: SkipReason::NoTemplates,
                        });
                    }
                    Resolved::Ready { config, selected } => {
                        self.plan_entry(&config, &selected, store, &mut plan);
                    }
                }
            }

            // A repository with nothing selectable is skipped whole, tracked branches included.
            if !any_ready {
                continue;
            }
            let stale = store.cleanup_stale_branches(self.provider_id, &repository, &active);
            for (branch, path) in stale {
                tracing::debug!("{repository}@{branch}: branch no longer configured, removing {path}");
                plan.push(self.delete_op(&repository, &branch, &path, None), None);
            }
        }

        Ok(plan)
    }

    fn resolve(&self, values: &Values) -> Result<Vec<Resolved>, ConfigError> {
        let available = self.templates.list_templates();
        let mut targets: BTreeSet<(String, String)> = BTreeSet::new();
        let mut resolved = Vec::with_capacity(values.repos.len());

        for repo in &values.repos {
            let layer = repo.layer_over(&values.defaults);
            let patterns = TemplatePatterns::compile(&layer.name, &layer.templates)?;
            let selected: Vec<String> = patterns
                .select(&available)
                .into_iter()
                .map(str::to_string)
                .collect();

            if selected.is_empty() {
                let branch = layer.branch.clone().filter(|b| !b.trim().is_empty());
                resolved.push(Resolved::NoMatch {
                    name: layer.name,
                    branch,
                });
                continue;
            }

            let config = layer.into_config()?;
            if !targets.insert((config.name.clone(), config.branch.clone())) {
                return Err(ConfigError::DuplicateTarget {
                    repo: config.name,
                    branch: config.branch,
                });
            }
            resolved.push(Resolved::Ready { config, selected });
        }

        Ok(resolved)
    }

    fn plan_entry(
        &self,
        config: &RepoConfig,
        selected: &[String],
        store: &mut StateStore,
        plan: &mut Plan,
    ) {
        let repository = config.name.as_str();
        let branch = config.branch.as_str();

        // Render everything first so a broken template leaves the branch alone.
        let mut rendered = Vec::with_capacity(selected.len());
        for template in selected {
            match self.templates.render(template, &config.vars) {
                Ok(content) => rendered.push((template.as_str(), content)),
                Err(err) => {
                    tracing::warn!("{repository}@{branch}: failed to render {template}: {err}");
                    plan.skipped.push(SkippedEntry {
                        repository: repository.to_string(),
                        branch: Some(branch.to_string()),
                        reason: SkipReason::Render {
                            template: template.clone(),
                            message: err.to_string(),
                        },
                    });
                    return;
                }
            }
        }

        for (template, content) in rendered {
            let path = remote_path(&config.path, template);
            let fresh = fingerprint(&content);
            let key = FileKey {
                provider: self.provider_id,
                repository,
                branch,
                template_key: template,
            };

            let previous = store.get_entry(&key).cloned();
            let kind = match &previous {
                Some(entry) if entry.fingerprint == fresh && entry.path == path => {
                    tracing::debug!("{repository}@{branch}: {path} unchanged");
                    plan.unchanged.push(UnchangedFile {
                        repository: repository.to_string(),
                        branch: branch.to_string(),
                        template_key: template.to_string(),
                        path,
                    });
                    continue;
                }
                Some(entry) if entry.path != path => {
                    tracing::debug!(
                        "{repository}@{branch}: {template} moved from {} to {path}",
                        entry.path
                    );
                    plan.push(
                        self.delete_op(repository, branch, &entry.path, Some(template)),
                        None,
                    );
                    OperationKind::Create
                }
                Some(_) => OperationKind::Update,
                None => OperationKind::Create,
            };

            let previous_content = match kind {
                OperationKind::Update => previous.map(|e| e.rendered),
                _ => None,
            };
            plan.push(
                PendingOperation {
                    provider: self.provider_id.to_string(),
                    repository: repository.to_string(),
                    branch: branch.to_string(),
                    path,
                    template_key: Some(template.to_string()),
                    content: Some(content),
                    commit_message: config.message.clone(),
                    kind,
                },
                previous_content,
            );
        }

        let current: BTreeSet<String> = selected.iter().cloned().collect();
        for path in store.cleanup_stale_keys(self.provider_id, repository, branch, &current) {
            tracing::debug!("{repository}@{branch}: {path} no longer rendered, removing");
            plan.push(self.delete_op(repository, branch, &path, None), None);
        }
    }

    fn delete_op(
        &self,
        repository: &str,
        branch: &str,
        path: &str,
        template_key: Option<&str>,
    ) -> PendingOperation {
        PendingOperation {
            provider: self.provider_id.to_string(),
            repository: repository.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
            template_key: template_key.map(str::to_string),
            content: None,
            commit_message: removal_message(path),
            kind: OperationKind::Delete,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
