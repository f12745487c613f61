//! State store: provenance of every file git-pilot has written.
//!
//! Persists a JSON document (default `.git-pilot-state.json`):
//!
//! ```text
//! { "repos": { <provider>: { <repository>: { "branches": { <branch>: {
//!     "files": { <template key>: { path, sha, rendered, updated_at } } } } } } } }
//! ```
//!
//! Writes use the atomic `.tmp` + rename pattern. Cleanup operations only
//! mutate memory; turning the paths they return into remote deletes is the
//! caller's job.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{io_err, SyncError};

/// Default state file name, relative to the working directory.
pub const DEFAULT_STATE_FILE: &str = ".git-pilot-state.json";

// ---------------------------------------------------------------------------
// On-disk shape
// ---------------------------------------------------------------------------

/// Root of the state file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    /// provider id → repository → repo state.
    #[serde(default)]
    pub repos: BTreeMap<String, BTreeMap<String, RepoState>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoState {
    #[serde(default)]
    pub branches: BTreeMap<String, BranchState>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchState {
    /// template key → entry.
    #[serde(default)]
    pub files: BTreeMap<String, StateEntry>,
}

/// One file this tool is responsible for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    /// Remote path of the file.
    pub path: String,
    /// Fingerprint of the last content written.
    #[serde(rename = "sha")]
    pub fingerprint: String,
    /// Exact content last written, cached so plans can diff without a remote read.
    pub rendered: String,
    pub updated_at: DateTime<Utc>,
}

/// Address of one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileKey<'a> {
    pub provider: &'a str,
    pub repository: &'a str,
    pub branch: &'a str,
    pub template_key: &'a str,
}

/// An entry together with its full address, as yielded by [`StateStore::tracked`].
#[derive(Debug, Clone, Copy)]
pub struct TrackedFile<'a> {
    pub provider: &'a str,
    pub repository: &'a str,
    pub branch: &'a str,
    pub template_key: &'a str,
    pub entry: &'a StateEntry,
}

// ---------------------------------------------------------------------------
// StateStore
// ---------------------------------------------------------------------------

/// In-memory state bound to the file it was loaded from.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    state: StateFile,
}

impl StateStore {
    /// Load state from `path`.
    ///
    /// Returns an empty store if the file does not exist yet. A file that
    /// exists but does not parse is a [`SyncError::StateParse`].
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, SyncError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                state: StateFile::default(),
            });
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let state = serde_json::from_str(&contents).map_err(|source| SyncError::StateParse {
            path: path.clone(),
            source,
        })?;
        Ok(Self { path, state })
    }

    /// Save atomically: write `<path>.tmp`, then rename over `<path>`.
    pub fn save(&self) -> Result<(), SyncError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }

        let json = serde_json::to_string_pretty(&self.state)?;
        let tmp = tmp_path(&self.path);
        std::fs::write(&tmp, json).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&self.path, e));
        }
        tracing::debug!("saved state to {}", self.path.display());
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &StateFile {
        &self.state
    }

    pub fn is_empty(&self) -> bool {
        self.state.repos.is_empty()
    }

    pub fn get_entry(&self, key: &FileKey<'_>) -> Option<&StateEntry> {
        self.state
            .repos
            .get(key.provider)?
            .get(key.repository)?
            .branches
            .get(key.branch)?
            .files
            .get(key.template_key)
    }

    /// Insert or replace the entry at `key`, stamping `updated_at` with now.
    pub fn update_entry(&mut self, key: &FileKey<'_>, path: &str, fingerprint: &str, content: &str) {
        let entry = StateEntry {
            path: path.to_string(),
            fingerprint: fingerprint.to_string(),
            rendered: content.to_string(),
            updated_at: Utc::now(),
        };
        self.state
            .repos
            .entry(key.provider.to_string())
            .or_default()
            .entry(key.repository.to_string())
            .or_default()
            .branches
            .entry(key.branch.to_string())
            .or_default()
            .files
            .insert(key.template_key.to_string(), entry);
    }

    /// Drop every entry under (provider, repository, branch) whose key is not
    /// in `current_keys`. Returns the remote paths of the dropped entries.
    pub fn cleanup_stale_keys(
        &mut self,
        provider: &str,
        repository: &str,
        branch: &str,
        current_keys: &BTreeSet<String>,
    ) -> Vec<String> {
        let Some(files) = self.branch_files_mut(provider, repository, branch) else {
            return Vec::new();
        };

        let stale: Vec<String> = files
            .keys()
            .filter(|key| !current_keys.contains(*key))
            .cloned()
            .collect();
        let mut removed = Vec::with_capacity(stale.len());
        for key in stale {
            if let Some(entry) = files.remove(&key) {
                removed.push(entry.path);
            }
        }

        self.prune_empty(provider, repository);
        removed
    }

    /// Drop every branch under (provider, repository) that is not in
    /// `active_branches`. Returns `(branch, path)` for every file tracked there.
    pub fn cleanup_stale_branches(
        &mut self,
        provider: &str,
        repository: &str,
        active_branches: &BTreeSet<String>,
    ) -> Vec<(String, String)> {
        let Some(repo) = self
            .state
            .repos
            .get_mut(provider)
            .and_then(|repos| repos.get_mut(repository))
        else {
            return Vec::new();
        };

        let stale: Vec<String> = repo
            .branches
            .keys()
            .filter(|branch| !active_branches.contains(*branch))
            .cloned()
            .collect();
        let mut removed = Vec::new();
        for branch in stale {
            if let Some(state) = repo.branches.remove(&branch) {
                for entry in state.files.into_values() {
                    removed.push((branch.clone(), entry.path));
                }
            }
        }

        self.prune_empty(provider, repository);
        removed
    }

    /// Drop entries under (provider, repository, branch) that point at `path`.
    ///
    /// With `template_key`, only that key's entry is considered.
    /// Returns `true` if anything was removed.
    pub fn remove_path(
        &mut self,
        provider: &str,
        repository: &str,
        branch: &str,
        path: &str,
        template_key: Option<&str>,
    ) -> bool {
        let Some(files) = self.branch_files_mut(provider, repository, branch) else {
            return false;
        };
        let before = files.len();
        files.retain(|key, entry| {
            let key_matches = template_key.map_or(true, |k| k == key.as_str());
            !(key_matches && entry.path == path)
        });
        let removed = files.len() != before;
        self.prune_empty(provider, repository);
        removed
    }

    /// Every tracked entry, ordered by provider, repository, branch and key.
    pub fn tracked(&self) -> impl Iterator<Item = TrackedFile<'_>> {
        self.state.repos.iter().flat_map(|(provider, repos)| {
            repos.iter().flat_map(move |(repository, repo)| {
                repo.branches.iter().flat_map(move |(branch, state)| {
                    state.files.iter().map(move |(template_key, entry)| TrackedFile {
                        provider: provider.as_str(),
                        repository: repository.as_str(),
                        branch: branch.as_str(),
                        template_key: template_key.as_str(),
                        entry,
                    })
                })
            })
        })
    }

    fn branch_files_mut(
        &mut self,
        provider: &str,
        repository: &str,
        branch: &str,
    ) -> Option<&mut BTreeMap<String, StateEntry>> {
        self.state
            .repos
            .get_mut(provider)?
            .get_mut(repository)?
            .branches
            .get_mut(branch)
            .map(|b| &mut b.files)
    }

    // Empty branch, repository and provider containers are removed so the
    // state file does not accumulate empty structures.
    fn prune_empty(&mut self, provider: &str, repository: &str) {
        let Some(repos) = self.state.repos.get_mut(provider) else {
            return;
        };
        if let Some(repo) = repos.get_mut(repository) {
            repo.branches.retain(|_, b| !b.files.is_empty());
            if repo.branches.is_empty() {
                repos.remove(repository);
            }
        }
        if repos.is_empty() {
            self.state.repos.remove(provider);
        }
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
