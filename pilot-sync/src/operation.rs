//! Planned work and its display form.
//!
//! A [`PendingOperation`] is what the reconciler executes; a [`DiffTuple`] is
//! what the approval step shows. Both live only for one invocation.

use std::fmt;

use serde::Serialize;

/// Remote mutation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Create => write!(f, "create"),
            OperationKind::Update => write!(f, "update"),
            OperationKind::Delete => write!(f, "delete"),
        }
    }
}

/// One unit of planned remote work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    pub provider: String,
    pub repository: String,
    pub branch: String,
    pub path: String,
    pub template_key: Option<String>,
    /// Content to write; `None` for deletes.
    pub content: Option<String>,
    pub commit_message: String,
    pub kind: OperationKind,
}

/// What a [`DiffTuple`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
    /// Tracked file is gone from the remote; it will be recreated.
    Missing,
    /// Tracked file was changed on the remote by someone else.
    Modified,
}

impl ChangeKind {
    /// Short label for listings.
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Create => "CREATE",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
            ChangeKind::Missing => "MISSING, RECREATE",
            ChangeKind::Modified => "MODIFIED EXTERNALLY",
        }
    }
}

impl From<OperationKind> for ChangeKind {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Create => ChangeKind::Create,
            OperationKind::Update => ChangeKind::Update,
            OperationKind::Delete => ChangeKind::Delete,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Create => write!(f, "create"),
            ChangeKind::Update => write!(f, "update"),
            ChangeKind::Delete => write!(f, "delete"),
            ChangeKind::Missing => write!(f, "missing"),
            ChangeKind::Modified => write!(f, "modified"),
        }
    }
}

/// Display and approval unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffTuple {
    pub repository: String,
    pub branch: String,
    pub operation: ChangeKind,
    pub path: String,
    pub previous_content: Option<String>,
    pub new_content: Option<String>,
}

impl DiffTuple {
    /// `true` when either side has something other than whitespace to show.
    pub fn has_content(&self) -> bool {
        let non_blank = |c: &Option<String>| c.as_deref().is_some_and(|s| !s.trim().is_empty());
        non_blank(&self.previous_content) || non_blank(&self.new_content)
    }
}

// ---------------------------------------------------------------------------
// Remote path derivation
// ---------------------------------------------------------------------------

/// Template name with its last extension removed.
///
/// `ci.yml.j2` → `ci.yml`; `deploy.j2` → `deploy`; names without an
/// extension (including dot-files such as `.j2`) are returned unchanged.
pub fn strip_last_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}

/// Remote path for `template` under the repository path root `root`.
pub fn remote_path(root: &str, template: &str) -> String {
    let file = strip_last_extension(template);
    let root = root.trim_end_matches('/');
    if root.is_empty() {
        file.to_string()
    } else {
        format!("{root}/{file}")
    }
}

/// Commit message used for deletes of files no longer desired.
pub fn removal_message(path: &str) -> String {
    format!("git-pilot: remove {path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(".github/workflows", "ci.yml.j2", ".github/workflows/ci.yml")]
    #[case(".github/workflows/", "ci.yml.j2", ".github/workflows/ci.yml")]
    #[case(".github/workflows/git-pilot/", "override-example.yml.j2", ".github/workflows/git-pilot/override-example.yml")]
    #[case(".github/workflows", "deploy.j2", ".github/workflows/deploy")]
    #[case("ci", "noext", "ci/noext")]
    #[case("", "ci.yml.j2", "ci.yml")]
    #[case("/", "ci.yml.j2", "ci.yml")]
    #[case("x", ".j2", "x/.j2")]
    #[case("x", ".env.j2", "x/.env")]
    fn remote_path_table(#[case] root: &str, #[case] template: &str, #[case] expected: &str) {
        assert_eq!(remote_path(root, template), expected);
    }

    #[test]
    fn has_content_ignores_whitespace_only() {
        let mut tuple = DiffTuple {
            repository: "acme/svc".into(),
            branch: "main".into(),
            operation: ChangeKind::Delete,
            path: "ci.yml".into(),
            previous_content: None,
            new_content: Some("  \n".into()),
        };
        assert!(!tuple.has_content());
        tuple.previous_content = Some("on: push".into());
        assert!(tuple.has_content());
    }

    #[test]
    fn change_kind_from_operation_kind() {
        assert_eq!(ChangeKind::from(OperationKind::Update), ChangeKind::Update);
        assert_eq!(ChangeKind::Missing.to_string(), "missing");
        assert_eq!(ChangeKind::Modified.label(), "MODIFIED EXTERNALLY");
    }
}
