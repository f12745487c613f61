//! Desired-state records parsed from `values.yml`.
//!
//! The values file has two layers: a global `defaults` block and a list of
//! per-repository overrides. [`RepoOverride::layer_over`] combines them into a
//! [`RepoLayer`], and [`RepoLayer::into_config`] validates the result into a
//! [`RepoConfig`] that the planner can act on.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Flat, string-keyed template variables.
///
/// Values are kept as JSON values so YAML numbers, booleans and lists reach
/// the template engine with their original types.
pub type Vars = BTreeMap<String, serde_json::Value>;

// ---------------------------------------------------------------------------
// Values file
// ---------------------------------------------------------------------------

/// Root of `values.yml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Values {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub repos: Vec<RepoOverride>,
}

/// Global defaults applied to every repository entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Defaults {
    pub branch: Option<String>,
    pub message: Option<String>,
    pub path: Option<String>,
    pub vars: Vars,
    pub templates: Vec<String>,
}

/// One `repos:` entry. Every field except `name` falls back to [`Defaults`].
///
/// The same repository may appear several times with different branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoOverride {
    /// Repository identifier, e.g. `owner/repo`.
    pub name: String,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub vars: Vars,
    #[serde(default)]
    pub templates: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Layering
// ---------------------------------------------------------------------------

/// A repository entry layered over defaults but not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoLayer {
    pub name: String,
    pub branch: Option<String>,
    pub message: Option<String>,
    pub path: Option<String>,
    pub vars: Vars,
    pub templates: Vec<String>,
}

/// Fully resolved desired state for one (repository, branch).
#[derive(Debug, Clone, PartialEq)]
pub struct RepoConfig {
    pub name: String,
    pub branch: String,
    pub message: String,
    pub path: String,
    pub vars: Vars,
    pub template_patterns: Vec<String>,
}

impl RepoOverride {
    /// Layer this entry over `defaults`.
    ///
    /// Scalars: the override wins when present. `vars`: shallow merge with
    /// the override winning per key. `templates`: the override list wins when
    /// present and non-empty.
    pub fn layer_over(&self, defaults: &Defaults) -> RepoLayer {
        let mut vars = defaults.vars.clone();
        for (key, value) in &self.vars {
            vars.insert(key.clone(), value.clone());
        }

        let templates = match &self.templates {
            Some(list) if !list.is_empty() => list.clone(),
            _ => defaults.templates.clone(),
        };

        RepoLayer {
            name: self.name.clone(),
            branch: self.branch.clone().or_else(|| defaults.branch.clone()),
            message: self.message.clone().or_else(|| defaults.message.clone()),
            path: self.path.clone().or_else(|| defaults.path.clone()),
            vars,
            templates,
        }
    }
}

impl RepoLayer {
    /// Require `branch`, `message` and `path` to be non-empty.
    pub fn into_config(self) -> Result<RepoConfig, ConfigError> {
        let branch = require(&self.name, "branch", self.branch)?;
        let message = require(&self.name, "message", self.message)?;
        let path = require(&self.name, "path", self.path)?;
        Ok(RepoConfig {
            name: self.name,
            branch,
            message,
            path,
            vars: self.vars,
            template_patterns: self.templates,
        })
    }
}

fn require(repo: &str, field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingField {
            repo: repo.to_string(),
            field,
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn defaults() -> Defaults {
        let mut vars = Vars::new();
        vars.insert("ci_name".into(), json!("scan"));
        vars.insert("env".into(), json!("dev"));
        Defaults {
            branch: Some("dev".into()),
            message: Some("git-pilot: update CI workflow".into()),
            path: Some(".github/workflows".into()),
            vars,
            templates: vec![r".*\.j2".into()],
        }
    }

    fn bare(name: &str) -> RepoOverride {
        RepoOverride {
            name: name.into(),
            branch: None,
            message: None,
            path: None,
            vars: Vars::new(),
            templates: None,
        }
    }

    #[test]
    fn scalars_fall_back_to_defaults() {
        let layer = bare("acme/svc").layer_over(&defaults());
        assert_eq!(layer.branch.as_deref(), Some("dev"));
        assert_eq!(layer.path.as_deref(), Some(".github/workflows"));
        assert_eq!(layer.templates, vec![r".*\.j2".to_string()]);
    }

    #[test]
    fn override_scalars_win() {
        let mut repo = bare("acme/svc");
        repo.branch = Some("main".into());
        repo.message = Some("custom".into());
        let cfg = repo.layer_over(&defaults()).into_config().expect("config");
        assert_eq!(cfg.branch, "main");
        assert_eq!(cfg.message, "custom");
        assert_eq!(cfg.path, ".github/workflows");
    }

    #[test]
    fn vars_merge_key_by_key() {
        let mut repo = bare("acme/svc");
        repo.vars.insert("env".into(), json!("stage"));
        repo.vars.insert("job_id".into(), json!(42));
        let layer = repo.layer_over(&defaults());
        assert_eq!(layer.vars.get("ci_name"), Some(&json!("scan")));
        assert_eq!(layer.vars.get("env"), Some(&json!("stage")));
        assert_eq!(layer.vars.get("job_id"), Some(&json!(42)));
    }

    #[rstest]
    #[case(None, vec![r".*\.j2"])]
    #[case(Some(vec![]), vec![r".*\.j2"])]
    #[case(Some(vec!["^override.*"]), vec!["^override.*"])]
    fn template_patterns_layering(#[case] repo: Option<Vec<&str>>, #[case] expected: Vec<&str>) {
        let mut entry = bare("acme/svc");
        entry.templates = repo.map(|v| v.into_iter().map(String::from).collect());
        let layer = entry.layer_over(&defaults());
        let expected: Vec<String> = expected.into_iter().map(String::from).collect();
        assert_eq!(layer.templates, expected);
    }

    #[rstest]
    #[case("branch")]
    #[case("message")]
    #[case("path")]
    fn missing_required_field_is_config_error(#[case] field: &str) {
        let mut d = defaults();
        match field {
            "branch" => d.branch = None,
            "message" => d.message = Some("   ".into()),
            _ => d.path = Some(String::new()),
        }
        let err = bare("acme/svc").layer_over(&d).into_config().unwrap_err();
        match err {
            ConfigError::MissingField { repo, field: f } => {
                assert_eq!(repo, "acme/svc");
                assert_eq!(f, field);
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }
}
