//! `values.yml` loading and template pattern matching.

use std::path::Path;

use regex::Regex;

use crate::error::{io_err, ConfigError};
use crate::types::Values;

/// Load and parse a values file.
///
/// Returns `ConfigError::Parse` (with path + line context) if the YAML is
/// malformed or has unknown fields.
pub fn load_values(path: &Path) -> Result<Values, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Compiled template selection patterns for one repository entry.
///
/// A template is selected when its name fully matches at least one pattern.
#[derive(Debug, Clone)]
pub struct TemplatePatterns {
    patterns: Vec<Regex>,
}

impl TemplatePatterns {
    /// Compile `patterns`, anchoring each one so only full-string matches count.
    pub fn compile(repo: &str, patterns: &[String]) -> Result<Self, ConfigError> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let anchored = format!("^(?:{pattern})$");
            let regex = Regex::new(&anchored).map_err(|source| ConfigError::InvalidPattern {
                repo: repo.to_string(),
                pattern: pattern.clone(),
                source,
            })?;
            compiled.push(regex);
        }
        Ok(Self { patterns: compiled })
    }

    pub fn matches(&self, template: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(template))
    }

    /// Keep the names that match, preserving input order.
    pub fn select<'a>(&self, templates: &'a [String]) -> Vec<&'a str> {
        templates
            .iter()
            .filter(|t| self.matches(t))
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn patterns(list: &[&str]) -> TemplatePatterns {
        let owned: Vec<String> = list.iter().map(|s| s.to_string()).collect();
        TemplatePatterns::compile("acme/svc", &owned).expect("compile")
    }

    #[rstest]
    #[case(r".*\.j2", "ci.yml.j2", true)]
    #[case(r"ci", "ci.yml.j2", false)]
    #[case(r"^override.*\.j2$", "override-example.yml.j2", true)]
    #[case(r"override.*\.j2", "example.yml.j2", false)]
    #[case(r"a|b", "ab", false)]
    fn full_match_semantics(#[case] pattern: &str, #[case] name: &str, #[case] expected: bool) {
        assert_eq!(patterns(&[pattern]).matches(name), expected);
    }

    #[test]
    fn select_keeps_order_and_any_match() {
        let names = vec![
            "a.yml.j2".to_string(),
            "b.yml.j2".to_string(),
            "legacy.yml.j2".to_string(),
        ];
        let selected = patterns(&["a.*", "legacy.*"]).select(&names);
        assert_eq!(selected, vec!["a.yml.j2", "legacy.yml.j2"]);
    }

    #[test]
    fn empty_pattern_list_selects_nothing() {
        let names = vec!["ci.yml.j2".to_string()];
        assert!(patterns(&[]).select(&names).is_empty());
    }

    #[test]
    fn invalid_regex_is_config_error() {
        let err = TemplatePatterns::compile("acme/svc", &["(unclosed".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }), "got: {err}");
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn load_values_parses_defaults_and_repos() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("values.yml");
        std::fs::write(
            &path,
            "defaults:\n  branch: dev\n  vars:\n    ci_name: scan\nrepos:\n  - name: acme/svc\n    vars:\n      env: test\n",
        )
        .unwrap();
        let values = load_values(&path).expect("load");
        assert_eq!(values.defaults.branch.as_deref(), Some("dev"));
        assert_eq!(values.repos.len(), 1);
        assert_eq!(values.repos[0].name, "acme/svc");
    }

    #[test]
    fn load_values_rejects_unknown_repo_field() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("values.yml");
        std::fs::write(&path, "repos:\n  - name: acme/svc\n    brnach: main\n").unwrap();
        let err = load_values(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
        assert!(err.to_string().contains("values.yml"));
    }

    #[test]
    fn load_values_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_values(&tmp.path().join("nope.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
