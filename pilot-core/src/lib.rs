//! git-pilot core library: desired-state configuration and the init scaffold.
//!
//! - [`types`]: values file records and the resolved [`RepoConfig`]
//! - [`config`]: load `values.yml`, layer overrides over defaults, match patterns
//! - [`scaffold`]: example template tree written by `git-pilot init`
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod scaffold;
pub mod types;

pub use config::{load_values, TemplatePatterns};
pub use error::ConfigError;
pub use types::{Defaults, RepoConfig, RepoLayer, RepoOverride, Values, Vars};
