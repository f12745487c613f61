//! `--provider` selection and construction.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use pilot_github::GitHubProvider;
use pilot_sync::Provider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProviderKind {
    Github,
}

impl ProviderKind {
    /// Key under which this provider's files are recorded in the state file.
    pub fn id(self) -> &'static str {
        match self {
            ProviderKind::Github => "github",
        }
    }
}

/// Connection options shared by `sync` and `drift-detect`.
#[derive(Args, Debug)]
pub struct ProviderArgs {
    /// Hosting provider of the target repositories.
    #[arg(long, value_enum, default_value_t = ProviderKind::Github)]
    pub provider: ProviderKind,

    /// Access token with write access to the target repositories.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// API base URL (GitHub Enterprise).
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_url: Option<String>,
}

impl ProviderArgs {
    pub fn build(&self) -> Result<Box<dyn Provider>> {
        match self.provider {
            ProviderKind::Github => {
                let token = self
                    .token
                    .clone()
                    .filter(|t| !t.trim().is_empty())
                    .context("a GitHub token is required: pass --token or set GITHUB_TOKEN")?;
                Ok(Box::new(GitHubProvider::new(token, self.api_url.as_deref())))
            }
        }
    }
}
