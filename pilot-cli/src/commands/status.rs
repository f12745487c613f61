//! `git-pilot status`: what the state file says git-pilot owns.
//!
//! Reads the local state only; no remote call is made.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use pilot_sync::{StateStore, TrackedFile, DEFAULT_STATE_FILE};

/// Arguments for `git-pilot status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Local state file recording what git-pilot has written.
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let store = StateStore::load(&self.state_file).with_context(|| {
            format!("failed to load state from '{}'", self.state_file.display())
        })?;
        let rows: Vec<StatusRow> = store.tracked().map(StatusRow::from).collect();

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("failed to serialize status JSON")?
            );
            return Ok(());
        }

        print_table(&self.state_file, rows);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusRow {
    provider: String,
    repository: String,
    branch: String,
    template: String,
    path: String,
    sha: String,
    updated_at: DateTime<Utc>,
}

impl From<TrackedFile<'_>> for StatusRow {
    fn from(tracked: TrackedFile<'_>) -> Self {
        Self {
            provider: tracked.provider.to_string(),
            repository: tracked.repository.to_string(),
            branch: tracked.branch.to_string(),
            template: tracked.template_key.to_string(),
            path: tracked.entry.path.clone(),
            sha: tracked.entry.fingerprint.clone(),
            updated_at: tracked.entry.updated_at,
        }
    }
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "repository")]
    repository: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "template")]
    template: String,
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "sha")]
    sha: String,
    #[tabled(rename = "updated")]
    updated: String,
}

fn print_table(state_file: &std::path::Path, rows: Vec<StatusRow>) {
    let repos = rows
        .iter()
        .map(|r| (&r.provider, &r.repository))
        .collect::<std::collections::BTreeSet<_>>()
        .len();
    println!(
        "git-pilot v{} | {} | {} repositories | {} files",
        env!("CARGO_PKG_VERSION"),
        state_file.display(),
        repos,
        rows.len()
    );

    if rows.is_empty() {
        println!("No tracked files.");
        return;
    }

    let mut providers: Vec<&str> = rows.iter().map(|r| r.provider.as_str()).collect();
    providers.dedup();
    for provider in providers {
        println!("{}", provider.to_uppercase().bold());
        let table_rows: Vec<StatusTableRow> = rows
            .iter()
            .filter(|r| r.provider == provider)
            .map(|r| StatusTableRow {
                repository: r.repository.clone(),
                branch: r.branch.clone(),
                template: r.template.clone(),
                path: r.path.clone(),
                sha: r.sha.chars().take(12).collect(),
                updated: r.updated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            })
            .collect();
        let mut table = Table::new(table_rows);
        table.with(Style::rounded());
        println!("{table}");
    }
}
