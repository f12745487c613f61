//! `git-pilot sync`: render, plan, approve, apply.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use pilot_core::load_values;
use pilot_renderer::TemplateEngine;
use pilot_sync::{
    pipeline, AutoApprove, DiffViewer, StateStore, SyncOutcome, DEFAULT_STATE_FILE,
};

use crate::output;
use crate::provider::ProviderArgs;
use crate::viewer::TerminalDiffViewer;

/// Arguments for `git-pilot sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Directory holding the `*.j2` templates and `includes/`.
    #[arg(long)]
    pub template_dir: PathBuf,

    /// Path to values.yml.
    #[arg(long)]
    pub values: PathBuf,

    /// Local state file recording what git-pilot has written.
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Apply without asking for approval.
    #[arg(long)]
    pub non_interactive: bool,

    /// Print the planned changes as diffs; contact no remote and save nothing.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let values = load_values(&self.values)
            .with_context(|| format!("failed to load values from '{}'", self.values.display()))?;
        let templates = TemplateEngine::from_dir(&self.template_dir).with_context(|| {
            format!("failed to load templates from '{}'", self.template_dir.display())
        })?;
        let mut store = StateStore::load(&self.state_file).context("failed to load state")?;

        if self.dry_run {
            let plan = pipeline::plan_only(&values, &templates, self.provider.provider.id(), &mut store)
                .context("planning failed")?;
            output::print_skipped(&plan);
            if plan.is_empty() {
                println!("[dry-run] ✓ nothing to do ({} unchanged)", plan.unchanged.len());
                return Ok(());
            }
            output::print_diffs(&plan.diffs);
            println!(
                "[dry-run] {} change(s) planned, {} unchanged",
                plan.operations.len(),
                plan.unchanged.len()
            );
            return Ok(());
        }

        let provider = self.provider.build()?;
        let mut auto = AutoApprove;
        let mut terminal = TerminalDiffViewer::new(io::stdin().lock(), io::stdout());
        let viewer: &mut dyn DiffViewer = if self.non_interactive {
            &mut auto
        } else {
            &mut terminal
        };

        let outcome = pipeline::run_sync(&values, &templates, provider.as_ref(), viewer, &mut store)
            .context("sync failed")?;
        match outcome {
            SyncOutcome::NothingToDo(plan) => {
                output::print_skipped(&plan);
                println!("✓ nothing to do ({} unchanged)", plan.unchanged.len());
            }
            SyncOutcome::Aborted(plan) => {
                output::print_skipped(&plan);
                println!("Aborted: {} change(s) not applied", plan.operations.len());
            }
            SyncOutcome::Applied { plan, report } => {
                output::print_skipped(&plan);
                output::print_apply_report(&report, plan.unchanged.len());
                if report.has_failures() {
                    bail!("{} operation(s) failed", report.failed());
                }
            }
        }
        Ok(())
    }
}
