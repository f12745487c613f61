//! `git-pilot drift-detect`: find remote files that no longer match state.

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use pilot_sync::{
    pipeline, AutoApprove, DiffViewer, DriftKind, DriftOutcome, DriftReport, StateStore,
    DEFAULT_STATE_FILE,
};

use crate::output;
use crate::provider::ProviderArgs;
use crate::viewer::TerminalDiffViewer;

/// Arguments for `git-pilot drift-detect`.
#[derive(Args, Debug)]
pub struct DriftArgs {
    #[command(flatten)]
    pub provider: ProviderArgs,

    /// Local state file recording what git-pilot has written.
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Restore drifted files to their recorded content.
    #[arg(long)]
    pub reconcile: bool,

    /// With --reconcile, apply without asking for approval.
    #[arg(long)]
    pub non_interactive: bool,
}

impl DriftArgs {
    pub fn run(self) -> Result<()> {
        let mut store = StateStore::load(&self.state_file).context("failed to load state")?;
        if store.is_empty() {
            println!("No tracked files in '{}'.", self.state_file.display());
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

        let outcome = pipeline::run_drift(provider.as_ref(), viewer, &mut store, self.reconcile)
            .context("drift detection failed")?;
        match outcome {
            DriftOutcome::Clean(report) => {
                println!("{} no drift in {} tracked file(s)", "✓".green().bold(), report.checked);
            }
            DriftOutcome::Detected(report) => {
                print_drift(&report);
                println!("Run with --reconcile to restore the recorded content.");
            }
            DriftOutcome::Aborted(report) => {
                print_drift(&report);
                println!("Aborted: drift left in place");
            }
            DriftOutcome::Reconciled { drift, report } => {
                print_drift(&drift);
                output::print_apply_report(&report, drift.checked - drift.drifted.len());
                if report.has_failures() {
                    bail!("{} operation(s) failed", report.failed());
                }
            }
        }
        Ok(())
    }
}

fn print_drift(report: &DriftReport) {
    println!(
        "{} drifted file(s) out of {} tracked",
        report.drifted.len().to_string().yellow().bold(),
        report.checked
    );
    for entry in &report.drifted {
        let label = match entry.kind {
            DriftKind::Missing => "missing",
            DriftKind::Modified => "modified",
        };
        let detail = match (&entry.read_error, entry.whitespace_only) {
            (Some(e), _) => format!(" (read failed: {e})"),
            (None, true) => " (whitespace only)".to_string(),
            (None, false) => String::new(),
        };
        println!(
            "  {} {} ({})/{}{detail}",
            label.magenta().bold(),
            entry.repository,
            entry.branch,
            entry.path
        );
    }
}
