//! Terminal rendering of plans, diffs and apply reports.

use colored::Colorize;

use pilot_sync::diff::tuple_diff;
use pilot_sync::{ApplyReport, ChangeKind, DiffTuple, OperationOutcome, Plan, SkipReason};

/// Colour a unified diff line by line.
pub fn colorize_diff(diff: &str) -> String {
    let mut out = String::with_capacity(diff.len());
    for line in diff.lines() {
        let painted = if line.starts_with("+++") || line.starts_with("---") {
            line.bold().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with("@@") {
            line.cyan().to_string()
        } else {
            line.to_string()
        };
        out.push_str(&painted);
        out.push('\n');
    }
    out
}

pub fn change_label(kind: ChangeKind) -> String {
    let label = kind.label();
    match kind {
        ChangeKind::Create => label.green().bold().to_string(),
        ChangeKind::Update => label.yellow().bold().to_string(),
        ChangeKind::Delete => label.red().bold().to_string(),
        ChangeKind::Missing | ChangeKind::Modified => label.magenta().bold().to_string(),
    }
}

/// `owner/repo (branch)/path`
pub fn target(tuple: &DiffTuple) -> String {
    format!("{} ({})/{}", tuple.repository, tuple.branch, tuple.path)
}

/// Every tuple followed by its diff (`sync --dry-run`).
pub fn print_diffs(diffs: &[DiffTuple]) {
    for tuple in diffs {
        println!("[{}] {}", change_label(tuple.operation), target(tuple));
        if tuple.has_content() {
            print!("{}", colorize_diff(&tuple_diff(tuple)));
        }
    }
}

pub fn print_skipped(plan: &Plan) {
    for skipped in &plan.skipped {
        let branch = skipped.branch.as_deref().unwrap_or("?");
        match &skipped.reason {
            SkipReason::NoTemplates => println!(
                "{} {} ({branch}): no template matched",
                "!".yellow().bold(),
                skipped.repository
            ),
            SkipReason::Render { template, message } => println!(
                "{} {} ({branch}): {template} failed to render: {message}",
                "!".red().bold(),
                skipped.repository
            ),
        }
    }
}

pub fn print_apply_report(report: &ApplyReport, unchanged: usize) {
    for result in &report.results {
        let op = &result.operation;
        let where_ = format!("{} ({})/{}", op.repository, op.branch, op.path);
        match &result.outcome {
            OperationOutcome::Written { revision } => {
                println!("  {} {} {where_} @ {revision}", "✎".green(), op.kind)
            }
            OperationOutcome::Deleted => println!("  {} delete {where_}", "✗".green()),
            OperationOutcome::AlreadyAbsent => {
                println!("  {} delete {where_} (already absent)", "·".bright_black())
            }
            OperationOutcome::Failed(err) => {
                println!("  {} {} {where_}: {err}", "!".red().bold(), op.kind)
            }
        }
    }

    let failed = report.failed();
    let summary = format!(
        "{} applied, {} unchanged, {} failed",
        report.succeeded(),
        unchanged,
        failed
    );
    if failed > 0 {
        println!("{}", summary.red().bold());
    } else {
        println!("{} {summary}", "✓".green().bold());
    }
}
