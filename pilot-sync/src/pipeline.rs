//! Shared entrypoints used by the CLI: plan → approve → apply.

use pilot_core::Values;
use pilot_renderer::TemplateSource;

use crate::drift::{DriftDetector, DriftReport};
use crate::plan::{Plan, PlanBuilder};
use crate::provider::Provider;
use crate::reconcile::{ApplyReport, Reconciler};
use crate::state::StateStore;
use crate::viewer::DiffViewer;
use crate::SyncError;

/// How a sync run ended.
#[derive(Debug)]
pub enum SyncOutcome {
    /// Every selected template was already up to date. Nothing was saved.
    NothingToDo(Plan),
    /// The viewer rejected the plan. Nothing was written or saved.
    Aborted(Plan),
    Applied { plan: Plan, report: ApplyReport },
}

/// How a drift run ended.
#[derive(Debug)]
pub enum DriftOutcome {
    Clean(DriftReport),
    /// Drift found and reported only.
    Detected(DriftReport),
    /// Drift found, reconcile requested, viewer rejected it.
    Aborted(DriftReport),
    Reconciled {
        drift: DriftReport,
        report: ApplyReport,
    },
}

/// Build the plan without touching the remote or the state file.
pub fn plan_only(
    values: &Values,
    templates: &dyn TemplateSource,
    provider_id: &str,
    store: &mut StateStore,
) -> Result<Plan, SyncError> {
    PlanBuilder::new(templates, provider_id).build(values, store)
}

/// Full sync: plan, ask `viewer`, apply, save.
pub fn run_sync(
    values: &Values,
    templates: &dyn TemplateSource,
    provider: &dyn Provider,
    viewer: &mut dyn DiffViewer,
    store: &mut StateStore,
) -> Result<SyncOutcome, SyncError> {
    let plan = plan_only(values, templates, provider.id(), store)?;
    if plan.is_empty() {
        tracing::info!("nothing to do");
        return Ok(SyncOutcome::NothingToDo(plan));
    }
    if !viewer.show(&plan.diffs) {
        tracing::info!("plan rejected, no changes applied");
        return Ok(SyncOutcome::Aborted(plan));
    }
    let report = Reconciler::new(provider).apply(&plan.operations, store)?;
    Ok(SyncOutcome::Applied { plan, report })
}

/// Detect drift; with `reconcile`, restore drifted files after approval.
pub fn run_drift(
    provider: &dyn Provider,
    viewer: &mut dyn DiffViewer,
    store: &mut StateStore,
    reconcile: bool,
) -> Result<DriftOutcome, SyncError> {
    let drift = DriftDetector::new(provider).detect(store);
    if drift.is_clean() {
        return Ok(DriftOutcome::Clean(drift));
    }
    if !reconcile {
        return Ok(DriftOutcome::Detected(drift));
    }
    if !viewer.show(&drift.diffs()) {
        return Ok(DriftOutcome::Aborted(drift));
    }
    let operations = drift.reconcile_operations(provider.id());
    let report = Reconciler::new(provider).apply(&operations, store)?;
    Ok(DriftOutcome::Reconciled { drift, report })
}
