//! Approval gate between planning and applying.

use crate::operation::DiffTuple;

/// Shows a batch of changes and answers whether to apply all of them.
///
/// Approval is all-or-nothing; there is no per-file selection.
pub trait DiffViewer {
    fn show(&mut self, diffs: &[DiffTuple]) -> bool;
}

/// Approves every batch without showing anything (`--non-interactive`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

impl DiffViewer for AutoApprove {
    fn show(&mut self, diffs: &[DiffTuple]) -> bool {
        tracing::info!("auto-approving {} change(s)", diffs.len());
        true
    }
}

/// Rejects every batch. Useful to exercise the abort path.
#[derive(Debug, Default, Clone, Copy)]
pub struct Reject;

impl DiffViewer for Reject {
    fn show(&mut self, _diffs: &[DiffTuple]) -> bool {
        false
    }
}
