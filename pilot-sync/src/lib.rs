//! # pilot-sync
//!
//! State-tracked reconciliation of rendered templates against remote
//! repositories.
//!
//! [`pipeline::run_sync`] plans from `values.yml` and the state store, asks a
//! [`DiffViewer`] for approval and applies the result through a
//! [`Provider`]. [`pipeline::run_drift`] compares live remote content with
//! the recorded state and can restore it.

pub mod comparator;
pub mod diff;
pub mod drift;
pub mod error;
pub mod fingerprint;
pub mod memory;
pub mod operation;
pub mod pipeline;
pub mod plan;
pub mod provider;
pub mod reconcile;
pub mod state;
pub mod viewer;

pub use comparator::is_same;
pub use drift::{DriftDetector, DriftEntry, DriftKind, DriftReport};
pub use error::{ProviderError, SyncError};
pub use fingerprint::fingerprint;
pub use memory::{MemoryProvider, ProviderCall};
pub use operation::{remote_path, ChangeKind, DiffTuple, OperationKind, PendingOperation};
pub use pipeline::{plan_only, run_drift, run_sync, DriftOutcome, SyncOutcome};
pub use plan::{Plan, PlanBuilder, SkipReason, SkippedEntry, UnchangedFile};
pub use provider::{Provider, RevisionRef};
pub use reconcile::{ApplyReport, OperationOutcome, OperationReport, Reconciler};
pub use state::{FileKey, StateEntry, StateStore, TrackedFile, DEFAULT_STATE_FILE};
pub use viewer::{AutoApprove, DiffViewer, Reject};
