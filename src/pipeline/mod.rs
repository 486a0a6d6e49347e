pub mod processing;
pub mod reconciler;

pub use reconciler::{ReconcileOptions, ReconcileOutcome, ReconcileSummary, Reconciler};
