//! Reconciliation engine for per-county disease-surveillance feeds.
//!
//! Upstream collectors report either running cumulative totals or
//! day-over-day increments, revise values retroactively, and emit literal
//! zeros for data they have not published yet. This crate normalizes those
//! heterogeneous feeds into one canonical time series per county and refuses
//! to publish a table that fails its own invariants.

pub mod common;
pub mod domain;
pub mod infra;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod registry;

pub use common::error::{Result, VitalsError};
pub use domain::{CanonicalRecord, RawObservation, ReportingMode};
pub use pipeline::{ReconcileOptions, ReconcileOutcome, Reconciler};
pub use registry::ModeRegistry;
