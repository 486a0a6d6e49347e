use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::common::constants::DASHBOARD_SOURCE;
use crate::common::error::{Result, VitalsError};
use crate::domain::{CanonicalRecord, Metric, RawObservation};
use crate::observability::metrics::{
    ClassifierMetrics, CorrectorMetrics, DeriveMetrics, GapFillMetrics, ValidatorMetrics,
};
use crate::pipeline::processing::classify::{classify, DroppedRow};
use crate::pipeline::processing::derive::{combine, derive_from_cumulative, derive_from_daily};
use crate::pipeline::processing::gap_fill::fill_cumulative;
use crate::pipeline::processing::monotonic::correct_column;
use crate::pipeline::processing::repair::repair_daily;
use crate::pipeline::processing::validate::validate;
use crate::registry::ModeRegistry;

/// Knobs for one reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Label stamped into the `source` column of every canonical row.
    pub source_label: String,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            source_label: DASHBOARD_SOURCE.to_string(),
        }
    }
}

/// What one run did, for logs, reports and operators.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub input_rows: usize,
    pub cumulative_rows: usize,
    pub daily_rows: usize,
    pub dropped: Vec<DroppedRow>,
    pub daily_values_clipped: usize,
    pub daily_nulls_filled: usize,
    pub cases_corrections: usize,
    pub deaths_corrections: usize,
    pub cumulative_forward_filled: usize,
    pub cumulative_zero_filled: usize,
    pub output_rows: usize,
}

impl ReconcileSummary {
    /// Dropped-row counts keyed by reason, for compact reporting.
    pub fn drop_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for dropped in &self.dropped {
            *counts.entry(dropped.reason.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// A successful run: the canonical table plus the run's summary.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub records: Vec<CanonicalRecord>,
    pub summary: ReconcileSummary,
}

/// Sequences the reconciliation components over one batch of raw
/// observations.
///
/// The run is a pure function of its inputs: the same observations and
/// registry always produce the same canonical table. Each run supersedes the
/// previous output wholesale; nothing is mutated in place. Validation
/// failure is terminal for the run: an invalid canonical series is worse
/// than a withheld update.
#[derive(Debug, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ReconcileOptions) -> Self {
        Self { options }
    }

    pub fn reconcile(
        &self,
        observations: &[RawObservation],
        registry: &ModeRegistry,
    ) -> Result<ReconcileOutcome> {
        if observations.is_empty() {
            return Err(VitalsError::EmptyBatch);
        }

        info!("🔄 Reconciling {} raw observations", observations.len());
        let mut summary = ReconcileSummary {
            input_rows: observations.len(),
            ..Default::default()
        };

        // 1. Sentinel & mode classification
        let batch = classify(observations, registry)?;
        summary.cumulative_rows = batch.cumulative.len();
        summary.daily_rows = batch.daily.len();
        summary.dropped = batch.dropped;
        ClassifierMetrics::record_partitioned(
            summary.cumulative_rows,
            summary.daily_rows,
            summary.dropped.len(),
        );
        info!(
            "📊 Classified {} cumulative rows, {} daily rows ({} dropped)",
            summary.cumulative_rows,
            summary.daily_rows,
            summary.dropped.len()
        );
        for (reason, count) in summary.drop_counts() {
            debug!("   dropped {}: {}", reason, count);
        }

        // 2–4. Derivation and union
        let cumulative = derive_from_cumulative(batch.cumulative);
        let daily = derive_from_daily(batch.daily);
        let mut table = combine(cumulative, daily);
        DeriveMetrics::record_combined(table.len());
        info!("🔗 Combined table has {} rows", table.len());

        // 5. Range & null repair on the daily columns
        let repair_stats = repair_daily(&mut table);
        summary.daily_values_clipped = repair_stats.clipped;
        summary.daily_nulls_filled = repair_stats.filled;
        DeriveMetrics::record_daily_repairs(repair_stats.clipped, repair_stats.filled);

        // 6. Monotonic correction, cases then deaths
        summary.cases_corrections = correct_column(&mut table, Metric::Cases);
        summary.deaths_corrections = correct_column(&mut table, Metric::Deaths);
        CorrectorMetrics::record_corrections(Metric::Cases, summary.cases_corrections);
        CorrectorMetrics::record_corrections(Metric::Deaths, summary.deaths_corrections);
        info!(
            "🩹 Froze {} cases and {} deaths backward revisions",
            summary.cases_corrections, summary.deaths_corrections
        );

        // 7. Gap filling
        let fill_stats = fill_cumulative(&mut table);
        summary.cumulative_forward_filled = fill_stats.forward_filled;
        summary.cumulative_zero_filled = fill_stats.zero_filled;
        GapFillMetrics::record_fills(fill_stats.forward_filled, fill_stats.zero_filled);

        // 8. Schema validation, fail closed; nothing partial is published
        match validate(&table, &self.options.source_label) {
            Ok(records) => {
                summary.output_rows = records.len();
                ValidatorMetrics::record_pass(records.len());
                info!("✅ Published {} canonical rows", records.len());
                Ok(ReconcileOutcome { records, summary })
            }
            Err(report) => {
                ValidatorMetrics::record_failures(report.failures.len());
                error!(
                    "❌ Validation rejected the run with {} failing row(s)",
                    report.failures.len()
                );
                Err(VitalsError::Validation { report })
            }
        }
    }
}
