//! Phase-organized metrics for the reconciliation pipeline.
//!
//! Each pipeline phase records through its own collection so ownership is
//! clear and names cannot collide. Naming convention:
//! `vitals_{phase}_{metric_name}{_total for counters}`.

use std::collections::HashMap;
use std::sync::Once;

use tracing::{info, warn};

static INIT: Once = Once::new();

/// Register every phase's metrics. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| {
        let mut all_metrics = HashMap::new();
        register_phase::<ClassifierMetrics>(&mut all_metrics);
        register_phase::<DeriveMetrics>(&mut all_metrics);
        register_phase::<CorrectorMetrics>(&mut all_metrics);
        register_phase::<GapFillMetrics>(&mut all_metrics);
        register_phase::<ValidatorMetrics>(&mut all_metrics);
        info!("Registered {} pipeline metrics", all_metrics.len());
    });
}

fn register_phase<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, MetricDoc>) {
    for doc in T::metrics_documentation() {
        if all_metrics.contains_key(doc.name) {
            warn!(
                "Metric name conflict: '{}' already registered before phase '{}'",
                doc.name,
                T::phase_name()
            );
            continue;
        }
        ::metrics::describe_counter!(doc.name, doc.help);
        all_metrics.insert(doc.name, doc);
    }
}

/// Trait for phase-specific metric collections.
pub trait PhaseMetrics {
    fn phase_name() -> &'static str;
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric.
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub help: &'static str,
}

/// Phase-scoped metric names: `vitals_{phase}_{name}_total` for counters.
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("vitals_", $phase, "_", $name, "_total")
    };
}

/// Sentinel & mode classifier metrics.
pub struct ClassifierMetrics;

impl ClassifierMetrics {
    pub fn record_partitioned(cumulative_rows: usize, daily_rows: usize, dropped_rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "classifier", "cumulative_rows"))
            .increment(cumulative_rows as u64);
        ::metrics::counter!(phase_metric!(counter, "classifier", "daily_rows"))
            .increment(daily_rows as u64);
        ::metrics::counter!(phase_metric!(counter, "classifier", "rows_dropped"))
            .increment(dropped_rows as u64);
    }
}

impl PhaseMetrics for ClassifierMetrics {
    fn phase_name() -> &'static str {
        "classifier"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "classifier", "cumulative_rows"),
                help: "Rows routed to the cumulative-reporting subset",
            },
            MetricDoc {
                name: phase_metric!(counter, "classifier", "daily_rows"),
                help: "Rows routed to the daily-reporting subset",
            },
            MetricDoc {
                name: phase_metric!(counter, "classifier", "rows_dropped"),
                help: "Rows dropped with a recorded reason",
            },
        ]
    }
}

/// Deriver and unioner metrics.
pub struct DeriveMetrics;

impl DeriveMetrics {
    pub fn record_combined(rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "derive", "rows_combined"))
            .increment(rows as u64);
    }

    pub fn record_daily_repairs(clipped: usize, filled: usize) {
        ::metrics::counter!(phase_metric!(counter, "derive", "daily_values_clipped"))
            .increment(clipped as u64);
        ::metrics::counter!(phase_metric!(counter, "derive", "daily_nulls_filled"))
            .increment(filled as u64);
    }
}

impl PhaseMetrics for DeriveMetrics {
    fn phase_name() -> &'static str {
        "derive"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "derive", "rows_combined"),
                help: "Rows in the unioned per-(county, date) table",
            },
            MetricDoc {
                name: phase_metric!(counter, "derive", "daily_values_clipped"),
                help: "Negative daily values floored to zero",
            },
            MetricDoc {
                name: phase_metric!(counter, "derive", "daily_nulls_filled"),
                help: "Null daily values filled with zero",
            },
        ]
    }
}

/// Monotonic corrector metrics.
pub struct CorrectorMetrics;

impl CorrectorMetrics {
    pub fn record_corrections(metric: crate::domain::Metric, corrections: usize) {
        match metric {
            crate::domain::Metric::Cases => {
                ::metrics::counter!(phase_metric!(counter, "corrector", "cases_corrections"))
                    .increment(corrections as u64);
            }
            crate::domain::Metric::Deaths => {
                ::metrics::counter!(phase_metric!(counter, "corrector", "deaths_corrections"))
                    .increment(corrections as u64);
            }
        }
    }
}

impl PhaseMetrics for CorrectorMetrics {
    fn phase_name() -> &'static str {
        "corrector"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "corrector", "cases_corrections"),
                help: "Backward revisions frozen in cases_cumulative",
            },
            MetricDoc {
                name: phase_metric!(counter, "corrector", "deaths_corrections"),
                help: "Backward revisions frozen in deaths_cumulative",
            },
        ]
    }
}

/// Gap filler metrics.
pub struct GapFillMetrics;

impl GapFillMetrics {
    pub fn record_fills(forward_filled: usize, zero_filled: usize) {
        ::metrics::counter!(phase_metric!(counter, "gap_fill", "forward_filled"))
            .increment(forward_filled as u64);
        ::metrics::counter!(phase_metric!(counter, "gap_fill", "zero_filled"))
            .increment(zero_filled as u64);
    }
}

impl PhaseMetrics for GapFillMetrics {
    fn phase_name() -> &'static str {
        "gap_fill"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "gap_fill", "forward_filled"),
                help: "Cumulative nulls forward-filled from the last known value",
            },
            MetricDoc {
                name: phase_metric!(counter, "gap_fill", "zero_filled"),
                help: "Leading cumulative nulls filled with zero",
            },
        ]
    }
}

/// Schema validator metrics.
pub struct ValidatorMetrics;

impl ValidatorMetrics {
    pub fn record_pass(rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "validator", "rows_published"))
            .increment(rows as u64);
    }

    pub fn record_failures(failures: usize) {
        ::metrics::counter!(phase_metric!(counter, "validator", "runs_rejected")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "validator", "failing_rows"))
            .increment(failures as u64);
    }
}

impl PhaseMetrics for ValidatorMetrics {
    fn phase_name() -> &'static str {
        "validator"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "validator", "rows_published"),
                help: "Canonical rows that passed every invariant",
            },
            MetricDoc {
                name: phase_metric!(counter, "validator", "runs_rejected"),
                help: "Runs rejected by the schema validator",
            },
            MetricDoc {
                name: phase_metric!(counter, "validator", "failing_rows"),
                help: "Individual invariant violations reported",
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names_follow_the_convention() {
        assert_eq!(
            phase_metric!(counter, "classifier", "rows_dropped"),
            "vitals_classifier_rows_dropped_total"
        );
    }

    #[test]
    fn no_phase_reuses_a_metric_name() {
        let mut names = std::collections::HashSet::new();
        let docs = ClassifierMetrics::metrics_documentation()
            .into_iter()
            .chain(DeriveMetrics::metrics_documentation())
            .chain(CorrectorMetrics::metrics_documentation())
            .chain(GapFillMetrics::metrics_documentation())
            .chain(ValidatorMetrics::metrics_documentation());
        for doc in docs {
            assert!(names.insert(doc.name), "duplicate metric name: {}", doc.name);
        }
    }
}
