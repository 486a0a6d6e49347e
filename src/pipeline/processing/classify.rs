use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::common::error::Result;
use crate::domain::{RawObservation, ReportingMode, VitalsRow};
use crate::registry::ModeRegistry;

/// Why a raw row was dropped before derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Both the cumulative and the daily pair carry values; the row's
    /// convention is undecidable.
    AmbiguousBothConventions,
    /// After sentinel scrubbing, no field matching the county's mode carries
    /// a value.
    NoPopulatedValues,
    /// County is registered but switched off.
    CountyDisabled,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DropReason::AmbiguousBothConventions => "ambiguous_both_conventions",
            DropReason::NoPopulatedValues => "no_populated_values",
            DropReason::CountyDisabled => "county_disabled",
        };
        write!(f, "{}", name)
    }
}

/// A raw row excluded from the batch, with the reason recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroppedRow {
    pub county: String,
    pub date: NaiveDate,
    pub reason: DropReason,
}

/// Output of the sentinel & mode classifier.
#[derive(Debug, Default)]
pub struct ClassifiedBatch {
    /// Rows from counties that report running totals.
    pub cumulative: Vec<VitalsRow>,
    /// Rows from counties that report day-over-day increments.
    pub daily: Vec<VitalsRow>,
    /// Rows excluded from processing, each with a recorded reason.
    pub dropped: Vec<DroppedRow>,
}

/// A literal zero in a cumulative field is indistinguishable from "not yet
/// reported": upstream dashboards emit 0 rather than omit the field.
fn scrub_sentinel(value: Option<i64>) -> Option<i64> {
    match value {
        Some(0) => None,
        other => other,
    }
}

/// Partition raw observations into cumulative- and daily-reporting subsets.
///
/// Sentinel zeros in cumulative fields are nulled before anything else.
/// Rows whose convention is undecidable, or which carry no value for their
/// county's convention, are dropped with a recorded reason; the rest of the
/// batch proceeds. A county missing from the registry fails the whole batch
/// before any transform runs.
pub fn classify(observations: &[RawObservation], registry: &ModeRegistry) -> Result<ClassifiedBatch> {
    // Fail fast on unregistered counties, before touching any row.
    let counties: BTreeSet<&str> = observations.iter().map(|o| o.county.as_str()).collect();
    for county in &counties {
        registry.require_mode(county)?;
    }

    let mut batch = ClassifiedBatch::default();

    for obs in observations {
        let cases_cumulative = scrub_sentinel(obs.cases_cumulative);
        let deaths_cumulative = scrub_sentinel(obs.deaths_cumulative);

        if !registry.is_enabled(&obs.county) {
            batch.dropped.push(DroppedRow {
                county: obs.county.clone(),
                date: obs.date,
                reason: DropReason::CountyDisabled,
            });
            continue;
        }

        let mode = registry.require_mode(&obs.county)?;
        let has_cumulative = cases_cumulative.is_some() || deaths_cumulative.is_some();
        let has_daily = obs.cases_daily.is_some() || obs.deaths_daily.is_some();

        if has_cumulative && has_daily {
            debug!(
                county = %obs.county,
                date = %obs.date,
                "row populates both conventions, dropping"
            );
            batch.dropped.push(DroppedRow {
                county: obs.county.clone(),
                date: obs.date,
                reason: DropReason::AmbiguousBothConventions,
            });
            continue;
        }

        let populated = match mode {
            ReportingMode::Cumulative => has_cumulative,
            ReportingMode::Daily => has_daily,
        };
        if !populated {
            batch.dropped.push(DroppedRow {
                county: obs.county.clone(),
                date: obs.date,
                reason: DropReason::NoPopulatedValues,
            });
            continue;
        }

        let mut row = VitalsRow::new(obs.county.clone(), obs.date);
        match mode {
            ReportingMode::Cumulative => {
                row.cases_cumulative = cases_cumulative;
                row.deaths_cumulative = deaths_cumulative;
                batch.cumulative.push(row);
            }
            ReportingMode::Daily => {
                row.cases_daily = obs.cases_daily;
                row.deaths_daily = obs.deaths_daily;
                batch.daily.push(row);
            }
        }
    }

    Ok(batch)
}
