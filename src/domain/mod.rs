use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reporting convention used by a county's upstream source.
///
/// Fixed per county for the whole retained history of a batch; a county does
/// not switch conventions mid-stream. Assignment comes from configuration
/// (see `registry::ModeRegistry`), never from inspecting the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingMode {
    /// Running totals since tracking began.
    Cumulative,
    /// Only new counts for each date.
    Daily,
}

/// One of the two tracked count series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cases,
    Deaths,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::Cases, Metric::Deaths];
}

/// A single raw row as delivered by an upstream collector.
///
/// Both conventions' fields are physically present; only the pair matching
/// the county's reporting mode is semantically populated. Immutable once
/// ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawObservation {
    pub county: String,
    pub date: NaiveDate,
    pub cases_cumulative: Option<i64>,
    pub cases_daily: Option<i64>,
    pub deaths_cumulative: Option<i64>,
    pub deaths_daily: Option<i64>,
}

/// Working row flowing between pipeline stages.
///
/// Null values are legal until gap filling; the schema validator is the only
/// place a `CanonicalRecord` is constructed from one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalsRow {
    pub county: String,
    pub date: NaiveDate,
    pub cases_cumulative: Option<i64>,
    pub cases_daily: Option<i64>,
    pub deaths_cumulative: Option<i64>,
    pub deaths_daily: Option<i64>,
}

impl VitalsRow {
    pub fn new(county: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            county: county.into(),
            date,
            cases_cumulative: None,
            cases_daily: None,
            deaths_cumulative: None,
            deaths_daily: None,
        }
    }

    pub fn cumulative(&self, metric: Metric) -> Option<i64> {
        match metric {
            Metric::Cases => self.cases_cumulative,
            Metric::Deaths => self.deaths_cumulative,
        }
    }

    pub fn set_cumulative(&mut self, metric: Metric, value: Option<i64>) {
        match metric {
            Metric::Cases => self.cases_cumulative = value,
            Metric::Deaths => self.deaths_cumulative = value,
        }
    }

    pub fn daily(&self, metric: Metric) -> Option<i64> {
        match metric {
            Metric::Cases => self.cases_daily,
            Metric::Deaths => self.deaths_daily,
        }
    }

    pub fn set_daily(&mut self, metric: Metric, value: Option<i64>) {
        match metric {
            Metric::Cases => self.cases_daily = value,
            Metric::Deaths => self.deaths_daily = value,
        }
    }
}

/// The single reconciled, invariant-satisfying row for one (county, date).
///
/// Only the schema validator constructs these, after every check has passed,
/// so holding a `CanonicalRecord` is proof the output invariants hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub county: String,
    pub date: NaiveDate,
    pub cases_daily: i64,
    pub cases_cumulative: i64,
    pub deaths_daily: i64,
    pub deaths_cumulative: i64,
    pub source: String,
}

impl From<&CanonicalRecord> for VitalsRow {
    fn from(record: &CanonicalRecord) -> Self {
        Self {
            county: record.county.clone(),
            date: record.date,
            cases_cumulative: Some(record.cases_cumulative),
            cases_daily: Some(record.cases_daily),
            deaths_cumulative: Some(record.deaths_cumulative),
            deaths_daily: Some(record.deaths_daily),
        }
    }
}
