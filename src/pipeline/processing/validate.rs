use std::collections::HashSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{CanonicalRecord, Metric, VitalsRow};

use super::county_runs;

/// A numeric column of the canonical table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    CasesDaily,
    CasesCumulative,
    DeathsDaily,
    DeathsCumulative,
}

impl Column {
    fn cumulative(metric: Metric) -> Self {
        match metric {
            Metric::Cases => Column::CasesCumulative,
            Metric::Deaths => Column::DeathsCumulative,
        }
    }

    fn daily(metric: Metric) -> Self {
        match metric {
            Metric::Cases => Column::CasesDaily,
            Metric::Deaths => Column::DeathsDaily,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Column::CasesDaily => "cases_daily",
            Column::CasesCumulative => "cases_cumulative",
            Column::DeathsDaily => "deaths_daily",
            Column::DeathsCumulative => "deaths_cumulative",
        };
        write!(f, "{}", name)
    }
}

/// The invariant a failing row violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    DuplicateKey,
    NonMonotonic,
    NegativeValue,
    NullValue,
}

/// One failing row of the finished table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFailure {
    pub county: String,
    pub date: NaiveDate,
    /// Absent for key-level violations, which concern the whole row.
    pub column: Option<Column>,
    pub value: Option<i64>,
    pub rule: Rule,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: ", self.county, self.date)?;
        match (self.rule, self.column, self.value) {
            (Rule::DuplicateKey, _, _) => write!(f, "duplicate (county, date) key"),
            (Rule::NonMonotonic, Some(column), Some(value)) => {
                write!(f, "{} decreases to {}", column, value)
            }
            (Rule::NegativeValue, Some(column), Some(value)) => {
                write!(f, "{} is negative ({})", column, value)
            }
            (Rule::NullValue, Some(column), _) => write!(f, "{} is null", column),
            // Column/value are always populated for cell-level rules; this
            // arm only renders if a report was built by hand.
            (rule, _, _) => write!(f, "{:?}", rule),
        }
    }
}

/// Every failing row of a rejected table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub failures: Vec<ValidationFailure>,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn push(
        &mut self,
        row: &VitalsRow,
        rule: Rule,
        column: Option<Column>,
        value: Option<i64>,
    ) {
        self.failures.push(ValidationFailure {
            county: row.county.clone(),
            date: row.date,
            column,
            value,
            rule,
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for failure in &self.failures {
            writeln!(f, "{}", failure)?;
        }
        Ok(())
    }
}

/// Enforce the output invariants on the finished table.
///
/// Checks (county, date) uniqueness, per-county monotonicity of both
/// cumulative columns, non-negativity of all four numeric columns, and the
/// absence of nulls. Every failing row is reported; any failure rejects the
/// whole table; there is no auto-repair here. On success the canonical
/// records are built with `source` stamped on, sorted by (county, date).
pub fn validate(
    rows: &[VitalsRow],
    source: &str,
) -> std::result::Result<Vec<CanonicalRecord>, ValidationReport> {
    let mut sorted: Vec<VitalsRow> = rows.to_vec();
    sorted.sort_by(|a, b| a.county.cmp(&b.county).then(a.date.cmp(&b.date)));

    let mut report = ValidationReport::default();

    // (a) key uniqueness
    let mut seen: HashSet<(&str, NaiveDate)> = HashSet::with_capacity(sorted.len());
    for row in &sorted {
        if !seen.insert((row.county.as_str(), row.date)) {
            report.push(row, Rule::DuplicateKey, None, None);
        }
    }

    // (b) cumulative columns non-decreasing per county
    for (start, end) in county_runs(&sorted) {
        for metric in Metric::ALL {
            let mut previous: Option<i64> = None;
            for row in &sorted[start..end] {
                if let (Some(current), Some(prior)) = (row.cumulative(metric), previous) {
                    if current < prior {
                        report.push(
                            row,
                            Rule::NonMonotonic,
                            Some(Column::cumulative(metric)),
                            Some(current),
                        );
                    }
                }
                if row.cumulative(metric).is_some() {
                    previous = row.cumulative(metric);
                }
            }
        }
    }

    // (c) non-negativity, (d) no nulls, and canonical construction, so a
    // record is only ever built from four present cells
    let mut records = Vec::with_capacity(sorted.len());
    for row in &sorted {
        for metric in Metric::ALL {
            for (column, cell) in [
                (Column::daily(metric), row.daily(metric)),
                (Column::cumulative(metric), row.cumulative(metric)),
            ] {
                match cell {
                    Some(value) if value < 0 => {
                        report.push(row, Rule::NegativeValue, Some(column), Some(value));
                    }
                    Some(_) => {}
                    None => report.push(row, Rule::NullValue, Some(column), None),
                }
            }
        }

        if let (Some(cases_daily), Some(cases_cumulative), Some(deaths_daily), Some(deaths_cumulative)) = (
            row.cases_daily,
            row.cases_cumulative,
            row.deaths_daily,
            row.deaths_cumulative,
        ) {
            records.push(CanonicalRecord {
                county: row.county.clone(),
                date: row.date,
                cases_daily,
                cases_cumulative,
                deaths_daily,
                deaths_cumulative,
                source: source.to_string(),
            });
        }
    }

    if report.is_clean() {
        Ok(records)
    } else {
        Err(report)
    }
}

/// Re-check an already-canonical table, as published tables are re-validated
/// before downstream consumers trust them. Null checks pass by construction.
pub fn validate_records(records: &[CanonicalRecord]) -> ValidationReport {
    let rows: Vec<VitalsRow> = records.iter().map(VitalsRow::from).collect();
    match validate(&rows, "") {
        Ok(_) => ValidationReport::default(),
        Err(report) => report,
    }
}
