//! Pure, per-county transforms of the reconciliation engine.
//!
//! Every pass here is deterministic and owns its data; no county's result
//! depends on another county's rows, and ordering within a county is always
//! by date.

pub mod classify;
pub mod derive;
pub mod gap_fill;
pub mod monotonic;
pub mod repair;
pub mod validate;

use std::collections::BTreeMap;

use crate::domain::VitalsRow;

/// Split rows into independently owned per-county groups, each sorted by
/// date.
pub(crate) fn partition_by_county(rows: Vec<VitalsRow>) -> BTreeMap<String, Vec<VitalsRow>> {
    let mut groups: BTreeMap<String, Vec<VitalsRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.county.clone()).or_default().push(row);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|r| r.date);
    }
    groups
}

/// Half-open index ranges of the contiguous county runs in a table already
/// sorted by (county, date).
pub(crate) fn county_runs(rows: &[VitalsRow]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = 0;
    while start < rows.len() {
        let mut end = start + 1;
        while end < rows.len() && rows[end].county == rows[start].county {
            end += 1;
        }
        runs.push((start, end));
        start = end;
    }
    runs
}
