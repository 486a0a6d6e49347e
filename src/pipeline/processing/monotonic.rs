use crate::domain::{Metric, VitalsRow};

use super::county_runs;

/// Repair single-step backward revisions in one cumulative sequence.
///
/// For an ordered sequence `v`, the diff and the predecessor at each position
/// are computed once, from the unmodified input; a position whose diff is
/// negative is frozen at its original predecessor. A repair therefore never
/// cascades into the next position's diff.
///
/// Known limitation, kept deliberately: because each position is judged
/// against the pre-correction predecessor, two or more consecutive
/// decreases leave the output non-monotonic;
/// `[10, 15, 12, 11, 20]` corrects to `[10, 15, 15, 12, 20]`. The schema
/// validator downstream rejects such a table rather than publishing it.
pub fn correct(values: &[Option<i64>]) -> Vec<Option<i64>> {
    let mut corrected = Vec::with_capacity(values.len());

    for (i, &value) in values.iter().enumerate() {
        let prev = if i == 0 { None } else { values[i - 1] };
        let diff = match (value, prev) {
            (Some(current), Some(previous)) => Some(current - previous),
            _ => None,
        };
        match diff {
            Some(d) if d < 0 => corrected.push(prev),
            _ => corrected.push(value),
        }
    }

    corrected
}

/// Apply `correct` to one cumulative column, county by county.
///
/// Rows must already be sorted by (county, date); county groups are
/// contiguous runs. Returns how many positions were replaced.
pub fn correct_column(rows: &mut [VitalsRow], metric: Metric) -> usize {
    let mut corrections = 0;

    for (start, end) in county_runs(rows) {
        let original: Vec<Option<i64>> =
            rows[start..end].iter().map(|r| r.cumulative(metric)).collect();
        let corrected = correct(&original);

        for (row, (before, after)) in rows[start..end]
            .iter_mut()
            .zip(original.iter().zip(corrected.iter()))
        {
            if before != after {
                corrections += 1;
            }
            row.set_cumulative(metric, *after);
        }
    }

    corrections
}
