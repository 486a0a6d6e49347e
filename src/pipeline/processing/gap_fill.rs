use crate::domain::{Metric, VitalsRow};

use super::county_runs;

/// Counts of the fills applied to the cumulative columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GapFillStats {
    /// Nulls replaced with the county's last known value.
    pub forward_filled: usize,
    /// Leading nulls (no prior value exists) replaced with zero.
    pub zero_filled: usize,
}

/// Forward-fill remaining cumulative nulls per county, zero-filling any
/// leading gap.
///
/// Rows must already be sorted by (county, date). After this pass no
/// cumulative cell is null.
pub fn fill_cumulative(rows: &mut [VitalsRow]) -> GapFillStats {
    let mut stats = GapFillStats::default();

    for (start, end) in county_runs(rows) {
        for metric in Metric::ALL {
            let mut last_known: Option<i64> = None;
            for row in rows[start..end].iter_mut() {
                match row.cumulative(metric) {
                    Some(value) => last_known = Some(value),
                    None => match last_known {
                        Some(value) => {
                            row.set_cumulative(metric, Some(value));
                            stats.forward_filled += 1;
                        }
                        None => {
                            row.set_cumulative(metric, Some(0));
                            stats.zero_filled += 1;
                        }
                    },
                }
            }
        }
    }

    stats
}
