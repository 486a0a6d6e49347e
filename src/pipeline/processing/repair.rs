use crate::domain::{Metric, VitalsRow};

/// Counts of the repairs applied to the daily columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Negative daily values floored to zero.
    pub clipped: usize,
    /// Null daily values filled with zero.
    pub filled: usize,
}

/// Floor negative daily values at zero and fill remaining daily nulls with
/// zero.
///
/// A revision-driven negative delta is treated as "no change", not as a
/// negative count. Cumulative columns are untouched; the monotonic corrector
/// owns those.
pub fn repair_daily(rows: &mut [VitalsRow]) -> RepairStats {
    let mut stats = RepairStats::default();

    for row in rows.iter_mut() {
        for metric in Metric::ALL {
            match row.daily(metric) {
                Some(value) if value < 0 => {
                    row.set_daily(metric, Some(0));
                    stats.clipped += 1;
                }
                Some(_) => {}
                None => {
                    row.set_daily(metric, Some(0));
                    stats.filled += 1;
                }
            }
        }
    }

    stats
}
