use crate::domain::{Metric, VitalsRow};

use super::partition_by_county;

/// Derive daily deltas for counties that report running totals.
///
/// Per county, in date order, the daily value is the difference between the
/// current and the immediately prior cumulative value; the difference is
/// undefined (null) when either side is missing. The first observation has no
/// predecessor, so for the leading run of still-null daily values the row's
/// own cumulative value is substituted: the engine assumes the true series
/// started at zero immediately before the first retained observation. The
/// substitution reads only the pre-substitution daily column, so a
/// substituted value never ends the leading run by itself.
pub fn derive_from_cumulative(rows: Vec<VitalsRow>) -> Vec<VitalsRow> {
    let mut output = Vec::with_capacity(rows.len());

    for (_, mut group) in partition_by_county(rows) {
        for metric in Metric::ALL {
            let cumulative: Vec<Option<i64>> = group.iter().map(|r| r.cumulative(metric)).collect();

            let mut seen_derived = false;
            for (i, row) in group.iter_mut().enumerate() {
                let prev = if i == 0 { None } else { cumulative[i - 1] };
                let derived = match (cumulative[i], prev) {
                    (Some(current), Some(previous)) => Some(current - previous),
                    _ => None,
                };
                row.set_daily(metric, derived);

                if derived.is_some() {
                    seen_derived = true;
                }
                if !seen_derived {
                    row.set_daily(metric, row.cumulative(metric));
                }
            }
        }
        output.append(&mut group);
    }

    output
}

/// Derive running totals for counties that report day-over-day increments.
///
/// A county whose retained history never populates a daily column gets zero
/// substituted for the whole column (a fully-absent metric is "zero
/// reported", not "unknown"); otherwise nulls survive this stage and are
/// resolved by repair and gap fill. The running sum continues past a null
/// daily value but yields a null cumulative at that position. Assumes the
/// retained history is complete from the county's true zero point.
pub fn derive_from_daily(rows: Vec<VitalsRow>) -> Vec<VitalsRow> {
    let mut output = Vec::with_capacity(rows.len());

    for (_, mut group) in partition_by_county(rows) {
        for metric in Metric::ALL {
            if group.iter().all(|r| r.daily(metric).is_none()) {
                for row in group.iter_mut() {
                    row.set_daily(metric, Some(0));
                }
            }

            let mut running_total = 0i64;
            for row in group.iter_mut() {
                match row.daily(metric) {
                    Some(value) => {
                        running_total += value;
                        row.set_cumulative(metric, Some(running_total));
                    }
                    None => row.set_cumulative(metric, None),
                }
            }
        }
        output.append(&mut group);
    }

    output
}

/// Union the two derived subsets into one table sorted by (county, date).
///
/// A county lives in exactly one subset (its mode is fixed for the batch),
/// so the union introduces no key collisions of its own.
pub fn combine(cumulative: Vec<VitalsRow>, daily: Vec<VitalsRow>) -> Vec<VitalsRow> {
    let mut combined = cumulative;
    combined.extend(daily);
    combined.sort_by(|a, b| a.county.cmp(&b.county).then(a.date.cmp(&b.date)));
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
    }

    fn cumulative_row(county: &str, d: u32, cases: Option<i64>) -> VitalsRow {
        let mut row = VitalsRow::new(county, day(d));
        row.cases_cumulative = cases;
        row
    }

    fn daily_row(county: &str, d: u32, cases: Option<i64>) -> VitalsRow {
        let mut row = VitalsRow::new(county, day(d));
        row.cases_daily = cases;
        row
    }

    #[test]
    fn first_row_daily_equals_its_own_cumulative() {
        let rows = vec![
            cumulative_row("Harris", 1, Some(100)),
            cumulative_row("Harris", 2, Some(140)),
        ];

        let derived = derive_from_cumulative(rows);
        let daily: Vec<Option<i64>> = derived.iter().map(|r| r.cases_daily).collect();
        assert_eq!(daily, vec![Some(100), Some(40)]);
    }

    #[test]
    fn leading_null_run_substitutes_cumulative_values() {
        // Diffs stay undefined until two consecutive values exist, so every
        // leading row takes its own cumulative value, null included.
        let rows = vec![
            cumulative_row("Harris", 1, Some(5)),
            cumulative_row("Harris", 2, None),
            cumulative_row("Harris", 3, Some(8)),
            cumulative_row("Harris", 4, Some(10)),
        ];

        let derived = derive_from_cumulative(rows);
        let daily: Vec<Option<i64>> = derived.iter().map(|r| r.cases_daily).collect();
        assert_eq!(daily, vec![Some(5), None, Some(8), Some(2)]);
    }

    #[test]
    fn substituted_values_do_not_end_the_leading_run() {
        let rows = vec![
            cumulative_row("Harris", 1, Some(5)),
            cumulative_row("Harris", 2, None),
            cumulative_row("Harris", 3, None),
        ];

        let derived = derive_from_cumulative(rows);
        let daily: Vec<Option<i64>> = derived.iter().map(|r| r.cases_daily).collect();
        assert_eq!(daily, vec![Some(5), None, None]);
    }

    #[test]
    fn out_of_order_input_is_sorted_by_date_before_derivation() {
        let rows = vec![
            cumulative_row("Harris", 2, Some(140)),
            cumulative_row("Harris", 1, Some(100)),
        ];

        let derived = derive_from_cumulative(rows);
        assert_eq!(derived[0].date, day(1));
        assert_eq!(derived[0].cases_daily, Some(100));
        assert_eq!(derived[1].cases_daily, Some(40));
    }

    #[test]
    fn backward_revision_produces_negative_delta_here() {
        // Negative deltas are repaired later; derivation reports them as-is.
        let rows = vec![
            cumulative_row("Harris", 1, Some(15)),
            cumulative_row("Harris", 2, Some(12)),
        ];

        let derived = derive_from_cumulative(rows);
        assert_eq!(derived[1].cases_daily, Some(-3));
    }

    #[test]
    fn daily_running_sum_skips_but_marks_nulls() {
        let rows = vec![
            daily_row("Denton", 1, Some(1)),
            daily_row("Denton", 2, None),
            daily_row("Denton", 3, Some(2)),
        ];

        let derived = derive_from_daily(rows);
        let cumulative: Vec<Option<i64>> = derived.iter().map(|r| r.cases_cumulative).collect();
        assert_eq!(cumulative, vec![Some(1), None, Some(3)]);
    }

    #[test]
    fn fully_absent_metric_is_zero_reported() {
        let mut rows = vec![
            daily_row("Denton", 1, Some(4)),
            daily_row("Denton", 2, Some(1)),
        ];
        // deaths never populated anywhere for the county
        for row in &mut rows {
            assert_eq!(row.deaths_daily, None);
        }

        let derived = derive_from_daily(rows);
        for row in &derived {
            assert_eq!(row.deaths_daily, Some(0));
            assert_eq!(row.deaths_cumulative, Some(0));
        }
        assert_eq!(derived[1].cases_cumulative, Some(5));
    }

    #[test]
    fn combine_sorts_by_county_then_date() {
        let cumulative = vec![cumulative_row("Harris", 1, Some(10))];
        let daily = vec![daily_row("Denton", 2, Some(1)), daily_row("Denton", 1, Some(2))];

        let combined = combine(cumulative, daily);
        let keys: Vec<(&str, NaiveDate)> = combined
            .iter()
            .map(|r| (r.county.as_str(), r.date))
            .collect();
        assert_eq!(
            keys,
            vec![("Denton", day(1)), ("Denton", day(2)), ("Harris", day(1))]
        );
    }

    #[test]
    fn counties_derive_independently() {
        let rows = vec![
            cumulative_row("Harris", 1, Some(100)),
            cumulative_row("Bexar", 1, Some(7)),
            cumulative_row("Harris", 2, Some(110)),
        ];

        let derived = derive_from_cumulative(rows);
        let bexar: Vec<&VitalsRow> = derived.iter().filter(|r| r.county == "Bexar").collect();
        assert_eq!(bexar[0].cases_daily, Some(7));
    }
}
