use std::collections::HashSet;

use chrono::NaiveDate;
use vitals_reconciler::pipeline::Reconciler;
use vitals_reconciler::{ModeRegistry, RawObservation, ReportingMode, VitalsError};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, d).unwrap()
}

fn cumulative_obs(county: &str, d: u32, cases: Option<i64>, deaths: Option<i64>) -> RawObservation {
    RawObservation {
        county: county.to_string(),
        date: day(d),
        cases_cumulative: cases,
        cases_daily: None,
        deaths_cumulative: deaths,
        deaths_daily: None,
    }
}

fn daily_obs(county: &str, d: u32, cases: Option<i64>, deaths: Option<i64>) -> RawObservation {
    RawObservation {
        county: county.to_string(),
        date: day(d),
        cases_cumulative: None,
        cases_daily: cases,
        deaths_cumulative: None,
        deaths_daily: deaths,
    }
}

fn registry() -> ModeRegistry {
    ModeRegistry::from_modes([
        ("Harris", ReportingMode::Cumulative),
        ("Bexar", ReportingMode::Cumulative),
        ("Denton", ReportingMode::Daily),
    ])
}

#[test]
fn mixed_batch_reconciles_to_invariant_satisfying_table() {
    let observations = vec![
        // Cumulative county with a backward revision on day 3 and a sentinel
        // zero on day 4, recovering by day 5.
        cumulative_obs("Harris", 1, Some(100), Some(2)),
        cumulative_obs("Harris", 2, Some(140), Some(2)),
        cumulative_obs("Harris", 3, Some(130), Some(3)),
        cumulative_obs("Harris", 4, Some(0), Some(3)),
        cumulative_obs("Harris", 5, Some(150), Some(4)),
        // Daily county with a missing deaths column throughout.
        daily_obs("Denton", 1, Some(3), None),
        daily_obs("Denton", 2, Some(0), None),
        daily_obs("Denton", 3, Some(7), None),
    ];

    let outcome = Reconciler::new().reconcile(&observations, &registry()).unwrap();
    let records = outcome.records;

    // Key uniqueness
    let mut keys = HashSet::new();
    for record in &records {
        assert!(keys.insert((record.county.clone(), record.date)));
    }

    // Non-negativity
    for record in &records {
        assert!(record.cases_daily >= 0);
        assert!(record.cases_cumulative >= 0);
        assert!(record.deaths_daily >= 0);
        assert!(record.deaths_cumulative >= 0);
    }

    // Per-county monotonicity of the cumulative columns
    for county in ["Harris", "Denton"] {
        let series: Vec<&_> = records.iter().filter(|r| r.county == county).collect();
        for pair in series.windows(2) {
            assert!(pair[1].cases_cumulative >= pair[0].cases_cumulative);
            assert!(pair[1].deaths_cumulative >= pair[0].deaths_cumulative);
        }
    }

    // The day-3 revision (140 -> 130) was frozen at 140, the sentinel zero
    // on day 4 was treated as missing and forward-filled from the corrected
    // value, and day 5 was kept verbatim.
    let harris: Vec<&_> = records.iter().filter(|r| r.county == "Harris").collect();
    let cases: Vec<i64> = harris.iter().map(|r| r.cases_cumulative).collect();
    assert_eq!(cases, vec![100, 140, 140, 140, 150]);

    // Denton's fully-absent deaths metric reads as "zero reported".
    let denton: Vec<&_> = records.iter().filter(|r| r.county == "Denton").collect();
    assert!(denton.iter().all(|r| r.deaths_daily == 0 && r.deaths_cumulative == 0));
    let denton_cases: Vec<i64> = denton.iter().map(|r| r.cases_cumulative).collect();
    assert_eq!(denton_cases, vec![3, 3, 10]);

    assert_eq!(outcome.summary.output_rows, records.len());
}

#[test]
fn first_retained_observation_defines_its_own_daily_value() {
    let observations = vec![
        cumulative_obs("Harris", 1, Some(100), Some(1)),
        cumulative_obs("Harris", 2, Some(140), Some(1)),
    ];

    let outcome = Reconciler::new().reconcile(&observations, &registry()).unwrap();
    let daily: Vec<i64> = outcome.records.iter().map(|r| r.cases_daily).collect();
    assert_eq!(daily, vec![100, 40]);
}

#[test]
fn consecutive_backward_revisions_fail_the_run_closed() {
    // The corrector repairs each drop against the pre-correction
    // predecessor, so the double revision leaves a residual decrease and the
    // validator rejects the table instead of publishing it.
    let observations = vec![
        cumulative_obs("Harris", 1, Some(10), Some(1)),
        cumulative_obs("Harris", 2, Some(15), Some(1)),
        cumulative_obs("Harris", 3, Some(12), Some(1)),
        cumulative_obs("Harris", 4, Some(11), Some(1)),
        cumulative_obs("Harris", 5, Some(20), Some(1)),
    ];

    let err = Reconciler::new().reconcile(&observations, &registry()).unwrap_err();
    match err {
        VitalsError::Validation { report } => {
            assert!(!report.is_clean());
            let failure = &report.failures[0];
            assert_eq!(failure.county, "Harris");
            assert_eq!(failure.date, day(4));
            assert_eq!(failure.value, Some(12));
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn ambiguous_rows_drop_while_the_batch_proceeds() {
    let mut ambiguous = cumulative_obs("Harris", 2, Some(110), None);
    ambiguous.cases_daily = Some(10);

    let observations = vec![
        cumulative_obs("Harris", 1, Some(100), Some(1)),
        ambiguous,
        cumulative_obs("Harris", 3, Some(120), Some(1)),
    ];

    let outcome = Reconciler::new().reconcile(&observations, &registry()).unwrap();
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.summary.dropped.len(), 1);
    assert_eq!(
        outcome.summary.drop_counts().get("ambiguous_both_conventions"),
        Some(&1)
    );
}

#[test]
fn leading_gap_zero_fills_and_interior_gap_forward_fills() {
    let observations = vec![
        // cases_cumulative null on the first two days (deaths carries the row)
        cumulative_obs("Bexar", 1, None, Some(1)),
        cumulative_obs("Bexar", 2, None, Some(1)),
        cumulative_obs("Bexar", 3, Some(30), Some(2)),
        cumulative_obs("Bexar", 4, Some(45), Some(2)),
    ];

    let outcome = Reconciler::new().reconcile(&observations, &registry()).unwrap();
    let cases: Vec<i64> = outcome.records.iter().map(|r| r.cases_cumulative).collect();
    assert_eq!(cases, vec![0, 0, 30, 45]);
    assert_eq!(outcome.summary.cumulative_zero_filled, 2);
}

#[test]
fn unknown_county_fails_before_any_transform() {
    let observations = vec![cumulative_obs("Loving", 1, Some(1), None)];
    let err = Reconciler::new().reconcile(&observations, &registry()).unwrap_err();
    assert!(matches!(err, VitalsError::UnknownCounty { county } if county == "Loving"));
}

#[test]
fn source_label_is_stamped_on_every_row() {
    let observations = vec![cumulative_obs("Harris", 1, Some(5), Some(1))];
    let outcome = Reconciler::new().reconcile(&observations, &registry()).unwrap();
    assert!(outcome
        .records
        .iter()
        .all(|r| r.source == "county level dashboards"));
}
