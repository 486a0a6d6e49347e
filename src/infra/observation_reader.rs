use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use crate::common::error::{Result, VitalsError};
use crate::domain::RawObservation;

/// Read a batch of raw observations from an NDJSON file, one observation per
/// line. A malformed line fails the whole load: a partially read batch would
/// silently change what the engine reconciles.
pub fn read_observations(path: &Path) -> Result<Vec<RawObservation>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut observations = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let observation: RawObservation =
            serde_json::from_str(&line).map_err(|e| VitalsError::MalformedRow {
                line: index + 1,
                message: e.to_string(),
            })?;
        observations.push(observation);
    }

    info!(
        "Loaded {} observations from {}",
        observations.len(),
        path.display()
    );
    Ok(observations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_ndjson_and_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.ndjson");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"county":"Harris","date":"2021-03-01","cases_cumulative":10,"cases_daily":null,"deaths_cumulative":null,"deaths_daily":null}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"county":"Harris","date":"2021-03-02","cases_cumulative":12,"cases_daily":null,"deaths_cumulative":null,"deaths_daily":null}}"#
        )
        .unwrap();

        let observations = read_observations(&path).unwrap();
        assert_eq!(observations.len(), 2);
        assert_eq!(observations[0].county, "Harris");
        assert_eq!(observations[1].cases_cumulative, Some(12));
    }

    #[test]
    fn malformed_line_fails_with_its_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.ndjson");
        let mut file = File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"county":"Harris","date":"2021-03-01","cases_cumulative":10,"cases_daily":null,"deaths_cumulative":null,"deaths_daily":null}}"#
        )
        .unwrap();
        writeln!(file, "not json").unwrap();

        let err = read_observations(&path).unwrap_err();
        assert!(matches!(err, VitalsError::MalformedRow { line: 2, .. }));
    }
}
