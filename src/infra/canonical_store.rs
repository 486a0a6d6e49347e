use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::common::error::{Result, VitalsError};
use crate::domain::CanonicalRecord;

/// Write the canonical table as NDJSON, one record per line. The file is
/// replaced wholesale; each run supersedes the previous output.
pub fn write_canonical(path: &Path, records: &[CanonicalRecord]) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    let mut writer = BufWriter::new(file);

    for record in records {
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    info!(
        "Wrote {} canonical rows to {}",
        records.len(),
        path.display()
    );
    Ok(())
}

/// Read a previously published canonical table back, for re-validation.
pub fn read_canonical(path: &Path) -> Result<Vec<CanonicalRecord>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: CanonicalRecord =
            serde_json::from_str(&line).map_err(|e| VitalsError::MalformedRow {
                line: index + 1,
                message: e.to_string(),
            })?;
        records.push(record);
    }

    Ok(records)
}
