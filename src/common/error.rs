use thiserror::Error;

use crate::pipeline::processing::validate::ValidationReport;

#[derive(Error, Debug)]
pub enum VitalsError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Registry error: {0}")]
    Registry(String),

    #[error("Malformed observation at line {line}: {message}")]
    MalformedRow { line: usize, message: String },

    #[error("No reporting mode registered for county: {county}")]
    UnknownCounty { county: String },

    #[error("Empty observation batch")]
    EmptyBatch,

    #[error("Canonical table failed validation with {} violation(s)", .report.failures.len())]
    Validation { report: ValidationReport },
}

pub type Result<T> = std::result::Result<T, VitalsError>;
