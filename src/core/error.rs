//! Failure kinds of a report run.
//!
//! Validation failures and processing failures are kept apart so a caller can
//! tell "fix the sheet's headers" from "the sheet could not be read".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Error processing file: {0}")]
    Processing(#[from] ProcessingError),
}

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Csv(#[from] csv::Error),
    #[error("workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),
    #[error("file has no header row")]
    EmptyInput,
    #[error("row {row}: Total value {value:?} is not a number")]
    InvalidTotal { row: usize, value: String },
    #[error("no data: the sheet has a header row but no student rows")]
    NoData,
}

impl ReportError {
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            ReportError::MissingColumns(cols) => Some(cols),
            ReportError::Processing(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
