use crate::core::error::{ProcessingError, ReportError};
use crate::core::model::{GRADE_COLUMN, MarkRow, MarksTable, REQUIRED_COLUMNS, TOTAL_COLUMN};
use crate::core::table::RawTable;
use tracing::debug;

/// Required columns absent from `headers`, in `REQUIRED_COLUMNS` order.
pub fn missing_columns(headers: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|req| !headers.iter().any(|h| h == *req))
        .map(|req| req.to_string())
        .collect()
}

/// Checks the required columns once and projects every record to `Total`, `Grade`.
pub fn validate(table: &RawTable) -> Result<MarksTable, ReportError> {
    let missing = missing_columns(table.headers());
    if !missing.is_empty() {
        return Err(ReportError::MissingColumns(missing));
    }

    let (Some(total_idx), Some(grade_idx)) = (
        table.column_index(TOTAL_COLUMN),
        table.column_index(GRADE_COLUMN),
    ) else {
        return Err(ReportError::MissingColumns(missing_columns(table.headers())));
    };
    debug!(
        dropped = table.headers().len() - 2,
        "projecting to Total and Grade"
    );

    let mut rows = Vec::with_capacity(table.len());
    for (row, rec) in table.records() {
        let raw_total = rec.get(total_idx).unwrap_or("");
        let total = parse_total(raw_total).ok_or_else(|| ProcessingError::InvalidTotal {
            row,
            value: raw_total.to_string(),
        })?;
        let grade = rec.get(grade_idx).unwrap_or("").to_string();
        rows.push(MarkRow { total, grade });
    }
    Ok(MarksTable::new(rows))
}

fn parse_total(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
