//! Section statistics: the grade tally and the split around the mean.

pub mod histogram;
pub mod partition;

pub use histogram::GradeHistogram;

use crate::core::error::ProcessingError;
use crate::core::model::{Grade, MarksTable};
use serde::Serialize;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryStats {
    pub rows: u64,
    pub mean: f64,
    pub above_average: u64,
    pub below_or_equal_average: u64,
    pub histogram: GradeHistogram,
    pub most_common: Grade,
    pub most_common_count: u64,
    pub unrecognised_grades: u64,
}

/// Computes the summary for a validated table. An empty table is `NoData`.
pub fn summarize(table: &MarksTable) -> Result<SummaryStats, ProcessingError> {
    let totals: Vec<f64> = table.totals().collect();
    let mean = partition::mean(&totals).ok_or(ProcessingError::NoData)?;
    let split = partition::partition(&totals, mean);

    let histogram = GradeHistogram::from_rows(table.rows());
    if histogram.unrecognised() > 0 {
        warn!(
            rows = histogram.unrecognised(),
            "grades outside A*..U are left out of the distribution"
        );
    }
    let (most_common, most_common_count) = histogram.most_common();

    Ok(SummaryStats {
        rows: table.len() as u64,
        mean,
        above_average: split.above,
        below_or_equal_average: split.below_or_equal,
        unrecognised_grades: histogram.unrecognised(),
        histogram,
        most_common,
        most_common_count,
    })
}
