//! Machine-readable outputs: the statistics as JSON and the cleaned sheet as CSV.

use crate::core::engine::RunOutput;
use crate::core::metrics::SummaryStats;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct StatsDocument<'a> {
    section: &'a str,
    file: &'a str,
    #[serde(flatten)]
    stats: &'a SummaryStats,
}

pub fn stats_json(output: &RunOutput) -> Result<String> {
    let doc = StatsDocument {
        section: &output.ctx.section_name,
        file: &output.ctx.file_name,
        stats: &output.stats,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// The projected `Total,Grade` table as CSV bytes.
pub fn cleaned_csv(output: &RunOutput) -> Result<Vec<u8>> {
    debug!(rows = output.table.len(), "serialising cleaned sheet");
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    for row in output.table.rows() {
        writer.serialize(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| e.into_error())
        .context("failed to flush cleaned sheet")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::generate_report_from_bytes;
    use crate::core::io::Delimiter;
    use crate::core::model::ReportContext;

    fn output() -> RunOutput {
        generate_report_from_bytes(
            b"Name,Total,Grade\nAda,50,A\nBob,70.5,B\n",
            ReportContext {
                file_name: "8D.csv".into(),
                section_name: "8D".into(),
            },
            Delimiter::Auto,
        )
        .unwrap()
    }

    #[test]
    fn test_stats_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&stats_json(&output()).unwrap()).unwrap();
        assert_eq!(json["section"], "8D");
        assert_eq!(json["rows"], 2);
        assert_eq!(json["mean"], 60.25);
        assert_eq!(json["most_common"], "A");
        assert_eq!(json["most_common_count"], 1);
        assert_eq!(json["histogram"].as_array().unwrap().len(), 7);
        assert_eq!(json["histogram"][1]["grade"], "A");
        assert_eq!(json["histogram"][1]["count"], 1);
    }

    #[test]
    fn test_cleaned_csv_has_two_columns() {
        let content = String::from_utf8(cleaned_csv(&output()).unwrap()).unwrap();
        assert_eq!(content, "Total,Grade\n50.0,A\n70.5,B\n");
    }
}
