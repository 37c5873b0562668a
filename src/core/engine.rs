use crate::core::error::Result;
use crate::core::io::{self, Delimiter, Sheet};
use crate::core::metrics::{self, SummaryStats};
use crate::core::model::{MarksTable, ReportContext};
use crate::core::table;
use crate::core::validate;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct RunConfig {
    pub input: PathBuf,
    pub section_name: String,
    pub delimiter: Delimiter,
}

#[derive(Debug)]
pub struct RunOutput {
    pub ctx: ReportContext,
    pub table: MarksTable,
    pub stats: SummaryStats,
}

/// One complete run for one sheet: intake, validation, aggregation.
///
/// Nothing is carried between calls; every call reads its input afresh.
pub fn generate_report(cfg: &RunConfig) -> Result<RunOutput> {
    let t_read = Instant::now();
    let sheet = io::read_input(&cfg.input)?;
    log_stage("engine.read", t_read);

    let file_name = cfg
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| cfg.input.display().to_string());

    let ctx = ReportContext {
        file_name,
        section_name: cfg.section_name.clone(),
    };
    summarise_sheet(&sheet, ctx, cfg.delimiter)
}

/// Same pipeline over an in-memory sheet (delimited text, gzip or xlsx bytes).
pub fn generate_report_from_bytes(
    data: &[u8],
    ctx: ReportContext,
    delimiter: Delimiter,
) -> Result<RunOutput> {
    let sheet = Sheet::from_bytes(data.to_vec())?;
    summarise_sheet(&sheet, ctx, delimiter)
}

fn summarise_sheet(sheet: &Sheet, ctx: ReportContext, delimiter: Delimiter) -> Result<RunOutput> {
    let t_parse = Instant::now();
    let raw = table::read_table(sheet, delimiter)?;
    log_stage("engine.parse", t_parse);

    let t_validate = Instant::now();
    let table = validate::validate(&raw)?;
    log_stage("engine.validate", t_validate);

    let t_metrics = Instant::now();
    let stats = metrics::summarize(&table)?;
    log_stage("engine.metrics", t_metrics);

    info!(
        section = %ctx.section_name,
        rows = stats.rows,
        mean = stats.mean,
        "section summarised"
    );
    Ok(RunOutput { ctx, table, stats })
}

fn log_stage(name: &str, t: Instant) {
    debug!(stage = name, elapsed_us = t.elapsed().as_micros() as u64, "stage done");
}
