use crate::cli::args::{Cli, Commands, DelimiterArg, RunArgs, SummaryArgs};
use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use section_grades::core::engine::{self, RunConfig};
use section_grades::core::io::{Delimiter, section_name_from_path};
use section_grades::report::{self, WriteOptions, data, narrative::Narrative};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(args) => run(&args).map(|_| ()),
        Commands::Summary(args) => summary(&args, &mut io::stdout().lock()),
    }
}

/// Writes the report, or the error page when the sheet cannot be reported on.
/// Returns the path of the report page.
fn run(args: &RunArgs) -> Result<PathBuf> {
    let t0 = Instant::now();

    preflight(&args.marks)?;
    if args.preview_rows == Some(0) {
        bail!("--preview-rows must be >= 1");
    }

    let section_name = match &args.section_name {
        Some(s) => s.clone(),
        None => section_name_from_path(&args.marks)
            .context("failed to determine section name from input file")?,
    };
    let file_name = display_name(&args.marks);

    fs::create_dir_all(&args.out)
        .with_context(|| format!("failed to create output dir {}", args.out.display()))?;

    let cfg = RunConfig {
        input: args.marks.clone(),
        section_name: section_name.clone(),
        delimiter: delimiter(args.delimiter),
    };
    info!(input = %args.marks.display(), section = %section_name, "processing marks sheet");

    let output = match engine::generate_report(&cfg) {
        Ok(output) => output,
        Err(err) => {
            return Err(fail(&args.out, &section_name, &file_name, &err.to_string()));
        }
    };

    let opts = WriteOptions {
        preview_rows: args.preview_rows,
        zip: !args.no_zip,
        latex: args.export_latex,
    };
    match report::write_report(&args.out, &output, opts) {
        Ok(page) => {
            debug!(total_ms = t0.elapsed().as_millis() as u64, "run finished");
            Ok(page)
        }
        Err(err) => {
            let message = format!("Error writing report: {:#}", err);
            Err(fail(&args.out, &section_name, &file_name, &message))
        }
    }
}

/// Leaves the error page in place of any earlier report and returns the
/// single-line error for the exit status.
fn fail(out: &Path, section_name: &str, file_name: &str, message: &str) -> anyhow::Error {
    match report::write_failure(out, section_name, file_name, message) {
        Ok(page) => error!(page = %page.display(), "{}", message),
        Err(e) => error!("{}; error page not written: {:#}", message, e),
    }
    anyhow!("{}", message)
}

fn summary(args: &SummaryArgs, out: &mut impl Write) -> Result<()> {
    preflight(&args.marks)?;
    let cfg = RunConfig {
        input: args.marks.clone(),
        section_name: section_name_from_path(&args.marks).unwrap_or_default(),
        delimiter: delimiter(args.delimiter),
    };
    let output = engine::generate_report(&cfg).map_err(|e| anyhow!("{}", e))?;
    if args.json {
        writeln!(out, "{}", data::stats_json(&output)?)?;
    } else {
        write!(out, "{}", Narrative::from_stats(&output.stats).to_text())?;
    }
    Ok(())
}

// A missing or unreadable file is reported by the engine as a processing
// error, so only arguments that can never name a sheet are refused here.
fn preflight(marks: &Path) -> Result<()> {
    if marks.as_os_str() == "-" {
        bail!("stdin is not supported; provide a marks file path");
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn delimiter(arg: DelimiterArg) -> Delimiter {
    match arg {
        DelimiterArg::Auto => Delimiter::Auto,
        DelimiterArg::Comma => Delimiter::Comma,
        DelimiterArg::Semicolon => Delimiter::Semicolon,
        DelimiterArg::Tab => Delimiter::Tab,
    }
}
