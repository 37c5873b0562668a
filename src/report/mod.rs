pub mod data;
pub mod html;
pub mod latex;
pub mod narrative;
pub mod summary_txt;
pub mod zip;

use crate::core::engine::RunOutput;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

pub const HTML_FILE: &str = "report.html";
pub const SUMMARY_FILE: &str = "summary.txt";
pub const STATS_FILE: &str = "stats.json";
pub const CLEANED_FILE: &str = "cleaned.csv";
pub const LATEX_DIR: &str = "latex";
pub const LATEX_ZIP: &str = "section_report_latex.zip";

/// Directory (and zip stem) holding one section's report.
pub fn report_root(section_name: &str) -> String {
    format!("{}_report", section_name)
}

/// One rendered output. `name` is relative to the directory it is written
/// into and uses `/` separators.
#[derive(Clone, Debug)]
pub struct Artifact {
    pub name: String,
    pub body: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct WriteOptions {
    pub preview_rows: Option<usize>,
    pub zip: bool,
    pub latex: bool,
}

/// Writes every output for a successful run into `<out_dir>/<section>_report/`.
/// Returns the path of the HTML page.
///
/// Everything is rendered before the first file is touched, so a rendering
/// failure leaves the previous report as it was.
pub fn write_report(out_dir: &Path, output: &RunOutput, opts: WriteOptions) -> Result<PathBuf> {
    let root = report_root(&output.ctx.section_name);
    let report_dir = out_dir.join(&root);

    let files = render_report(output, opts)?;
    let latex = if opts.latex {
        let t = Instant::now();
        let files = latex::render(output).context("failed to render LaTeX export")?;
        stage_done("latex", t);
        Some(files)
    } else {
        None
    };

    fs::create_dir_all(&report_dir)
        .with_context(|| format!("failed to create output dir {}", report_dir.display()))?;
    clear_stale(out_dir, &root)?;
    write_all(&report_dir, &files)?;

    if opts.zip {
        let t = Instant::now();
        zip::write_archive(&out_dir.join(format!("{}.zip", root)), &root, &files)
            .context("failed to create zip output")?;
        stage_done("zip", t);
    }
    if let Some(files) = latex {
        let latex_dir = report_dir.join(LATEX_DIR);
        write_all(&latex_dir, &files)?;
        zip::write_archive(&latex_dir.join(LATEX_ZIP), LATEX_DIR, &files)
            .context("failed to create LaTeX zip")?;
    }

    let html_path = report_dir.join(HTML_FILE);
    info!(report = %html_path.display(), "report written");
    Ok(html_path)
}

/// The four files of the report directory, in bundle order.
pub fn render_report(output: &RunOutput, opts: WriteOptions) -> Result<Vec<Artifact>> {
    let t = Instant::now();
    let page = html::render(
        output,
        html::HtmlOptions {
            preview_rows: opts.preview_rows,
        },
        html::now_unix(),
    )?;
    stage_done("html", t);

    let t = Instant::now();
    let summary = summary_txt::render(output)?;
    let mut stats = data::stats_json(output)?;
    stats.push('\n');
    let cleaned = data::cleaned_csv(output)?;
    stage_done("data", t);

    Ok(vec![
        Artifact::new(HTML_FILE, page),
        Artifact::new(SUMMARY_FILE, summary),
        Artifact::new(STATS_FILE, stats),
        Artifact::new(CLEANED_FILE, cleaned),
    ])
}

/// Replaces the section's page with `message` and drops stale results.
pub fn write_failure(
    out_dir: &Path,
    section_name: &str,
    file_name: &str,
    message: &str,
) -> Result<PathBuf> {
    let root = report_root(section_name);
    let report_dir = out_dir.join(&root);
    fs::create_dir_all(&report_dir)
        .with_context(|| format!("failed to create output dir {}", report_dir.display()))?;
    clear_stale(out_dir, &root)?;
    let page = html::render_error(file_name, message, html::now_unix())?;
    write_all(&report_dir, &[Artifact::new(HTML_FILE, page)])?;
    Ok(report_dir.join(HTML_FILE))
}

fn write_all(dir: &Path, files: &[Artifact]) -> Result<()> {
    for file in files {
        let path = dir.join(&file.name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, &file.body)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

fn stage_done(name: &str, t: Instant) {
    debug!(stage = name, elapsed_ms = t.elapsed().as_millis() as u64, "stage done");
}

/// Removes results left by an earlier run so a failed run shows only its error.
pub fn clear_stale(out_dir: &Path, root: &str) -> Result<()> {
    let report_dir = out_dir.join(root);
    for name in [SUMMARY_FILE, STATS_FILE, CLEANED_FILE] {
        remove_if_exists(&report_dir.join(name))?;
    }
    remove_if_exists(&out_dir.join(format!("{}.zip", root)))?;
    let latex_dir = report_dir.join(LATEX_DIR);
    if latex_dir.is_dir() {
        fs::remove_dir_all(&latex_dir)
            .with_context(|| format!("failed to remove {}", latex_dir.display()))?;
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
    }
}
