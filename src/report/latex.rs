//! LaTeX export: a standalone document with booktabs tables and the grade
//! chart as a PDF figure, laid out for `\input` from `section_report.tex`.

use crate::core::engine::RunOutput;
use crate::report::Artifact;
use crate::report::html;
use crate::report::narrative::{Narrative, fmt_mark};
use anyhow::{Result, anyhow};
use std::fmt::Write;
use svg2pdf::usvg;
use svg2pdf::{ConversionOptions, PageOptions};

const FIGURE: &str = "figures/grade_distribution";
const SUMMARY_TABLE: &str = "tables/summary_statistics.tex";
const GRADE_TABLE: &str = "tables/grade_distribution.tex";
const DOCUMENT: &str = "section_report.tex";

/// Every file of the export, relative to the `latex/` folder.
pub fn render(output: &RunOutput) -> Result<Vec<Artifact>> {
    let stats = &output.stats;

    let summary = booktabs(
        ("Measure", "Value"),
        [
            ("Students".to_string(), stats.rows.to_string()),
            ("Average Mark".to_string(), fmt_mark(stats.mean)),
            ("Above Average".to_string(), stats.above_average.to_string()),
            (
                "Below Average".to_string(),
                stats.below_or_equal_average.to_string(),
            ),
        ],
    )?;
    let grades = booktabs(
        ("Grade", "Students"),
        stats
            .histogram
            .iter()
            .map(|(grade, n)| (escape_tex(grade.as_str()), n.to_string())),
    )?;

    let svg = html::svg_grade_chart(&stats.histogram, 640.0, 360.0)?;
    let pdf = chart_pdf(&svg)?;

    Ok(vec![
        Artifact::new(DOCUMENT, document(output)?),
        Artifact::new(SUMMARY_TABLE, summary),
        Artifact::new(GRADE_TABLE, grades),
        Artifact::new(format!("{}.svg", FIGURE), svg),
        Artifact::new(format!("{}.pdf", FIGURE), pdf),
    ])
}

fn booktabs<I>(head: (&str, &str), rows: I) -> Result<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut out = String::new();
    writeln!(out, "\\begin{{tabular}}{{lr}}")?;
    writeln!(out, "\\toprule")?;
    writeln!(out, "{} & {} \\\\", head.0, head.1)?;
    writeln!(out, "\\midrule")?;
    for (label, value) in rows {
        writeln!(out, "{} & {} \\\\", label, value)?;
    }
    writeln!(out, "\\bottomrule")?;
    writeln!(out, "\\end{{tabular}}")?;
    Ok(out)
}

fn document(output: &RunOutput) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "\\documentclass{{article}}")?;
    for package in ["graphicx", "booktabs", "caption", "float", "geometry"] {
        writeln!(out, "\\usepackage{{{}}}", package)?;
    }
    writeln!(out, "\\geometry{{margin=1in}}")?;
    writeln!(out, "\\title{{Student Marks and Grade Analysis}}")?;
    writeln!(out, "\\author{{section-grades}}")?;
    writeln!(out, "\\date{{\\today}}")?;
    writeln!(out, "\\begin{{document}}")?;
    writeln!(out, "\\maketitle")?;

    writeln!(out, "\\section*{{Section information}}")?;
    writeln!(
        out,
        "\\textbf{{Section:}} {}\\\\",
        escape_tex(&output.ctx.section_name)
    )?;
    writeln!(out, "\\textbf{{Input:}} {}", escape_tex(&output.ctx.file_name))?;

    writeln!(out, "\\section*{{Summary statistics}}")?;
    writeln!(out, "\\input{{{}}}", SUMMARY_TABLE)?;

    writeln!(out, "\\section*{{Grade distribution}}")?;
    writeln!(out, "\\begin{{figure}}[H]")?;
    writeln!(out, "\\centering")?;
    writeln!(out, "\\includegraphics[width=\\linewidth]{{{}.pdf}}", FIGURE)?;
    writeln!(out, "\\caption{{{}}}", html::CHART_TITLE)?;
    writeln!(out, "\\end{{figure}}")?;
    writeln!(out, "\\input{{{}}}", GRADE_TABLE)?;

    writeln!(out, "\\section*{{Observations}}")?;
    writeln!(out, "\\begin{{itemize}}")?;
    for (label, value) in &Narrative::from_stats(&output.stats).lines {
        writeln!(out, "\\item \\textbf{{{}:}} {}", label, escape_tex(value))?;
    }
    writeln!(out, "\\end{{itemize}}")?;
    writeln!(out, "\\end{{document}}")?;
    Ok(out)
}

/// Escapes the characters LaTeX treats as markup in running text.
fn escape_tex(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

// Axis labels need system fonts; without them the bars still convert.
fn chart_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| anyhow!("grade chart is not valid SVG: {e}"))?;
    svg2pdf::to_pdf(&tree, ConversionOptions::default(), PageOptions::default())
        .map_err(|e| anyhow!("grade chart PDF conversion failed: {e}"))
}
