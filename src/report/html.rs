use crate::core::engine::RunOutput;
use crate::core::metrics::GradeHistogram;
use crate::core::model::GRADE_COUNT;
use crate::report::narrative::{Narrative, fmt_mark};
use anyhow::Result;
use std::fmt::Write as FmtWrite;
use std::time::{SystemTime, UNIX_EPOCH};

pub const CHART_TITLE: &str = "Number of Students in Each Grade";

// viridis, sampled at seven points
const BAR_COLORS: [&str; GRADE_COUNT] = [
    "#440154", "#443983", "#31688e", "#21918c", "#35b779", "#90d743", "#fde725",
];

#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlOptions {
    /// Cap on preview rows; `None` shows the whole sheet.
    pub preview_rows: Option<usize>,
}

/// Seconds since the epoch, stamped into the page header.
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub fn render(output: &RunOutput, opts: HtmlOptions, ts: u64) -> Result<String> {
    let stats = &output.stats;
    let mut html = String::with_capacity(32 * 1024);

    page_head(&mut html, &output.ctx.section_name)?;
    writeln!(html, "<main class=\"main\">")?;
    writeln!(
        html,
        "<h1>Single Section: Student Marks and Grade Analysis</h1>"
    )?;
    writeln!(
        html,
        "<div class=\"meta\">Section: <b>{}</b><br/>File: {}<br/>Students: {}<br/>Generated: {} (unix: {})</div>",
        escape_html(&output.ctx.section_name),
        escape_html(&output.ctx.file_name),
        stats.rows,
        fmt_timestamp(ts),
        ts
    )?;

    section_header(&mut html, "preview", "Cleaned Data Preview (Total and Grade only)")?;
    preview_table(&mut html, output, opts.preview_rows)?;
    section_footer(&mut html)?;

    section_header(&mut html, "summary", "Summary Statistics")?;
    writeln!(html, "<div class=\"cards\">")?;
    metric_card(&mut html, "Average Mark", &fmt_mark(stats.mean))?;
    metric_card(&mut html, "Above Average", &stats.above_average.to_string())?;
    metric_card(
        &mut html,
        "Below Average",
        &stats.below_or_equal_average.to_string(),
    )?;
    writeln!(html, "</div>")?;
    section_footer(&mut html)?;

    section_header(&mut html, "distribution", "Grade Distribution")?;
    writeln!(html, "<div class=\"plot\">")?;
    html.push_str(&svg_grade_chart(&stats.histogram, 640.0, 360.0)?);
    writeln!(html, "</div>")?;
    if stats.unrecognised_grades > 0 {
        writeln!(
            html,
            "<p class=\"desc\">{} student(s) have a grade outside A*, A, B, C, D, E, U and are not shown in the chart.</p>",
            stats.unrecognised_grades
        )?;
    }
    section_footer(&mut html)?;

    section_header(&mut html, "observations", "Observations")?;
    writeln!(html, "<ul class=\"obs\">")?;
    for (label, value) in &Narrative::from_stats(stats).lines {
        writeln!(
            html,
            "<li><b>{}:</b> {}</li>",
            label,
            escape_html(value)
        )?;
    }
    writeln!(html, "</ul>")?;
    section_footer(&mut html)?;

    writeln!(html, "<div class=\"meta\">Produced by section-grades</div>")?;
    writeln!(html, "</main>")?;
    writeln!(html, "</body></html>")?;
    Ok(html)
}

/// Page carrying only the failure message, no results.
pub fn render_error(file_name: &str, message: &str, ts: u64) -> Result<String> {
    let mut html = String::with_capacity(4 * 1024);
    page_head(&mut html, file_name)?;
    writeln!(html, "<main class=\"main\">")?;
    writeln!(
        html,
        "<h1>Single Section: Student Marks and Grade Analysis</h1>"
    )?;
    writeln!(
        html,
        "<div class=\"meta\">File: {}<br/>Generated: {} (unix: {})</div>",
        escape_html(file_name),
        fmt_timestamp(ts),
        ts
    )?;
    writeln!(
        html,
        "<div class=\"error\">{}</div>",
        escape_html(message)
    )?;
    writeln!(html, "</main>")?;
    writeln!(html, "</body></html>")?;
    Ok(html)
}

fn page_head(out: &mut String, title: &str) -> Result<()> {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        out,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(
        out,
        "<title>Section Grade Analysis: {}</title>",
        escape_html(title)
    )?;
    writeln!(out, "<style>")?;
    writeln!(
        out,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:0;background:#eee;color:#222;}}"
    )?;
    writeln!(
        out,
        ".main{{max-width:1100px;margin:16px auto;background:#fff;border:1px solid #ddd;border-radius:4px;box-shadow:0 1px 3px rgba(0,0,0,0.08);padding:16px 20px;}}"
    )?;
    writeln!(out, "h1{{margin:0 0 6px 0;font-size:22px;}}")?;
    writeln!(out, "h2{{margin:20px 0 6px 0;font-size:18px;}}")?;
    writeln!(out, ".meta{{color:#555;font-size:12px;margin-bottom:12px;}}")?;
    writeln!(
        out,
        ".module{{padding:8px 0 14px 0;border-bottom:1px solid #eee;}}"
    )?;
    writeln!(out, ".module:last-child{{border-bottom:none;}}")?;
    writeln!(
        out,
        ".desc{{color:#444;font-size:13px;max-width:1000px;margin:4px 0 10px 0;}}"
    )?;
    writeln!(
        out,
        ".table{{border-collapse:collapse;width:100%;max-width:420px;font-size:12px;}}"
    )?;
    writeln!(
        out,
        ".table th,.table td{{border:1px solid #ddd;padding:4px 6px;text-align:right;}}"
    )?;
    writeln!(
        out,
        ".table th{{background:#3b6ea5;color:#fff;border-color:#2f5a86;}}"
    )?;
    writeln!(
        out,
        ".table th:last-child,.table td:last-child{{text-align:left;}}"
    )?;
    writeln!(out, ".scroll{{max-height:360px;overflow-y:auto;}}")?;
    writeln!(out, ".cards{{display:flex;gap:16px;flex-wrap:wrap;}}")?;
    writeln!(
        out,
        ".card{{flex:1;min-width:160px;border:1px solid #ddd;border-radius:4px;padding:10px 14px;background:#fafafa;}}"
    )?;
    writeln!(out, ".card .label{{font-size:13px;color:#555;}}")?;
    writeln!(out, ".card .value{{font-size:28px;margin-top:4px;}}")?;
    writeln!(out, ".obs{{font-size:14px;line-height:1.6;}}")?;
    writeln!(
        out,
        ".error{{color:#c00000;background:#fdecea;border:1px solid #f5c2c0;border-radius:4px;padding:10px 14px;font-size:14px;}}"
    )?;
    writeln!(out, ".plot{{margin:8px 0 6px 0;}}")?;
    writeln!(out, "svg{{background:#fafafa;border:1px solid #e5e5e5;}}")?;
    writeln!(out, "</style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    Ok(())
}

fn section_header(out: &mut String, id: &str, title: &str) -> Result<()> {
    writeln!(out, "<section id=\"{}\" class=\"module\">", id)?;
    writeln!(out, "<h2>{}</h2>", title)?;
    Ok(())
}

fn section_footer(out: &mut String) -> Result<()> {
    writeln!(out, "</section>")?;
    Ok(())
}

fn metric_card(out: &mut String, label: &str, value: &str) -> Result<()> {
    writeln!(
        out,
        "<div class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
        label,
        escape_html(value)
    )?;
    Ok(())
}

fn preview_table(out: &mut String, output: &RunOutput, limit: Option<usize>) -> Result<()> {
    let rows = output.table.rows();
    let shown = limit.unwrap_or(rows.len()).min(rows.len());
    writeln!(out, "<div class=\"scroll\">")?;
    writeln!(out, "<table class=\"table\">")?;
    writeln!(out, "<tr><th>Total</th><th>Grade</th></tr>")?;
    for row in rows.iter().take(shown) {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td></tr>",
            fmt_total(row.total),
            escape_html(&row.grade)
        )?;
    }
    writeln!(out, "</table>")?;
    writeln!(out, "</div>")?;
    if shown < rows.len() {
        writeln!(
            out,
            "<p class=\"desc\">Showing {} of {} rows.</p>",
            shown,
            rows.len()
        )?;
    }
    Ok(())
}

/// Totals keep their decimals only when they have some.
pub fn fmt_total(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Standalone SVG bar chart of the grade histogram, x in scale order.
pub fn svg_grade_chart(hist: &GradeHistogram, w: f64, h: f64) -> Result<String> {
    let mut out = String::with_capacity(4 * 1024);
    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {} {}\">",
        w, h, w, h
    )?;
    let left = 56.0;
    let right = 20.0;
    let top = 34.0;
    let bottom = 46.0;
    let plot_w = w - left - right;
    let plot_h = h - top - bottom;
    writeln!(
        out,
        "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#fff\" stroke=\"#ddd\"/>",
        left, top, plot_w, plot_h
    )?;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-family=\"Arial,Helvetica,sans-serif\" font-size=\"14\" fill=\"#222\" text-anchor=\"middle\">{}</text>",
        left + plot_w / 2.0,
        top - 14.0,
        CHART_TITLE
    )?;

    let max_count = hist.max_count();
    let (_, step, count) = nice_ticks(0.0, max_count.max(1) as f64, 5);
    let max_y = step * (count.saturating_sub(1)) as f64;
    draw_y_axis_ticks(&mut out, left, top, plot_w, plot_h, max_y, step, count)?;

    let slot = plot_w / GRADE_COUNT as f64;
    let bar_w = slot * 0.7;
    for (i, (grade, n)) in hist.iter().enumerate() {
        let x = left + slot * i as f64 + (slot - bar_w) / 2.0;
        let bar_h = if max_y == 0.0 {
            0.0
        } else {
            n as f64 / max_y * plot_h
        };
        let y0 = top + plot_h - bar_h;
        writeln!(
            out,
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"><title>{}: {}</title></rect>",
            x, y0, bar_w, bar_h, BAR_COLORS[i], grade, n
        )?;
        if n > 0 {
            writeln!(
                out,
                "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"Arial,Helvetica,sans-serif\" font-size=\"10\" fill=\"#444\" text-anchor=\"middle\">{}</text>",
                x + bar_w / 2.0,
                y0 - 4.0,
                n
            )?;
        }
        writeln!(
            out,
            "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"Arial,Helvetica,sans-serif\" font-size=\"11\" fill=\"#666\" text-anchor=\"middle\" dominant-baseline=\"hanging\">{}</text>",
            x + bar_w / 2.0,
            top + plot_h + 4.0,
            grade
        )?;
    }
    draw_axis_labels(&mut out, left, top, plot_w, plot_h, "Grade", "Number of Students")?;
    writeln!(out, "</svg>")?;
    Ok(out)
}

fn draw_y_axis_ticks(
    out: &mut String,
    left: f64,
    top: f64,
    plot_w: f64,
    plot_h: f64,
    max_y: f64,
    step: f64,
    count: usize,
) -> Result<()> {
    if max_y <= 0.0 {
        return Ok(());
    }
    for i in 0..count {
        let v = step * i as f64;
        let y = top + plot_h - (v / max_y) * plot_h;
        writeln!(
            out,
            "<line x1=\"{}\" y1=\"{:.2}\" x2=\"{}\" y2=\"{:.2}\" stroke=\"#eee\"/>",
            left,
            y,
            left + plot_w,
            y
        )?;
        writeln!(
            out,
            "<text x=\"{}\" y=\"{:.2}\" font-family=\"Arial,Helvetica,sans-serif\" font-size=\"10\" fill=\"#666\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>",
            left - 4.0,
            y,
            fmt_tick(v)
        )?;
    }
    Ok(())
}

fn draw_axis_labels(
    out: &mut String,
    left: f64,
    top: f64,
    plot_w: f64,
    plot_h: f64,
    x_label: &str,
    y_label: &str,
) -> Result<()> {
    let x = left + plot_w / 2.0;
    let y = top + plot_h + 32.0;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-family=\"Arial,Helvetica,sans-serif\" font-size=\"12\" fill=\"#444\" text-anchor=\"middle\">{}</text>",
        x, y, x_label
    )?;
    let yx = left - 36.0;
    let yy = top + plot_h / 2.0;
    writeln!(
        out,
        "<text x=\"{}\" y=\"{}\" font-family=\"Arial,Helvetica,sans-serif\" font-size=\"12\" fill=\"#444\" text-anchor=\"middle\" transform=\"rotate(-90 {} {})\">{}</text>",
        yx, yy, yx, yy, y_label
    )?;
    Ok(())
}

fn fmt_tick(v: f64) -> String {
    if (v - v.round()).abs() < 0.001 {
        format!("{}", v.round() as i64)
    } else {
        format!("{:.1}", v)
    }
}

/// Whole-number tick spacing for a count axis.
fn nice_ticks(min: f64, max: f64, ticks: usize) -> (f64, f64, usize) {
    let range = (max - min).abs().max(1e-9);
    let rough = range / (ticks as f64 - 1.0);
    let mag = 10f64.powf(rough.abs().log10().floor());
    let norm = rough / mag;
    let step = (if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    } * mag)
        .round()
        .max(1.0);
    let start = (min / step).floor() * step;
    let end = (max / step).ceil() * step;
    let count = ((end - start) / step).round() as usize + 1;
    (start, step, count)
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn fmt_timestamp(ts: u64) -> String {
    let days = (ts / 86_400) as i64;
    let secs = (ts % 86_400) as u32;
    let hour = secs / 3_600;
    let min = (secs % 3_600) / 60;
    let sec = secs % 60;

    // civil-from-days
    let z = days + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = mp + if mp < 10 { 3 } else { -9 };
    let year = y + if m <= 2 { 1 } else { 0 };

    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02} UTC",
        year, m, d, hour, min, sec
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::generate_report_from_bytes;
    use crate::core::error::{ProcessingError, ReportError};
    use crate::core::io::Delimiter;
    use crate::core::model::ReportContext;

    fn output(sheet: &str) -> RunOutput {
        generate_report_from_bytes(
            sheet.as_bytes(),
            ReportContext {
                file_name: "10A.csv".into(),
                section_name: "10A".into(),
            },
            Delimiter::Auto,
        )
        .unwrap()
    }

    #[test]
    fn test_render_contains_all_parts() {
        let out = output("Total,Grade\n50,A\n70,B\n90,A\n");
        let html = render(&out, HtmlOptions::default(), 0).unwrap();
        assert!(html.contains("Cleaned Data Preview"));
        assert!(html.contains("<div class=\"label\">Average Mark</div><div class=\"value\">70.00</div>"));
        assert!(html.contains("<div class=\"label\">Above Average</div><div class=\"value\">1</div>"));
        assert!(html.contains("<div class=\"label\">Below Average</div><div class=\"value\">2</div>"));
        assert!(html.contains(CHART_TITLE));
        assert!(html.contains("<li><b>Most Common Grade:</b> A (2 students)</li>"));
        assert!(html.contains("1970-01-01 00:00:00 UTC"));
    }

    #[test]
    fn test_chart_has_bar_per_grade_in_order() {
        let out = output("Total,Grade\n50,U\n");
        let svg = svg_grade_chart(&out.stats.histogram, 640.0, 360.0).unwrap();
        let titles: Vec<usize> = ["<title>A*: 0", "<title>A: 0", "<title>B: 0", "<title>U: 1"]
            .iter()
            .map(|t| svg.find(t).unwrap())
            .collect();
        assert!(titles.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_preview_limit_note() {
        let out = output("Total,Grade\n1,A\n2,B\n3,C\n");
        let html = render(
            &out,
            HtmlOptions {
                preview_rows: Some(2),
            },
            0,
        )
        .unwrap();
        assert!(html.contains("Showing 2 of 3 rows."));
        assert!(html.contains("<tr><td>2</td><td>B</td></tr>"));
        assert!(!html.contains("<tr><td>3</td><td>C</td></tr>"));
    }

    #[test]
    fn test_grade_text_is_escaped() {
        let out = output("Total,Grade\n1,<b>\n");
        let html = render(&out, HtmlOptions::default(), 0).unwrap();
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("outside A*, A, B, C, D, E, U"));
    }

    #[test]
    fn test_render_error_is_single_message() {
        let err = ReportError::from(ProcessingError::NoData);
        let html = render_error("empty.csv", &err.to_string(), 0).unwrap();
        assert!(html.contains("<div class=\"error\">Error processing file: no data"));
        assert!(!html.contains("Summary Statistics"));
    }

    #[test]
    fn test_fmt_total() {
        assert_eq!(fmt_total(70.0), "70");
        assert_eq!(fmt_total(70.5), "70.5");
    }

    #[test]
    fn test_nice_ticks_integer_steps() {
        let (start, step, count) = nice_ticks(0.0, 3.0, 5);
        assert_eq!(start, 0.0);
        assert_eq!(step, 1.0);
        assert_eq!(count, 4);
    }
}
