use crate::core::engine::RunOutput;
use crate::report::narrative::Narrative;
use anyhow::Result;
use std::fmt::Write;

/// `summary.txt`: a short header block, a blank line, then the narrative.
pub fn render(output: &RunOutput) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Section\t{}", output.ctx.section_name)?;
    writeln!(out, "File\t{}", output.ctx.file_name)?;
    writeln!(out, "Students\t{}", output.stats.rows)?;
    writeln!(out)?;
    out.push_str(&Narrative::from_stats(&output.stats).to_text());
    Ok(out)
}
