use crate::core::metrics::SummaryStats;

/// The four observation lines shown under the chart.
#[derive(Clone, Debug, PartialEq)]
pub struct Narrative {
    pub lines: [(&'static str, String); 4],
}

impl Narrative {
    pub fn from_stats(stats: &SummaryStats) -> Self {
        Self {
            lines: [
                ("Average Total Mark", fmt_mark(stats.mean)),
                ("Students Above Average", stats.above_average.to_string()),
                (
                    "Students Below Average",
                    stats.below_or_equal_average.to_string(),
                ),
                (
                    "Most Common Grade",
                    format!(
                        "{} ({} students)",
                        stats.most_common, stats.most_common_count
                    ),
                ),
            ],
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (label, value) in &self.lines {
            out.push_str("- ");
            out.push_str(label);
            out.push_str(": ");
            out.push_str(value);
            out.push('\n');
        }
        out
    }
}

pub fn fmt_mark(v: f64) -> String {
    format!("{:.2}", v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::summarize;
    use crate::core::model::{MarkRow, MarksTable};

    #[test]
    fn test_narrative_text() {
        let table: MarksTable = vec![
            MarkRow::new(50.0, "A"),
            MarkRow::new(70.0, "B"),
            MarkRow::new(90.0, "A"),
        ]
        .into_iter()
        .collect();
        let stats = summarize(&table).unwrap();
        assert_eq!(
            Narrative::from_stats(&stats).to_text(),
            "- Average Total Mark: 70.00\n\
             - Students Above Average: 1\n\
             - Students Below Average: 2\n\
             - Most Common Grade: A (2 students)\n"
        );
    }

    #[test]
    fn test_fmt_mark_rounds_to_two_places() {
        assert_eq!(fmt_mark(66.666_666), "66.67");
        assert_eq!(fmt_mark(5.0), "5.00");
    }
}
