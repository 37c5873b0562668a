use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const TOTAL_COLUMN: &str = "Total";
pub const GRADE_COLUMN: &str = "Grade";

/// Columns every marks sheet must carry, in projection order.
pub const REQUIRED_COLUMNS: [&str; 2] = [TOTAL_COLUMN, GRADE_COLUMN];

pub const GRADE_COUNT: usize = 7;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum Grade {
    #[serde(rename = "A*")]
    AStar,
    A,
    B,
    C,
    D,
    E,
    U,
}

impl Grade {
    /// The fixed grade scale. Every histogram, chart and table follows this order.
    pub const ALL: [Grade; GRADE_COUNT] = [
        Grade::AStar,
        Grade::A,
        Grade::B,
        Grade::C,
        Grade::D,
        Grade::E,
        Grade::U,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::AStar => "A*",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::E => "E",
            Grade::U => "U",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Grade::AStar => 0,
            Grade::A => 1,
            Grade::B => 2,
            Grade::C => 3,
            Grade::D => 4,
            Grade::E => 5,
            Grade::U => 6,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownGrade(pub String);

impl fmt::Display for UnknownGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown grade {:?}", self.0)
    }
}

impl FromStr for Grade {
    type Err = UnknownGrade;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A*" => Ok(Grade::AStar),
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            "E" => Ok(Grade::E),
            "U" => Ok(Grade::U),
            other => Err(UnknownGrade(other.to_string())),
        }
    }
}

/// One student: the numeric total and the grade cell as it appeared in the sheet.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarkRow {
    #[serde(rename = "Total")]
    pub total: f64,
    #[serde(rename = "Grade")]
    pub grade: String,
}

impl MarkRow {
    pub fn new(total: f64, grade: impl Into<String>) -> Self {
        Self {
            total,
            grade: grade.into(),
        }
    }

    pub fn parsed_grade(&self) -> Option<Grade> {
        self.grade.parse().ok()
    }
}

/// A validated sheet, projected to `Total` and `Grade`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarksTable {
    rows: Vec<MarkRow>,
}

impl MarksTable {
    pub fn new(rows: Vec<MarkRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[MarkRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn totals(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.total)
    }
}

impl FromIterator<MarkRow> for MarksTable {
    fn from_iter<I: IntoIterator<Item = MarkRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Names attached to a run, used by every renderer.
#[derive(Clone, Debug)]
pub struct ReportContext {
    pub file_name: String,
    pub section_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_order_is_fixed_scale() {
        let labels: Vec<&str> = Grade::ALL.iter().map(|g| g.as_str()).collect();
        assert_eq!(labels, vec!["A*", "A", "B", "C", "D", "E", "U"]);
        for (i, g) in Grade::ALL.iter().enumerate() {
            assert_eq!(g.index(), i);
        }
    }

    #[test]
    fn test_grade_parse_is_case_sensitive() {
        assert_eq!("A*".parse::<Grade>(), Ok(Grade::AStar));
        assert_eq!(" B ".parse::<Grade>(), Ok(Grade::B));
        assert!("a".parse::<Grade>().is_err());
        assert!("F".parse::<Grade>().is_err());
        assert!("".parse::<Grade>().is_err());
    }

    #[test]
    fn test_mark_row_keeps_unknown_grade_text() {
        let row = MarkRow::new(42.0, "Absent");
        assert_eq!(row.grade, "Absent");
        assert_eq!(row.parsed_grade(), None);
    }
}
