use crate::core::model::{GRADE_COUNT, Grade, MarkRow};
use serde::ser::{Serialize, Serializer};

/// Student counts per grade on the fixed scale.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GradeHistogram {
    counts: [u64; GRADE_COUNT],
    unrecognised: u64,
}

impl GradeHistogram {
    pub fn from_rows(rows: &[MarkRow]) -> Self {
        let mut h = Self::default();
        for row in rows {
            match row.parsed_grade() {
                Some(g) => h.counts[g.index()] += 1,
                None => h.unrecognised += 1,
            }
        }
        h
    }

    /// All seven grades in scale order, zeros included.
    pub fn iter(&self) -> impl Iterator<Item = (Grade, u64)> + '_ {
        Grade::ALL.iter().map(|&g| (g, self.counts[g.index()]))
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Rows whose grade is not on the scale.
    pub fn unrecognised(&self) -> u64 {
        self.unrecognised
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Grade with the highest count; the earliest grade on the scale wins ties.
    pub fn most_common(&self) -> (Grade, u64) {
        let mut best = (Grade::ALL[0], self.counts[0]);
        for (g, c) in self.iter().skip(1) {
            if c > best.1 {
                best = (g, c);
            }
        }
        best
    }
}

#[derive(serde::Serialize)]
struct GradeCount {
    grade: Grade,
    count: u64,
}

impl Serialize for GradeHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|(grade, count)| GradeCount { grade, count }))
    }
}
