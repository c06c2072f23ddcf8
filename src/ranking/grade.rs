use serde::{Deserialize, Serialize};
use std::fmt;

/// Category label derived from an entry's average.
///
/// | Average     | Grade |
/// |-------------|-------|
/// | >= 95       | 수    |
/// | >= 85       | 우    |
/// | >= 75       | 미    |
/// | >= 65       | 양    |
/// | >= 0        | 가    |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "수")]
    Su,
    #[serde(rename = "우")]
    U,
    #[serde(rename = "미")]
    Mi,
    #[serde(rename = "양")]
    Yang,
    #[serde(rename = "가")]
    Ga,
}

impl Grade {
    /// All grades, highest band first.
    pub const ALL: [Grade; 5] = [Grade::Su, Grade::U, Grade::Mi, Grade::Yang, Grade::Ga];

    pub fn label(self) -> &'static str {
        match self {
            Grade::Su => "수",
            Grade::U => "우",
            Grade::Mi => "미",
            Grade::Yang => "양",
            Grade::Ga => "가",
        }
    }

    /// Inclusive lower bound of the band.
    pub fn lower_bound(self) -> f64 {
        match self {
            Grade::Su => 95.0,
            Grade::U => 85.0,
            Grade::Mi => 75.0,
            Grade::Yang => 65.0,
            Grade::Ga => 0.0,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map an average onto its grade band. First matching band wins.
///
/// An absent, negative or non-finite average has no grade.
pub fn compute_grade(average: Option<f64>) -> Option<Grade> {
    let average = average?;
    if !average.is_finite() || average < 0.0 {
        return None;
    }
    Grade::ALL
        .into_iter()
        .find(|grade| average >= grade.lower_bound())
}

/// Display label for an optional grade; empty when ungraded.
pub fn grade_label(grade: Option<Grade>) -> &'static str {
    grade.map(Grade::label).unwrap_or("")
}
