use serde::{Deserialize, Serialize};

use super::engine::compute_average;
use super::grade::{compute_grade, grade_label, Grade};

/// Number of judges scoring each work.
pub const SUB_SCORE_COUNT: usize = 3;
pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 100.0;

/// One entered work and its scores.
///
/// `average`, `grade` and `rank` are derived from `sub_scores` by
/// [`compute_ranks`](super::compute_ranks) and cannot be set from outside the
/// ranking module. They are written out for exports but ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: u64,
    /// 1-based display row; renumbered on deletion, unrelated to rank.
    pub position: usize,
    #[serde(default)]
    pub contestant: String,
    #[serde(default)]
    pub work_title: String,
    #[serde(default)]
    sub_scores: [Option<f64>; SUB_SCORE_COUNT],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_deserializing)]
    pub(super) average: Option<f64>,
    #[serde(skip_deserializing)]
    pub(super) grade: Option<Grade>,
    #[serde(skip_deserializing)]
    pub(super) rank: Option<u32>,
}

impl ScoreRecord {
    /// Create an unscored record.
    pub fn new(id: u64, position: usize, contestant: &str, work_title: &str) -> Self {
        Self {
            id,
            position,
            contestant: contestant.to_string(),
            work_title: work_title.to_string(),
            sub_scores: [None; SUB_SCORE_COUNT],
            feedback: None,
            average: None,
            grade: None,
            rank: None,
        }
    }

    pub fn sub_scores(&self) -> &[Option<f64>; SUB_SCORE_COUNT] {
        &self.sub_scores
    }

    /// Replace the sub-scores. Derived fields are cleared together until the
    /// next ranking pass fills them in again.
    pub fn set_sub_scores(&mut self, sub_scores: [Option<f64>; SUB_SCORE_COUNT]) {
        self.sub_scores = sub_scores;
        self.average = None;
        self.grade = None;
        self.rank = None;
    }

    pub fn average(&self) -> Option<f64> {
        self.average
    }

    pub fn grade(&self) -> Option<Grade> {
        self.grade
    }

    pub fn grade_label(&self) -> &'static str {
        grade_label(self.grade)
    }

    pub fn rank(&self) -> Option<u32> {
        self.rank
    }

    pub fn is_ranked(&self) -> bool {
        self.rank.is_some()
    }

    /// Recompute average and grade from the sub-scores and drop the rank.
    pub(super) fn refresh_derived(&mut self) {
        self.average = compute_average(&self.sub_scores);
        self.grade = compute_grade(self.average);
        self.rank = None;
    }
}
