pub mod engine;
pub mod grade;
pub mod input;
pub mod record;

pub use engine::{compute_average, compute_ranks, grade_distribution, is_valid_score, results_order};
pub use grade::{compute_grade, grade_label, Grade};
pub use input::parse_sub_score;
pub use record::{ScoreRecord, MAX_SCORE, MIN_SCORE, SUB_SCORE_COUNT};
