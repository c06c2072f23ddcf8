use std::cmp::Ordering;

use super::grade::Grade;
use super::record::{ScoreRecord, MAX_SCORE, MIN_SCORE};

/// Whether a single sub-score is usable: finite and within [0, 100].
pub fn is_valid_score(value: f64) -> bool {
    value.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&value)
}

/// Mean of the sub-scores rounded to one decimal place.
///
/// Returns `None` when the slice is empty or any entry is unset or invalid.
pub fn compute_average(sub_scores: &[Option<f64>]) -> Option<f64> {
    if sub_scores.is_empty() {
        return None;
    }

    let mut sum = 0.0;
    for score in sub_scores {
        let value = (*score)?;
        if !is_valid_score(value) {
            return None;
        }
        sum += value;
    }

    Some(round_one_decimal(sum / sub_scores.len() as f64))
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Recompute average, grade and rank for every record.
///
/// Records keep their input order in the returned snapshot. Ranked records are
/// ordered by average (descending, stable so ties keep input order) and share a
/// rank when their averages are equal; the next distinct average takes its
/// 1-based position in that order, giving 1, 1, 3, 4 style ranks. Records
/// without an average get no rank and take no rank slot.
pub fn compute_ranks(records: &[ScoreRecord]) -> Vec<ScoreRecord> {
    let mut out: Vec<ScoreRecord> = records
        .iter()
        .map(|record| {
            let mut record = record.clone();
            record.refresh_derived();
            record
        })
        .collect();

    let mut ranked: Vec<(usize, f64)> = out
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| record.average.map(|avg| (idx, avg)))
        .collect();

    // Primary: average descending. sort_by is stable, so input order breaks ties.
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let mut current_rank = 1u32;
    for (pos, &(idx, avg)) in ranked.iter().enumerate() {
        if pos > 0 && avg != ranked[pos - 1].1 {
            current_rank = pos as u32 + 1;
        }
        out[idx].rank = Some(current_rank);
    }

    out
}

/// Records in results order: by rank, ties in input order, unranked last.
pub fn results_order(records: &[ScoreRecord]) -> Vec<&ScoreRecord> {
    let mut ordered: Vec<&ScoreRecord> = records.iter().collect();
    ordered.sort_by_key(|record| record.rank.unwrap_or(u32::MAX));
    ordered
}

/// Number of records in each grade band, highest band first.
pub fn grade_distribution(records: &[ScoreRecord]) -> Vec<(Grade, usize)> {
    Grade::ALL
        .into_iter()
        .map(|grade| {
            let count = records
                .iter()
                .filter(|record| record.grade == Some(grade))
                .count();
            (grade, count)
        })
        .collect()
}
