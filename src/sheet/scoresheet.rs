use serde::{Deserialize, Serialize};

use crate::ranking::{compute_ranks, ScoreRecord, SUB_SCORE_COUNT};
use crate::store::{id_after, Document, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SheetError {
    #[error("No entry with id {0}")]
    UnknownRecord(u64),
    #[error("No judge column {0} (expected 1-{max})", max = SUB_SCORE_COUNT)]
    InvalidSlot(usize),
    #[error("An entry with id {0} already exists")]
    DuplicateId(u64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The judges' scoresheet: every entered work, in display order.
///
/// Any change to the records re-runs the ranking pass over the whole sheet
/// before returning, so derived fields are never stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scoresheet {
    pub version: u32,
    #[serde(default = "first_id")]
    next_id: u64,
    #[serde(default)]
    records: Vec<ScoreRecord>,
}

fn first_id() -> u64 {
    1
}

impl Default for Scoresheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for Scoresheet {
    const KIND: &'static str = "scoresheet";
    const VERSION: u32 = 1;

    fn version(&self) -> u32 {
        self.version
    }

    fn after_load(&mut self) -> Result<(), StoreError> {
        // Hand-edited files may carry stale ids or positions.
        let max_id = self.records.iter().map(|r| r.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(id_after(Self::KIND, max_id)?);
        self.records.sort_by_key(|r| r.position);
        self.renumber();
        self.recompute();
        Ok(())
    }
}

impl Scoresheet {
    /// Create a new empty sheet with version 1
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            next_id: first_id(),
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&ScoreRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Append an unscored entry. Returns its id.
    pub fn add(&mut self, contestant: &str, work_title: &str) -> Result<u64, SheetError> {
        let id = self.next_id;
        self.next_id = id_after(Self::KIND, id)?;
        let position = self.records.len() + 1;
        self.records.push(ScoreRecord::new(
            id,
            position,
            contestant.trim(),
            work_title.trim(),
        ));
        tracing::debug!(id, position, "added entry");
        self.recompute();
        Ok(id)
    }

    /// Set one judge's score (`slot` is 0-based). `None` clears it.
    pub fn set_sub_score(
        &mut self,
        id: u64,
        slot: usize,
        value: Option<f64>,
    ) -> Result<(), SheetError> {
        if slot >= SUB_SCORE_COUNT {
            return Err(SheetError::InvalidSlot(slot + 1));
        }
        let record = self.record_mut(id)?;
        let mut scores = *record.sub_scores();
        scores[slot] = value;
        record.set_sub_scores(scores);
        tracing::debug!(id, slot, ?value, "updated sub-score");
        self.recompute();
        Ok(())
    }

    /// Replace all judges' scores for an entry.
    pub fn set_scores(
        &mut self,
        id: u64,
        scores: [Option<f64>; SUB_SCORE_COUNT],
    ) -> Result<(), SheetError> {
        self.record_mut(id)?.set_sub_scores(scores);
        tracing::debug!(id, ?scores, "updated scores");
        self.recompute();
        Ok(())
    }

    /// Set or clear written feedback. Blank text clears it.
    pub fn set_feedback(&mut self, id: u64, feedback: Option<&str>) -> Result<(), SheetError> {
        let feedback = feedback
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        self.record_mut(id)?.feedback = feedback;
        Ok(())
    }

    pub fn rename(&mut self, id: u64, contestant: &str, work_title: &str) -> Result<(), SheetError> {
        let record = self.record_mut(id)?;
        record.contestant = contestant.trim().to_string();
        record.work_title = work_title.trim().to_string();
        Ok(())
    }

    /// Remove an entry and renumber the remaining positions. Ids are never reused.
    pub fn remove(&mut self, id: u64) -> Result<ScoreRecord, SheetError> {
        let idx = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(SheetError::UnknownRecord(id))?;
        let removed = self.records.remove(idx);
        self.renumber();
        tracing::debug!(id, "removed entry");
        self.recompute();
        Ok(removed)
    }

    /// Put a removed entry back at its old position.
    pub fn restore(&mut self, record: ScoreRecord) -> Result<(), SheetError> {
        if self.get(record.id).is_some() {
            return Err(SheetError::DuplicateId(record.id));
        }
        let idx = record.position.saturating_sub(1).min(self.records.len());
        self.next_id = self.next_id.max(id_after(Self::KIND, record.id)?);
        self.records.insert(idx, record);
        self.renumber();
        self.recompute();
        Ok(())
    }

    fn record_mut(&mut self, id: u64) -> Result<&mut ScoreRecord, SheetError> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(SheetError::UnknownRecord(id))
    }

    fn renumber(&mut self) {
        for (idx, record) in self.records.iter_mut().enumerate() {
            record.position = idx + 1;
        }
    }

    fn recompute(&mut self) {
        self.records = compute_ranks(&self.records);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::storage::scratch_store;
    use crate::store::RecordStore;

    fn scored_sheet() -> Scoresheet {
        let mut sheet = Scoresheet::new();
        let a = sheet.add("김서연", "난초").unwrap();
        let b = sheet.add("이도윤", "천자문").unwrap();
        let c = sheet.add("박지훈", "반야심경").unwrap();
        sheet.set_scores(a, [Some(90.0), Some(90.0), Some(90.0)]).unwrap();
        sheet.set_scores(b, [Some(80.0), Some(80.0), Some(80.0)]).unwrap();
        sheet.set_scores(c, [Some(95.0), Some(95.0), Some(95.0)]).unwrap();
        sheet
    }

    fn ranks(sheet: &Scoresheet) -> Vec<Option<u32>> {
        sheet.records().iter().map(|r| r.rank()).collect()
    }

    #[test]
    fn test_new_sheet_empty() {
        let sheet = Scoresheet::new();
        assert_eq!(sheet.version, 1);
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_add_assigns_ids_and_positions() {
        let mut sheet = Scoresheet::new();
        assert_eq!(sheet.add("a", "x").unwrap(), 1);
        assert_eq!(sheet.add("b", "y").unwrap(), 2);
        let positions: Vec<usize> = sheet.records().iter().map(|r| r.position).collect();
        assert_eq!(positions, vec![1, 2]);
        assert!(sheet.get(2).unwrap().rank().is_none());
    }

    #[test]
    fn test_scores_recompute_ranks() {
        let sheet = scored_sheet();
        assert_eq!(ranks(&sheet), vec![Some(2), Some(3), Some(1)]);
        assert_eq!(sheet.get(3).unwrap().grade_label(), "수");
    }

    #[test]
    fn test_set_sub_score_recomputes_on_every_change() {
        let mut sheet = scored_sheet();
        sheet.set_sub_score(2, 0, None).unwrap();
        assert_eq!(ranks(&sheet), vec![Some(2), None, Some(1)]);
        assert_eq!(sheet.get(2).unwrap().average(), None);

        sheet.set_sub_score(2, 0, Some(110.0)).unwrap();
        assert_eq!(sheet.get(2).unwrap().grade_label(), "");

        sheet.set_sub_score(2, 0, Some(98.0)).unwrap();
        // (98 + 80 + 80) / 3 = 86.0
        assert_eq!(sheet.get(2).unwrap().average(), Some(86.0));
        assert_eq!(ranks(&sheet), vec![Some(2), Some(3), Some(1)]);
    }

    #[test]
    fn test_invalid_slot_and_unknown_id() {
        let mut sheet = scored_sheet();
        assert_eq!(sheet.set_sub_score(1, 3, Some(50.0)), Err(SheetError::InvalidSlot(4)));
        assert_eq!(sheet.set_sub_score(42, 0, Some(50.0)), Err(SheetError::UnknownRecord(42)));
        assert_eq!(sheet.remove(42).unwrap_err(), SheetError::UnknownRecord(42));
    }

    #[test]
    fn test_remove_renumbers_positions_but_keeps_ids() {
        let mut sheet = scored_sheet();
        let removed = sheet.remove(1).unwrap();
        assert_eq!(removed.id, 1);

        let rows: Vec<(u64, usize)> = sheet.records().iter().map(|r| (r.id, r.position)).collect();
        assert_eq!(rows, vec![(2, 1), (3, 2)]);
        assert_eq!(ranks(&sheet), vec![Some(2), Some(1)]);

        assert_eq!(sheet.add("최하은", "묵죽").unwrap(), 4);
    }

    #[test]
    fn test_restore_puts_entry_back() {
        let mut sheet = scored_sheet();
        let removed = sheet.remove(2).unwrap();
        sheet.restore(removed.clone()).unwrap();

        let ids: Vec<u64> = sheet.records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(ranks(&sheet), vec![Some(2), Some(3), Some(1)]);
        assert_eq!(sheet.restore(removed), Err(SheetError::DuplicateId(2)));
    }

    #[test]
    fn test_feedback_and_rename() {
        let mut sheet = scored_sheet();
        sheet.set_feedback(1, Some("  필력이 좋음 ")).unwrap();
        assert_eq!(sheet.get(1).unwrap().feedback.as_deref(), Some("필력이 좋음"));
        sheet.set_feedback(1, Some("   ")).unwrap();
        assert!(sheet.get(1).unwrap().feedback.is_none());

        sheet.rename(1, " 김서연 ", "묵란").unwrap();
        assert_eq!(sheet.get(1).unwrap().work_title, "묵란");
        assert_eq!(sheet.get(1).unwrap().contestant, "김서연");
    }

    #[test]
    fn test_ids_not_reused_after_reload() {
        let store: RecordStore = scratch_store("sheet_ids");
        let mut sheet = scored_sheet();
        sheet.remove(3).unwrap();
        store.save(&sheet).unwrap();

        let mut loaded: Scoresheet = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(ranks(&loaded), vec![Some(1), Some(2)]);
        assert_eq!(loaded.add("new", "").unwrap(), 4);

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_after_load_repairs_hand_edited_file() {
        let json = r#"{
            "version": 1,
            "next_id": 1,
            "records": [
                {"id": 5, "position": 9, "sub_scores": [70.0, 70.0, 70.0]},
                {"id": 2, "position": 3, "sub_scores": [90.0, 90.0, 90.0], "rank": 7}
            ]
        }"#;
        let mut sheet: Scoresheet = serde_json::from_str(json).unwrap();
        sheet.after_load().unwrap();

        let rows: Vec<(u64, usize, Option<u32>)> = sheet
            .records()
            .iter()
            .map(|r| (r.id, r.position, r.rank()))
            .collect();
        assert_eq!(rows, vec![(2, 1, Some(1)), (5, 2, Some(2))]);
        assert_eq!(sheet.add("x", "").unwrap(), 6);
    }

    #[test]
    fn test_load_fails_when_last_id_is_taken() {
        let store = scratch_store("sheet_id_exhausted");
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(
            store.path_for::<Scoresheet>(),
            r#"{"version":1,"next_id":1,"records":[{"id":18446744073709551615,"position":1}]}"#,
        )
        .unwrap();

        let err = store.load::<Scoresheet>().unwrap_err();
        assert_eq!(
            err.downcast_ref::<StoreError>(),
            Some(&StoreError::IdSpaceExhausted { kind: "scoresheet", last: u64::MAX })
        );

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[test]
    fn test_add_fails_instead_of_wrapping_ids() {
        let json = r#"{"version": 1, "next_id": 18446744073709551615, "records": []}"#;
        let mut sheet: Scoresheet = serde_json::from_str(json).unwrap();
        sheet.after_load().unwrap();

        assert!(matches!(
            sheet.add("x", ""),
            Err(SheetError::Store(StoreError::IdSpaceExhausted { .. }))
        ));
        assert!(sheet.is_empty());
    }
}
