use crate::config::Config;
use crate::ranking::{parse_sub_score, results_order, ScoreRecord, SUB_SCORE_COUNT};
use crate::schedule::Schedule;
use crate::sheet::Scoresheet;
use crate::store::RecordStore;
use crate::tui::theme::{resolve_theme, Theme, ThemeColors};
use ratatui::widgets::TableState;
use std::collections::VecDeque;
use std::time::Instant;

const MAX_UNDO: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Scores,
    Results,
    Schedule,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditTarget {
    Score { id: u64, slot: usize },
    Add,
    Rename { id: u64 },
    Feedback { id: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Editing(EditTarget),
    Help,
}

#[derive(Debug, Clone)]
pub enum UndoAction {
    Added {
        id: u64,
    },
    Removed {
        record: ScoreRecord,
    },
    ScoresChanged {
        id: u64,
        previous: [Option<f64>; SUB_SCORE_COUNT],
    },
    FeedbackChanged {
        id: u64,
        previous: Option<String>,
    },
    Renamed {
        id: u64,
        contestant: String,
        work_title: String,
    },
}

pub struct App {
    pub config: Config,
    store: RecordStore,
    pub sheet: Scoresheet,
    pub schedule: Schedule,
    pub table_state: TableState,
    pub current_view: View,
    pub input_mode: InputMode,
    pub input: String,
    pub flash_message: Option<(String, Instant)>,
    pub undo_stack: VecDeque<UndoAction>,
    pub should_quit: bool,
    pub theme: Theme,
    pub theme_colors: ThemeColors,
}

/// Split "contestant / work" as typed into the add and rename popups.
fn split_name_and_work(input: &str) -> (&str, &str) {
    match input.split_once('/') {
        Some((name, work)) => (name.trim(), work.trim()),
        None => (input.trim(), ""),
    }
}

impl App {
    pub fn new(config: Config, store: RecordStore, sheet: Scoresheet, schedule: Schedule) -> Self {
        let theme = resolve_theme(config.theme);
        Self::with_theme(config, store, sheet, schedule, theme)
    }

    pub fn with_theme(
        config: Config,
        store: RecordStore,
        sheet: Scoresheet,
        schedule: Schedule,
        theme: Theme,
    ) -> Self {
        let mut table_state = TableState::default();
        if !sheet.is_empty() {
            table_state.select(Some(0));
        }

        Self {
            config,
            store,
            sheet,
            schedule,
            table_state,
            current_view: View::Scores,
            input_mode: InputMode::Normal,
            input: String::new(),
            flash_message: None,
            undo_stack: VecDeque::new(),
            should_quit: false,
            theme,
            theme_colors: theme.colors(),
        }
    }

    /// Records shown in the current view. Empty for the schedule tab.
    pub fn current_records(&self) -> Vec<&ScoreRecord> {
        match self.current_view {
            View::Scores => self.sheet.records().iter().collect(),
            View::Results => results_order(self.sheet.records()),
            View::Schedule => Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        match self.current_view {
            View::Schedule => self.schedule.entries().len(),
            _ => self.sheet.len(),
        }
    }

    pub fn next_row(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_record(&self) -> Option<&ScoreRecord> {
        let i = self.table_state.selected()?;
        self.current_records().get(i).copied()
    }

    fn selected_id(&self) -> Option<u64> {
        self.selected_record().map(|r| r.id)
    }

    /// Keep the cursor on an entry after an edit moved it (results order changes with scores)
    fn select_id(&mut self, id: u64) {
        let idx = self.current_records().iter().position(|r| r.id == id);
        if idx.is_some() {
            self.table_state.select(idx);
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.row_count();
        if len == 0 {
            self.table_state.select(None);
        } else {
            match self.table_state.selected() {
                Some(i) if i >= len => self.table_state.select(Some(len - 1)),
                None => self.table_state.select(Some(0)),
                _ => {}
            }
        }
    }

    pub fn push_undo(&mut self, action: UndoAction) {
        self.undo_stack.push_front(action);
        if self.undo_stack.len() > MAX_UNDO {
            self.undo_stack.pop_back();
        }
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    /// Write the sheet to disk, reporting failures in the status bar.
    fn persist(&mut self) -> bool {
        match self.store.save(&self.sheet) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("failed to save scoresheet: {:#}", e);
                self.show_flash(format!("Failed to save: {}", e));
                false
            }
        }
    }

    fn is_record_view(&self) -> bool {
        matches!(self.current_view, View::Scores | View::Results)
    }

    fn start_editing(&mut self, target: EditTarget, prefill: String) {
        self.input = prefill;
        self.input_mode = InputMode::Editing(target);
    }

    /// Edit one judge's score (slot is 0-based) for the selected entry
    pub fn start_score_input(&mut self, slot: usize) {
        if !self.is_record_view() || slot >= SUB_SCORE_COUNT {
            return;
        }
        let (id, current) = match self.selected_record() {
            Some(r) => (r.id, r.sub_scores()[slot]),
            None => return,
        };
        let prefill = current.map(|v| v.to_string()).unwrap_or_default();
        self.start_editing(EditTarget::Score { id, slot }, prefill);
    }

    pub fn start_add_input(&mut self) {
        if self.is_record_view() {
            self.start_editing(EditTarget::Add, String::new());
        }
    }

    pub fn start_rename_input(&mut self) {
        if !self.is_record_view() {
            return;
        }
        let (id, prefill) = match self.selected_record() {
            Some(r) if r.work_title.is_empty() => (r.id, r.contestant.clone()),
            Some(r) => (r.id, format!("{} / {}", r.contestant, r.work_title)),
            None => return,
        };
        self.start_editing(EditTarget::Rename { id }, prefill);
    }

    pub fn start_feedback_input(&mut self) {
        if !self.is_record_view() {
            return;
        }
        let (id, prefill) = match self.selected_record() {
            Some(r) => (r.id, r.feedback.clone().unwrap_or_default()),
            None => return,
        };
        self.start_editing(EditTarget::Feedback { id }, prefill);
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    /// Apply the popup input to the sheet, save, and record an undo step
    pub fn confirm_input(&mut self) {
        let target = match std::mem::replace(&mut self.input_mode, InputMode::Normal) {
            InputMode::Editing(target) => target,
            other => {
                self.input_mode = other;
                return;
            }
        };
        let input = std::mem::take(&mut self.input);

        match target {
            EditTarget::Score { id, slot } => self.apply_score(id, slot, &input),
            EditTarget::Add => self.apply_add(&input),
            EditTarget::Rename { id } => self.apply_rename(id, &input),
            EditTarget::Feedback { id } => self.apply_feedback(id, &input),
        }
    }

    fn apply_score(&mut self, id: u64, slot: usize, input: &str) {
        let trimmed = input.trim();
        let value = if trimmed.is_empty() || trimmed == "-" {
            None
        } else {
            match parse_sub_score(trimmed) {
                Some(v) => Some(v),
                None => {
                    self.show_flash(format!("Invalid score: '{}'", trimmed));
                    return;
                }
            }
        };

        let previous = match self.sheet.get(id) {
            Some(r) => *r.sub_scores(),
            None => return,
        };
        if let Err(e) = self.sheet.set_sub_score(id, slot, value) {
            self.show_flash(format!("Failed to update score: {}", e));
            return;
        }
        self.push_undo(UndoAction::ScoresChanged { id, previous });
        self.select_id(id);

        if self.persist() {
            let label = self.config.judge_label(slot);
            let msg = match self.sheet.get(id) {
                Some(r) if value.is_some() && r.sub_scores().iter().all(Option::is_some) && !r.is_ranked() => {
                    format!("Invalid score: {} must be 0-100, entry left unranked", label)
                }
                Some(r) => format!("Scored: {} ({})", r.contestant, label),
                None => return,
            };
            self.show_flash(msg);
        }
    }

    fn apply_add(&mut self, input: &str) {
        let (contestant, work) = split_name_and_work(input);
        if contestant.is_empty() {
            self.show_flash("Invalid entry: contestant name is required".to_string());
            return;
        }
        let id = match self.sheet.add(contestant, work) {
            Ok(id) => id,
            Err(e) => {
                self.show_flash(format!("Failed to add: {}", e));
                return;
            }
        };
        self.push_undo(UndoAction::Added { id });
        self.select_id(id);
        if self.persist() {
            self.show_flash(format!("Added: {} (z to undo)", contestant));
        }
    }

    fn apply_rename(&mut self, id: u64, input: &str) {
        let (contestant, work) = split_name_and_work(input);
        if contestant.is_empty() {
            self.show_flash("Invalid entry: contestant name is required".to_string());
            return;
        }
        let (old_contestant, old_work) = match self.sheet.get(id) {
            Some(r) => (r.contestant.clone(), r.work_title.clone()),
            None => return,
        };
        if let Err(e) = self.sheet.rename(id, contestant, work) {
            self.show_flash(format!("Failed to rename: {}", e));
            return;
        }
        self.push_undo(UndoAction::Renamed {
            id,
            contestant: old_contestant,
            work_title: old_work,
        });
        if self.persist() {
            self.show_flash(format!("Renamed: {}", contestant));
        }
    }

    fn apply_feedback(&mut self, id: u64, input: &str) {
        let previous = match self.sheet.get(id) {
            Some(r) => r.feedback.clone(),
            None => return,
        };
        if let Err(e) = self.sheet.set_feedback(id, Some(input)) {
            self.show_flash(format!("Failed to save feedback: {}", e));
            return;
        }
        self.push_undo(UndoAction::FeedbackChanged { id, previous });
        if self.persist() {
            let msg = if input.trim().is_empty() {
                "Feedback cleared"
            } else {
                "Feedback saved"
            };
            self.show_flash(msg.to_string());
        }
    }

    /// Delete the selected entry (z brings it back)
    pub fn delete_selected(&mut self) {
        if !self.is_record_view() {
            return;
        }
        let id = match self.selected_id() {
            Some(id) => id,
            None => return,
        };
        let record = match self.sheet.remove(id) {
            Ok(record) => record,
            Err(e) => {
                self.show_flash(format!("Failed to delete: {}", e));
                return;
            }
        };
        let name = record.contestant.clone();
        self.push_undo(UndoAction::Removed { record });
        self.clamp_selection();
        if self.persist() {
            self.show_flash(format!("Deleted: {} (z to undo)", name));
        }
    }

    /// Undo the last edit
    pub fn undo_last(&mut self) {
        let action = match self.undo_stack.pop_front() {
            Some(action) => action,
            None => {
                self.show_flash("Nothing to undo".to_string());
                return;
            }
        };

        let result = match action {
            UndoAction::Added { id } => self.sheet.remove(id).map(|r| format!("Undid add: {}", r.contestant)),
            UndoAction::Removed { record } => {
                let id = record.id;
                let name = record.contestant.clone();
                self.sheet.restore(record).map(|_| {
                    self.select_id(id);
                    format!("Restored: {}", name)
                })
            }
            UndoAction::ScoresChanged { id, previous } => self
                .sheet
                .set_scores(id, previous)
                .map(|_| "Undid score change".to_string()),
            UndoAction::FeedbackChanged { id, previous } => self
                .sheet
                .set_feedback(id, previous.as_deref())
                .map(|_| "Undid feedback change".to_string()),
            UndoAction::Renamed {
                id,
                contestant,
                work_title,
            } => self
                .sheet
                .rename(id, &contestant, &work_title)
                .map(|_| format!("Undid rename: {}", contestant)),
        };

        match result {
            Ok(msg) => {
                self.clamp_selection();
                if self.persist() {
                    self.show_flash(msg);
                }
            }
            Err(e) => self.show_flash(format!("Failed to undo: {}", e)),
        }
    }

    /// Cycle Scores -> Results -> Schedule
    pub fn toggle_view(&mut self) {
        self.current_view = match self.current_view {
            View::Scores => View::Results,
            View::Results => View::Schedule,
            View::Schedule => View::Scores,
        };

        // Reset selection to first item in the new view, or None if empty
        if self.row_count() == 0 {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(0));
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.theme_colors = self.theme.colors();
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Save and leave. A failed save is logged and printed once the terminal is restored.
    pub fn save_and_quit(&mut self) {
        self.persist();
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::storage::scratch_store;

    fn app(name: &str) -> App {
        let store = scratch_store(name);
        let mut sheet = Scoresheet::new();
        let a = sheet.add("김서연", "난초").unwrap();
        let b = sheet.add("이도윤", "천자문").unwrap();
        sheet.set_scores(a, [Some(90.0), Some(90.0), Some(90.0)]).unwrap();
        sheet.set_scores(b, [Some(96.0), Some(95.0), Some(97.0)]).unwrap();
        App::with_theme(Config::default(), store, sheet, Schedule::new(), Theme::Dark)
    }

    fn type_text(app: &mut App, text: &str) {
        app.input = text.to_string();
        app.confirm_input();
    }

    #[test]
    fn test_split_name_and_work() {
        assert_eq!(split_name_and_work(" 김서연 / 난초 "), ("김서연", "난초"));
        assert_eq!(split_name_and_work("박민준"), ("박민준", ""));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app("tui_nav");
        assert_eq!(app.table_state.selected(), Some(0));
        app.next_row();
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(0));
        app.previous_row();
        assert_eq!(app.table_state.selected(), Some(1));
    }

    #[test]
    fn test_results_view_orders_by_rank() {
        let mut app = app("tui_results");
        app.toggle_view();
        assert_eq!(app.current_view, View::Results);
        assert_eq!(app.selected_record().unwrap().contestant, "이도윤");
        app.toggle_view();
        assert_eq!(app.current_view, View::Schedule);
        assert_eq!(app.table_state.selected(), None);
        assert!(app.selected_record().is_none());
    }

    #[test]
    fn test_score_edit_recomputes_and_saves() {
        let mut app = app("tui_score");
        app.start_score_input(0);
        assert_eq!(app.input, "90");
        type_text(&mut app, "99");

        let record = app.sheet.records()[0].clone();
        assert_eq!(record.sub_scores()[0], Some(99.0));
        assert_eq!(record.average(), Some(93.0));
        assert_eq!(record.rank(), Some(2));

        let reloaded: Scoresheet = app.store.load().unwrap();
        assert_eq!(reloaded.records()[0].average(), Some(93.0));
    }

    #[test]
    fn test_invalid_score_is_rejected() {
        let mut app = app("tui_bad_score");
        app.start_score_input(1);
        type_text(&mut app, "abc");
        assert_eq!(app.sheet.records()[0].sub_scores()[1], Some(90.0));
        assert!(app.flash_message.as_ref().unwrap().0.starts_with("Invalid score"));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_out_of_range_score_unranks() {
        let mut app = app("tui_range");
        app.start_score_input(2);
        type_text(&mut app, "120");
        let record = &app.sheet.records()[0];
        assert!(!record.is_ranked());
        assert_eq!(record.grade_label(), "");
        assert!(app.flash_message.as_ref().unwrap().0.contains("unranked"));
    }

    #[test]
    fn test_delete_and_undo() {
        let mut app = app("tui_delete");
        app.delete_selected();
        assert_eq!(app.sheet.len(), 1);
        assert_eq!(app.sheet.records()[0].position, 1);

        app.undo_last();
        assert_eq!(app.sheet.len(), 2);
        assert_eq!(app.sheet.records()[0].contestant, "김서연");
        assert_eq!(app.sheet.records()[0].rank(), Some(2));

        app.undo_last();
        assert_eq!(app.flash_message.as_ref().unwrap().0, "Nothing to undo");
    }

    #[test]
    fn test_add_rename_feedback_undo() {
        let mut app = app("tui_add");
        app.start_add_input();
        type_text(&mut app, "박민준 / 반야심경");
        assert_eq!(app.sheet.len(), 3);
        assert_eq!(app.selected_record().unwrap().contestant, "박민준");
        assert_eq!(app.selected_record().unwrap().work_title, "반야심경");

        app.start_rename_input();
        assert_eq!(app.input, "박민준 / 반야심경");
        type_text(&mut app, "박민서");
        assert_eq!(app.selected_record().unwrap().work_title, "");

        app.start_feedback_input();
        type_text(&mut app, "획이 힘차다");
        assert_eq!(app.selected_record().unwrap().feedback.as_deref(), Some("획이 힘차다"));

        app.undo_last();
        assert_eq!(app.selected_record().unwrap().feedback, None);
        app.undo_last();
        assert_eq!(app.selected_record().unwrap().contestant, "박민준");
        app.undo_last();
        assert_eq!(app.sheet.len(), 2);
    }

    #[test]
    fn test_add_requires_name() {
        let mut app = app("tui_add_empty");
        app.start_add_input();
        type_text(&mut app, " / 난초");
        assert_eq!(app.sheet.len(), 2);
        assert!(app.undo_stack.is_empty());
    }

    #[test]
    fn test_theme_toggle() {
        let mut app = app("tui_theme");
        app.toggle_theme();
        assert_eq!(app.theme, Theme::Light);
    }
}
