use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::store::{id_after, Document, StoreError};

const START_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid start time '{0}' (use YYYY-MM-DD HH:MM)")]
    InvalidStart(String),
    #[error("Invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: String },
    #[error("Schedule entry title must not be empty")]
    EmptyTitle,
    #[error("No schedule entry with id {0}")]
    UnknownEntry(u64),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parse a local start time such as `2026-10-20 10:00`.
pub fn parse_start(input: &str) -> Result<NaiveDateTime, ScheduleError> {
    let input = input.trim();
    START_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .ok_or_else(|| ScheduleError::InvalidStart(input.to_string()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: u64,
    pub starts_at: NaiveDateTime,
    /// Human-friendly length, e.g. "30m" or "1h 30m"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
}

impl ScheduleEntry {
    pub fn duration(&self) -> Option<Duration> {
        self.duration
            .as_deref()
            .and_then(|d| humantime::parse_duration(d).ok())
    }

    pub fn ends_at(&self) -> Option<NaiveDateTime> {
        let length = chrono::Duration::from_std(self.duration()?).ok()?;
        self.starts_at.checked_add_signed(length)
    }
}

/// Competition timetable, kept sorted by start time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub version: u32,
    #[serde(default = "first_id")]
    next_id: u64,
    #[serde(default)]
    entries: Vec<ScheduleEntry>,
}

fn first_id() -> u64 {
    1
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

impl Document for Schedule {
    const KIND: &'static str = "schedule";
    const VERSION: u32 = 1;

    fn version(&self) -> u32 {
        self.version
    }

    fn after_load(&mut self) -> Result<(), StoreError> {
        let max_id = self.entries.iter().map(|e| e.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(id_after(Self::KIND, max_id)?);
        self.entries.sort_by_key(|e| e.starts_at);
        Ok(())
    }
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            next_id: first_id(),
            entries: Vec::new(),
        }
    }

    /// Entries in start order; entries starting together keep insertion order.
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(
        &mut self,
        starts_at: NaiveDateTime,
        title: &str,
        duration: Option<&str>,
        venue: Option<&str>,
    ) -> Result<u64, ScheduleError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ScheduleError::EmptyTitle);
        }

        let duration = match duration.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => {
                humantime::parse_duration(d).map_err(|e| ScheduleError::InvalidDuration {
                    input: d.to_string(),
                    reason: e.to_string(),
                })?;
                Some(d.to_string())
            }
            None => None,
        };

        let id = self.next_id;
        self.next_id = id_after(Self::KIND, id)?;

        let entry = ScheduleEntry {
            id,
            starts_at,
            duration,
            title: title.to_string(),
            venue: venue
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        };

        let idx = self
            .entries
            .iter()
            .position(|e| e.starts_at > starts_at)
            .unwrap_or(self.entries.len());
        self.entries.insert(idx, entry);
        tracing::debug!(id, %starts_at, "added schedule entry");
        Ok(id)
    }

    pub fn remove(&mut self, id: u64) -> Result<ScheduleEntry, ScheduleError> {
        let idx = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(ScheduleError::UnknownEntry(id))?;
        Ok(self.entries.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        parse_start(s).unwrap()
    }

    #[test]
    fn test_parse_start_formats() {
        let expected = at("2026-10-20 10:00");
        assert_eq!(parse_start("2026-10-20T10:00").unwrap(), expected);
        assert_eq!(parse_start(" 2026-10-20 10:00:00 ").unwrap(), expected);
    }

    #[test]
    fn test_parse_start_rejects_garbage() {
        assert_eq!(
            parse_start("tomorrow"),
            Err(ScheduleError::InvalidStart("tomorrow".to_string()))
        );
        assert!(parse_start("2026-13-01 10:00").is_err());
    }

    #[test]
    fn test_entries_sorted_by_start() {
        let mut schedule = Schedule::new();
        schedule.add(at("2026-10-20 14:00"), "시상식", None, None).unwrap();
        schedule.add(at("2026-10-20 09:00"), "접수", Some("1h"), Some("로비")).unwrap();
        schedule.add(at("2026-10-20 14:00"), "폐회", None, None).unwrap();

        let titles: Vec<&str> = schedule.entries().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["접수", "시상식", "폐회"]);
    }

    #[test]
    fn test_ends_at_from_duration() {
        let mut schedule = Schedule::new();
        let id = schedule
            .add(at("2026-10-20 10:00"), "심사", Some("1h 30m"), None)
            .unwrap();
        let entry = schedule.entries().iter().find(|e| e.id == id).unwrap();
        assert_eq!(entry.ends_at(), Some(at("2026-10-20 11:30")));
    }

    #[test]
    fn test_rejects_bad_input() {
        let mut schedule = Schedule::new();
        let start = at("2026-10-20 10:00");
        assert_eq!(schedule.add(start, "  ", None, None), Err(ScheduleError::EmptyTitle));
        assert!(matches!(
            schedule.add(start, "심사", Some("soon"), None),
            Err(ScheduleError::InvalidDuration { .. })
        ));
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut schedule = Schedule::new();
        let id = schedule.add(at("2026-10-20 10:00"), "심사", None, None).unwrap();
        assert_eq!(schedule.remove(id).unwrap().title, "심사");
        assert_eq!(schedule.remove(id), Err(ScheduleError::UnknownEntry(id)));

        let next = schedule.add(at("2026-10-20 11:00"), "휴식", None, None).unwrap();
        assert_eq!(next, id + 1);
    }

    #[test]
    fn test_last_id_is_never_reused() {
        let json = r#"{"version":1,"next_id":1,"entries":[
            {"id":18446744073709551615,"starts_at":"2026-10-20T10:00:00","title":"심사"}
        ]}"#;
        let mut schedule: Schedule = serde_json::from_str(json).unwrap();
        assert_eq!(
            schedule.after_load(),
            Err(StoreError::IdSpaceExhausted { kind: "schedule", last: u64::MAX })
        );

        let mut schedule = Schedule::new();
        schedule.next_id = u64::MAX;
        assert!(matches!(
            schedule.add(at("2026-10-20 10:00"), "심사", None, None),
            Err(ScheduleError::Store(StoreError::IdSpaceExhausted { .. }))
        ));
        assert!(schedule.is_empty());
    }
}
