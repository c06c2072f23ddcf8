pub mod types;

pub use types::{parse_start, Schedule, ScheduleEntry, ScheduleError};
