pub mod config;
pub mod logging;
pub mod output;
pub mod ranking;
pub mod schedule;
pub mod sheet;
pub mod stderr_buffer;
pub mod store;
pub mod tui;
