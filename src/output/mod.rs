pub mod export;
pub mod formatter;

pub use export::{export_scoresheet, format_schedule_markdown, ExportFormat, ExportOrder};
pub use formatter::{
    format_record_detail, format_schedule, format_scoresheet_table, format_summary,
    should_use_colors,
};
