use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::Config;
use crate::ranking::{results_order, ScoreRecord};
use crate::schedule::ScheduleEntry;

use super::formatter::{format_average, format_rank, format_sub_score, format_summary, format_time_span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Tsv,
    #[value(alias = "md")]
    Markdown,
    Json,
}

/// Row order for exports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportOrder {
    /// Scoresheet order (No. column)
    Position,
    /// By rank, unranked last
    Results,
}

/// Snapshot written by the JSON export
#[derive(Debug, Serialize)]
struct ResultsSnapshot<'a> {
    competition: &'a str,
    judges: Vec<String>,
    records: Vec<&'a ScoreRecord>,
}

fn ordered(records: &[ScoreRecord], order: ExportOrder) -> Vec<&ScoreRecord> {
    match order {
        ExportOrder::Position => records.iter().collect(),
        ExportOrder::Results => results_order(records),
    }
}

/// Render the scoresheet in the requested format
pub fn export_scoresheet(
    records: &[ScoreRecord],
    config: &Config,
    format: ExportFormat,
    order: ExportOrder,
) -> Result<String> {
    let rows = ordered(records, order);
    let labels = config.judge_labels();
    match format {
        ExportFormat::Csv => Ok(format_csv(&rows, &labels)),
        ExportFormat::Tsv => Ok(format_tsv(&rows)),
        ExportFormat::Markdown => Ok(format_markdown(&rows, records, config)),
        ExportFormat::Json => {
            let snapshot = ResultsSnapshot {
                competition: &config.competition,
                judges: labels,
                records: rows,
            };
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize results")
        }
    }
}

/// Quote a CSV field when it contains a delimiter, quote or line break (RFC 4180)
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn blank_if_dash(value: String) -> String {
    if value == "-" {
        String::new()
    } else {
        value
    }
}

/// CSV with a header row. Unset values are empty cells.
pub fn format_csv(records: &[&ScoreRecord], judge_labels: &[String]) -> String {
    let mut header = vec!["No".to_string(), "Contestant".to_string(), "Work".to_string()];
    header.extend(judge_labels.iter().cloned());
    header.extend(["Average", "Grade", "Rank", "Feedback"].map(String::from));

    let mut lines = vec![header
        .iter()
        .map(|h| csv_field(h))
        .collect::<Vec<_>>()
        .join(",")];

    for record in records {
        let mut cells = vec![
            record.position.to_string(),
            csv_field(&record.contestant),
            csv_field(&record.work_title),
        ];
        cells.extend(
            record
                .sub_scores()
                .iter()
                .map(|s| s.map(|v| v.to_string()).unwrap_or_default()),
        );
        cells.push(blank_if_dash(format_average(record.average())));
        cells.push(record.grade_label().to_string());
        cells.push(blank_if_dash(format_rank(record.rank())));
        cells.push(csv_field(record.feedback.as_deref().unwrap_or("")));
        lines.push(cells.join(","));
    }

    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

fn tsv_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

/// Tab-separated values for scripting
/// Columns: no, contestant, work, scores..., average, grade, rank (no headers, no colors)
pub fn format_tsv(records: &[&ScoreRecord]) -> String {
    records
        .iter()
        .map(|record| {
            let mut cells = vec![
                record.position.to_string(),
                tsv_field(&record.contestant),
                tsv_field(&record.work_title),
            ];
            cells.extend(record.sub_scores().iter().map(|s| format_sub_score(*s)));
            cells.push(format_average(record.average()));
            cells.push(record.grade_label().to_string());
            cells.push(format_rank(record.rank()));
            cells.join("\t")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn md_cell(value: &str) -> String {
    value
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

/// Markdown report: results table followed by written feedback
pub fn format_markdown(rows: &[&ScoreRecord], all: &[ScoreRecord], config: &Config) -> String {
    let labels = config.judge_labels();
    let mut out = String::new();

    out.push_str(&format!("# {} Results\n\n", md_cell(&config.competition)));

    if rows.is_empty() {
        out.push_str("No entries yet.\n");
        return out;
    }

    out.push_str(&format!("{}\n\n", format_summary(all)));

    let mut header = vec!["Rank".to_string(), "No.".to_string(), "Contestant".to_string(), "Work".to_string()];
    header.extend(labels.iter().map(|l| md_cell(l)));
    header.extend(["Average".to_string(), "Grade".to_string()]);
    out.push_str(&format!("| {} |\n", header.join(" | ")));

    let mut align = vec!["---:", "---:", "---", "---"];
    align.extend(std::iter::repeat("---:").take(labels.len()));
    align.extend(["---:", ":---:"]);
    out.push_str(&format!("| {} |\n", align.join(" | ")));

    for record in rows {
        let mut cells = vec![
            format_rank(record.rank()),
            record.position.to_string(),
            md_cell(&record.contestant),
            md_cell(&record.work_title),
        ];
        cells.extend(record.sub_scores().iter().map(|s| format_sub_score(*s)));
        cells.push(format_average(record.average()));
        cells.push(record.grade_label().to_string());
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }

    let with_feedback: Vec<&&ScoreRecord> = rows.iter().filter(|r| r.feedback.is_some()).collect();
    if !with_feedback.is_empty() {
        out.push_str("\n## Feedback\n");
        for record in with_feedback {
            let heading = if record.work_title.is_empty() {
                record.contestant.clone()
            } else {
                format!("{} · {}", record.contestant, record.work_title)
            };
            out.push_str(&format!("\n### {}\n\n", heading));
            out.push_str(record.feedback.as_deref().unwrap_or_default());
            out.push('\n');
        }
    }

    out
}

/// Markdown timetable for the schedule
pub fn format_schedule_markdown(entries: &[ScheduleEntry], competition: &str) -> String {
    let mut out = format!("# {} Schedule\n\n", md_cell(competition));
    if entries.is_empty() {
        out.push_str("No schedule entries.\n");
        return out;
    }

    out.push_str("| Time | Event | Venue |\n");
    out.push_str("| --- | --- | --- |\n");
    for entry in entries {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            format_time_span(entry),
            md_cell(&entry.title),
            md_cell(entry.venue.as_deref().unwrap_or(""))
        ));
    }
    out
}
