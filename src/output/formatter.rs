use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::ranking::{grade_distribution, is_valid_score, Grade, ScoreRecord};
use crate::schedule::ScheduleEntry;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Format one judge's score: "95", "87.5", "-" when unset.
/// Values outside 0-100 get a trailing "!" so they stand out.
pub fn format_sub_score(score: Option<f64>) -> String {
    match score {
        None => "-".to_string(),
        Some(v) => {
            let text = if v.fract() == 0.0 {
                format!("{:.0}", v)
            } else {
                format!("{}", v)
            };
            if is_valid_score(v) {
                text
            } else {
                format!("{}!", text)
            }
        }
    }
}

/// Format an average with one decimal, "-" when absent
pub fn format_average(average: Option<f64>) -> String {
    average
        .map(|avg| format!("{:.1}", avg))
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_rank(rank: Option<u32>) -> String {
    rank.map(|r| r.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Truncate to a display width, accounting for double-width Hangul
pub fn truncate_display(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let budget = if max_width > 3 { max_width - 3 } else { max_width };
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    if max_width > 3 {
        out.push_str("...");
    }
    out
}

/// Left-align to a display width
fn pad_right(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(pad))
}

/// Right-align to a display width
fn pad_left(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.width());
    format!("{}{}", " ".repeat(pad), text)
}

fn color_grade(text: &str, grade: Option<Grade>) -> String {
    match grade {
        Some(Grade::Su) => text.green().bold().to_string(),
        Some(Grade::U) => text.cyan().to_string(),
        Some(Grade::Mi) => text.yellow().to_string(),
        Some(Grade::Yang) => text.magenta().to_string(),
        Some(Grade::Ga) => text.red().to_string(),
        None => text.dimmed().to_string(),
    }
}

/// Format the scoresheet as a table with a header row.
///
/// Columns: No., Contestant, Work, one per judge, Average, Grade, Rank.
/// Contestant and work columns shrink to fit the terminal; pipes get full text.
pub fn format_scoresheet_table(
    records: &[&ScoreRecord],
    judge_labels: &[String],
    use_colors: bool,
) -> String {
    if records.is_empty() {
        return "No entries yet.".to_string();
    }

    let score_width = judge_labels
        .iter()
        .map(|l| l.width())
        .max()
        .unwrap_or(0)
        .max(5);
    let no_width = 3;
    let avg_width = 7;
    let grade_width = 5;
    let rank_width = 4;
    let separator = "  ";

    let mut name_width = records
        .iter()
        .map(|r| r.contestant.width())
        .max()
        .unwrap_or(0)
        .max("Contestant".len());
    let mut work_width = records
        .iter()
        .map(|r| r.work_title.width())
        .max()
        .unwrap_or(0)
        .max("Work".len());

    if let Some(term_width) = get_terminal_width() {
        let fixed = no_width
            + score_width * judge_labels.len()
            + avg_width
            + grade_width
            + rank_width
            + separator.len() * (judge_labels.len() + 5);
        let available = term_width.saturating_sub(fixed).max(20);
        if name_width + work_width > available {
            name_width = name_width.min(available / 2).max(6);
            work_width = available.saturating_sub(name_width).max(6);
        }
    }

    let mut header = vec![
        pad_left("No.", no_width),
        pad_right("Contestant", name_width),
        pad_right("Work", work_width),
    ];
    for label in judge_labels {
        header.push(pad_left(label, score_width));
    }
    header.push(pad_left("Average", avg_width));
    header.push(pad_right("Grade", grade_width));
    header.push(pad_left("Rank", rank_width));
    let header_line = header.join(separator);
    let header_line = if use_colors {
        header_line.bold().to_string()
    } else {
        header_line
    };

    let mut lines = vec![header_line];
    for record in records {
        let no = pad_left(&format!("{}.", record.position), no_width);
        let name = pad_right(&truncate_display(&record.contestant, name_width), name_width);
        let work = pad_right(&truncate_display(&record.work_title, work_width), work_width);
        let scores: Vec<String> = record
            .sub_scores()
            .iter()
            .map(|s| pad_left(&format_sub_score(*s), score_width))
            .collect();
        let average = pad_left(&format_average(record.average()), avg_width);
        let grade = pad_right(record.grade_label(), grade_width);
        let rank = pad_left(&format_rank(record.rank()), rank_width);

        let line = if use_colors {
            let mut cells = vec![no.dimmed().to_string(), name.bold().to_string(), work];
            cells.extend(scores);
            cells.push(average);
            cells.push(color_grade(&grade, record.grade()));
            cells.push(color_grade(&rank, record.grade()));
            cells.join(separator)
        } else {
            let mut cells = vec![no, name, work];
            cells.extend(scores);
            cells.push(average);
            cells.push(grade);
            cells.push(rank);
            cells.join(separator)
        };
        lines.push(line.trim_end().to_string());
    }

    lines.join("\n")
}

/// One-line summary: entry count, ranked count and grade distribution
pub fn format_summary(records: &[ScoreRecord]) -> String {
    let ranked = records.iter().filter(|r| r.is_ranked()).count();
    let distribution = grade_distribution(records)
        .into_iter()
        .map(|(grade, count)| format!("{} {}", grade, count))
        .collect::<Vec<_>>()
        .join(" · ");
    format!(
        "{} entries, {} ranked  ({})",
        records.len(),
        ranked,
        distribution
    )
}

/// Format a single entry with detailed multi-line output
pub fn format_record_detail(record: &ScoreRecord, judge_labels: &[String], use_colors: bool) -> String {
    let scores = judge_labels
        .iter()
        .zip(record.sub_scores().iter())
        .map(|(label, score)| format!("  {}: {}", label, format_sub_score(*score)))
        .collect::<Vec<_>>()
        .join("\n");
    let feedback = record.feedback.as_deref().unwrap_or("(none)");
    let title = format!("#{} {}", record.id, record.contestant);

    if use_colors {
        format!(
            "{}\n  Work: {}\n  Position: {}\n{}\n  Average: {}\n  Grade: {}\n  Rank: {}\n  Feedback: {}",
            title.bold(),
            record.work_title.cyan(),
            record.position,
            scores,
            format_average(record.average()),
            color_grade(record.grade_label(), record.grade()),
            format_rank(record.rank()),
            feedback
        )
    } else {
        format!(
            "{}\n  Work: {}\n  Position: {}\n{}\n  Average: {}\n  Grade: {}\n  Rank: {}\n  Feedback: {}",
            title,
            record.work_title,
            record.position,
            scores,
            format_average(record.average()),
            record.grade_label(),
            format_rank(record.rank()),
            feedback
        )
    }
}

/// Time span of a schedule entry: "10/20 09:00-10:00" or "10/20 09:00"
pub fn format_time_span(entry: &ScheduleEntry) -> String {
    let start = entry.starts_at.format("%m/%d %H:%M").to_string();
    match entry.ends_at() {
        Some(end) if end.date() == entry.starts_at.date() => {
            format!("{}-{}", start, end.format("%H:%M"))
        }
        Some(end) => format!("{}-{}", start, end.format("%m/%d %H:%M")),
        None => start,
    }
}

/// Format the schedule as one line per entry
pub fn format_schedule(entries: &[ScheduleEntry], use_colors: bool) -> String {
    if entries.is_empty() {
        return "No schedule entries.".to_string();
    }

    let span_width = entries
        .iter()
        .map(|e| format_time_span(e).width())
        .max()
        .unwrap_or(0);

    entries
        .iter()
        .map(|entry| {
            let span = pad_right(&format_time_span(entry), span_width);
            let id = format!("[{}]", entry.id);
            let venue = entry
                .venue
                .as_deref()
                .map(|v| format!(" @ {}", v))
                .unwrap_or_default();
            if use_colors {
                format!("{}  {}{}  {}", span.cyan(), entry.title.bold(), venue.yellow(), id.dimmed())
            } else {
                format!("{}  {}{}  {}", span, entry.title, venue, id)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{parse_start, Schedule};
    use crate::sheet::Scoresheet;

    fn labels() -> Vec<String> {
        vec!["J1".to_string(), "J2".to_string(), "J3".to_string()]
    }

    fn sample_sheet() -> Scoresheet {
        let mut sheet = Scoresheet::new();
        let a = sheet.add("김서연", "난초").unwrap();
        let b = sheet.add("Lee", "Thousand Character Classic").unwrap();
        sheet.add("Park", "").unwrap();
        sheet.set_scores(a, [Some(100.0), Some(90.0), Some(95.0)]).unwrap();
        sheet.set_scores(b, [Some(80.0), Some(80.5), Some(130.0)]).unwrap();
        sheet
    }

    #[test]
    fn test_format_sub_score() {
        assert_eq!(format_sub_score(Some(95.0)), "95");
        assert_eq!(format_sub_score(Some(87.5)), "87.5");
        assert_eq!(format_sub_score(None), "-");
        assert_eq!(format_sub_score(Some(130.0)), "130!");
    }

    #[test]
    fn test_format_average_and_rank() {
        assert_eq!(format_average(Some(95.0)), "95.0");
        assert_eq!(format_average(None), "-");
        assert_eq!(format_rank(Some(3)), "3");
        assert_eq!(format_rank(None), "-");
    }

    #[test]
    fn test_truncate_display_ascii() {
        assert_eq!(truncate_display("Short title", 20), "Short title");
        assert_eq!(truncate_display("This is a very long title", 15), "This is a ve...");
        assert_eq!(truncate_display("Hello world", 3), "Hel");
    }

    #[test]
    fn test_truncate_display_hangul() {
        // Each syllable is two columns wide
        assert_eq!(truncate_display("서예대전", 8), "서예대전");
        assert_eq!(truncate_display("제일회서예대전", 9), "제일회...");
    }

    #[test]
    fn test_table_empty() {
        assert_eq!(format_scoresheet_table(&[], &labels(), false), "No entries yet.");
    }

    #[test]
    fn test_table_rows() {
        let sheet = sample_sheet();
        let records: Vec<&ScoreRecord> = sheet.records().iter().collect();
        let table = format_scoresheet_table(&records, &labels(), false);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("Contestant"));
        assert!(lines[0].contains("J2"));
        assert!(lines[1].starts_with(" 1."));
        assert!(lines[1].contains("95.0"));
        assert!(lines[1].contains("수"));
        assert!(lines[2].contains("130!"));
        assert!(lines[2].contains("80.5"));
        assert!(lines[3].contains("Park"));
        assert!(lines[3].ends_with('-'));
    }

    #[test]
    fn test_summary() {
        let sheet = sample_sheet();
        let summary = format_summary(sheet.records());
        assert!(summary.starts_with("3 entries, 1 ranked"));
        assert!(summary.contains("수 1"));
        assert!(summary.contains("가 0"));
    }

    #[test]
    fn test_record_detail() {
        let sheet = sample_sheet();
        let detail = format_record_detail(sheet.get(1).unwrap(), &labels(), false);
        assert!(detail.starts_with("#1 김서연"));
        assert!(detail.contains("Work: 난초"));
        assert!(detail.contains("J1: 100"));
        assert!(detail.contains("Average: 95.0"));
        assert!(detail.contains("Rank: 1"));
        assert!(detail.contains("Feedback: (none)"));
    }

    #[test]
    fn test_schedule_lines() {
        let mut schedule = Schedule::new();
        schedule
            .add(parse_start("2026-10-20 09:00").unwrap(), "접수", Some("1h"), Some("로비"))
            .unwrap();
        schedule
            .add(parse_start("2026-10-20 14:00").unwrap(), "시상식", None, None)
            .unwrap();

        let text = format_schedule(schedule.entries(), false);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "10/20 09:00-10:00  접수 @ 로비  [1]");
        assert!(lines[1].starts_with("10/20 14:00"));
        assert!(lines[1].ends_with("시상식  [2]"));
    }

    #[test]
    fn test_schedule_empty() {
        assert_eq!(format_schedule(&[], false), "No schedule entries.");
    }
}
