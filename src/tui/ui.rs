use ratatui::prelude::*;
use ratatui::widgets::{Block, Cell, Clear, Paragraph, Row, Table, Tabs};

use crate::output::formatter::{format_average, format_rank, format_sub_score, format_summary, format_time_span, truncate_display};
use crate::ranking::is_valid_score;
use crate::tui::app::{App, EditTarget, InputMode, View};
use crate::tui::theme::ThemeColors;

pub fn draw(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Handle very small terminal sizes gracefully
    if area.height < 6 || area.width < 40 {
        let msg = Paragraph::new("Terminal too small").alignment(Alignment::Center);
        frame.render_widget(msg, area);
        return;
    }

    // Layout: Title(1) + Tabs(1) + Table(fill) + Status(1)
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
        Constraint::Length(1),
    ])
    .split(area);

    render_title(frame, chunks[0], app);
    render_tabs(frame, chunks[1], app);
    match app.current_view {
        View::Scores | View::Results => render_score_table(frame, chunks[2], app),
        View::Schedule => render_schedule_table(frame, chunks[2], app),
    }
    render_status_bar(frame, chunks[3], app);

    match &app.input_mode {
        InputMode::Editing(target) => {
            let title = popup_title(app, target);
            render_input_popup(frame, app, &title);
        }
        InputMode::Help => render_help_popup(frame, &app.theme_colors),
        InputMode::Normal => {}
    }
}

fn render_title(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.theme_colors;
    let mut spans = vec![Span::styled(
        app.config.competition.clone(),
        Style::default().fg(colors.title_color).bold(),
    )];

    if !app.sheet.is_empty() {
        let summary = format_summary(app.sheet.records());
        let padding_len = (area.width as usize)
            .saturating_sub(Span::raw(app.config.competition.as_str()).width() + Span::raw(summary.as_str()).width());
        spans.push(Span::raw(" ".repeat(padding_len)));
        spans.push(Span::styled(summary, Style::default().fg(colors.muted)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.theme_colors;
    let selected = match app.current_view {
        View::Scores => 0,
        View::Results => 1,
        View::Schedule => 2,
    };

    let tabs = Tabs::new(vec!["Scores", "Results", "Schedule"])
        .select(selected)
        .style(colors.tab_inactive_style)
        .highlight_style(colors.tab_active_style.reversed())
        .divider(" | ");

    frame.render_widget(tabs, area);
}

fn render_score_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let colors = app.theme_colors.clone();
    let records = app.current_records();

    if records.is_empty() {
        let empty_msg = Paragraph::new("No entries yet. Press a to add one.")
            .alignment(Alignment::Center)
            .block(Block::default());
        frame.render_widget(empty_msg, area);
        return;
    }

    let rows: Vec<Row> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let grade_color = colors.grade_color(record.grade());

            let mut cells = vec![
                Cell::from(format!("{}.", record.position)).style(Style::default().fg(colors.index_color)),
                Cell::from(truncate_display(&record.contestant, 20)),
                Cell::from(truncate_display(&record.work_title, 24)),
            ];
            for score in record.sub_scores() {
                let style = match score {
                    Some(v) if !is_valid_score(*v) => Style::default().fg(colors.invalid_score).bold(),
                    None => Style::default().fg(colors.unranked),
                    _ => Style::default(),
                };
                cells.push(Cell::from(Line::from(format_sub_score(*score)).right_aligned()).style(style));
            }
            cells.push(Cell::from(Line::from(format_average(record.average())).right_aligned()));
            cells.push(
                Cell::from(Line::from(record.grade_label()).centered())
                    .style(Style::default().fg(grade_color).bold()),
            );
            cells.push(
                Cell::from(Line::from(format_rank(record.rank())).right_aligned())
                    .style(Style::default().fg(grade_color)),
            );
            cells.push(Cell::from(if record.feedback.is_some() { "✎" } else { "" }));

            // Alternating row background (odd rows get subtle background)
            let row_style = if idx % 2 == 1 {
                Style::default().bg(colors.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(cells).style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(4),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(7),
        Constraint::Length(5),
        Constraint::Length(4),
        Constraint::Length(1),
    ];

    let mut header = vec!["No.".to_string(), "Contestant".to_string(), "Work".to_string()];
    header.extend(app.config.judge_labels().iter().map(|l| truncate_display(l, 7)));
    header.extend(["Avg", "Grade", "Rank", ""].map(String::from));

    let table = Table::new(rows, widths)
        .header(Row::new(header).style(colors.header_style).bottom_margin(1))
        .row_highlight_style(colors.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_schedule_table(frame: &mut Frame, area: Rect, app: &mut App) {
    let colors = &app.theme_colors;
    let entries = app.schedule.entries();

    if entries.is_empty() {
        let empty_msg = Paragraph::new("No schedule entries. Use `seoye-judge schedule add`.")
            .alignment(Alignment::Center);
        frame.render_widget(empty_msg, area);
        return;
    }

    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let row_style = if idx % 2 == 1 {
                Style::default().bg(colors.row_alt_bg)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format_time_span(entry)).style(Style::default().fg(colors.title_color)),
                Cell::from(entry.title.clone()),
                Cell::from(entry.venue.clone().unwrap_or_default()).style(Style::default().fg(colors.muted)),
            ])
            .style(row_style)
        })
        .collect();

    let widths = [Constraint::Length(18), Constraint::Fill(2), Constraint::Fill(1)];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Time", "Event", "Venue"])
                .style(colors.header_style)
                .bottom_margin(1),
        )
        .row_highlight_style(colors.row_selected);

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let colors = &app.theme_colors;
    let text = if let Some((ref msg, _)) = app.flash_message {
        let msg_color = if msg.starts_with("Failed") || msg.starts_with("Invalid") || msg.starts_with("Nothing") {
            colors.flash_error
        } else {
            colors.flash_success
        };
        Line::from(Span::styled(msg.clone(), Style::default().fg(msg_color)))
    } else {
        let hints: Vec<(&str, &str)> = match app.current_view {
            View::Scores | View::Results => vec![
                ("j/k", ":nav "),
                ("1-3", ":score "),
                ("a", ":add "),
                ("e", ":edit "),
                ("f", ":feedback "),
                ("d", ":delete "),
                ("z", ":undo "),
                ("Tab", ":view "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
            View::Schedule => vec![
                ("j/k", ":nav "),
                ("t", ":theme "),
                ("Tab", ":view "),
                ("?", ":help "),
                ("q", ":quit"),
            ],
        };

        let mut spans = Vec::new();
        for (i, (key, label)) in hints.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(*key, Style::default().fg(colors.status_key_color)));
            spans.push(Span::raw(*label));
        }
        Line::from(spans)
    };

    frame.render_widget(
        Paragraph::new(text).style(Style::default().bg(colors.status_bar_bg)),
        area,
    );
}

fn popup_title(app: &App, target: &EditTarget) -> String {
    let name = |id: u64| {
        app.sheet
            .get(id)
            .map(|r| r.contestant.clone())
            .unwrap_or_default()
    };
    match target {
        EditTarget::Score { id, slot } => format!(" {}: {} ", name(*id), app.config.judge_label(*slot)),
        EditTarget::Add => " New entry (name / work) ".to_string(),
        EditTarget::Rename { id } => format!(" Rename {} (name / work) ", name(*id)),
        EditTarget::Feedback { id } => format!(" Feedback for {} ", name(*id)),
    }
}

/// Render the text input popup
fn render_input_popup(frame: &mut Frame, app: &App, title: &str) {
    let colors = &app.theme_colors;
    let popup_area = centered_rect_fixed(56, 5, frame.area());

    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(title.to_string(), colors.popup_title))
        .border_style(Style::default().fg(colors.popup_border))
        .style(Style::default().bg(colors.popup_bg));
    frame.render_widget(block.clone(), popup_area);

    let inner = block.inner(popup_area);
    let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(inner);

    let input_text = format!("{}|", app.input);
    frame.render_widget(Paragraph::new(input_text), chunks[0]);

    let help = Paragraph::new("Enter: save | Esc: cancel | empty score = unset")
        .style(Style::default().fg(colors.muted));
    frame.render_widget(help, chunks[1]);
}

/// Create a centered rectangle with fixed width and height
fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect {
        x,
        y,
        width,
        height,
    }
}

fn render_help_popup(frame: &mut Frame, colors: &ThemeColors) {
    let shortcuts = [
        ("j / Down      ", "Move down"),
        ("k / Up        ", "Move up"),
        ("1 / 2 / 3     ", "Enter judge score"),
        ("a             ", "Add contestant"),
        ("e             ", "Edit name / work"),
        ("f             ", "Write feedback"),
        ("d             ", "Delete entry"),
        ("z             ", "Undo last edit"),
        ("Tab           ", "Scores / Results / Schedule"),
        ("t             ", "Toggle dark/light theme"),
        ("?             ", "Show/hide this help"),
        ("q / Ctrl-c    ", "Save and quit"),
    ];

    let popup_area = centered_rect_fixed(50, shortcuts.len() as u16 + 4, frame.area());
    frame.render_widget(Clear, popup_area);

    let block = Block::bordered()
        .title(Span::styled(" Keyboard Shortcuts ", colors.popup_title))
        .border_style(Style::default().fg(colors.popup_border))
        .style(Style::default().bg(colors.popup_bg));
    frame.render_widget(block.clone(), popup_area);
    let inner = block.inner(popup_area);

    let mut help_lines: Vec<Line> = shortcuts
        .iter()
        .map(|(key, desc)| {
            Line::from(vec![
                Span::styled(*key, Style::default().fg(colors.status_key_color).bold()),
                Span::raw(*desc),
            ])
        })
        .collect();
    help_lines.push(Line::from(""));
    help_lines.push(Line::from(Span::styled(
        "Press any key to close",
        Style::default().fg(colors.muted),
    )));

    frame.render_widget(Paragraph::new(help_lines), inner);
}
