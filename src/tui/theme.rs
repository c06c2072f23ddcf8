//! Theme palettes for the TUI and dark/light detection

use ratatui::prelude::*;

use crate::config::ThemeMode;
use crate::ranking::Grade;

/// Resolved theme (never Auto)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors::dark(),
            Theme::Light => ThemeColors::light(),
        }
    }
}

/// Resolve the configured mode. Auto asks the terminal for its background
/// luminance and falls back to dark when the terminal doesn't answer.
pub fn resolve_theme(mode: ThemeMode) -> Theme {
    match mode {
        ThemeMode::Dark => Theme::Dark,
        ThemeMode::Light => Theme::Light,
        ThemeMode::Auto => match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Theme::Light,
            Ok(_) => Theme::Dark,
            Err(e) => {
                tracing::debug!("terminal background detection failed: {}", e);
                Theme::Dark
            }
        },
    }
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Grade colors, best to worst
    pub grade_su: Color,
    pub grade_u: Color,
    pub grade_mi: Color,
    pub grade_yang: Color,
    pub grade_ga: Color,

    pub invalid_score: Color,
    pub unranked: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub index_color: Color,
    pub header_style: Style,
    pub row_selected: Style,

    pub muted: Color,
    pub title_color: Color,

    pub tab_active_style: Style,
    pub tab_inactive_style: Style,

    // Status bar
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Popups
    pub popup_border: Color,
    pub popup_title: Style,
    pub popup_bg: Color,
}

impl ThemeColors {
    pub fn dark() -> Self {
        Self {
            grade_su: Color::Magenta,
            grade_u: Color::Cyan,
            grade_mi: Color::Green,
            grade_yang: Color::Yellow,
            grade_ga: Color::Gray,
            invalid_score: Color::Red,
            unranked: Color::DarkGray,
            row_alt_bg: Color::Indexed(235),
            index_color: Color::DarkGray,
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Gray,
            title_color: Color::Cyan,
            tab_active_style: Style::new().fg(Color::Cyan).bold(),
            tab_inactive_style: Style::new().fg(Color::DarkGray),
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
            popup_bg: Color::Indexed(234),
        }
    }

    pub fn light() -> Self {
        Self {
            grade_su: Color::Rgb(128, 0, 128),
            grade_u: Color::Rgb(0, 95, 135),
            grade_mi: Color::Rgb(0, 110, 0),
            grade_yang: Color::Rgb(150, 100, 0),
            grade_ga: Color::Rgb(90, 90, 90),
            invalid_score: Color::Rgb(180, 0, 0),
            unranked: Color::Rgb(150, 150, 150),
            row_alt_bg: Color::Indexed(254),
            index_color: Color::Rgb(120, 120, 120),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            muted: Color::Rgb(100, 100, 100),
            title_color: Color::Rgb(0, 95, 135),
            tab_active_style: Style::new().fg(Color::Rgb(0, 95, 135)).bold(),
            tab_inactive_style: Style::new().fg(Color::Rgb(150, 150, 150)),
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Rgb(0, 95, 135),
            flash_success: Color::Rgb(0, 110, 0),
            flash_error: Color::Rgb(180, 0, 0),
            popup_border: Color::Rgb(0, 95, 135),
            popup_title: Style::new().fg(Color::Rgb(0, 95, 135)).bold(),
            popup_bg: Color::Indexed(255),
        }
    }

    /// Color for a grade cell; unranked entries are dimmed
    pub fn grade_color(&self, grade: Option<Grade>) -> Color {
        match grade {
            Some(Grade::Su) => self.grade_su,
            Some(Grade::U) => self.grade_u,
            Some(Grade::Mi) => self.grade_mi,
            Some(Grade::Yang) => self.grade_yang,
            Some(Grade::Ga) => self.grade_ga,
            None => self.unranked,
        }
    }
}
