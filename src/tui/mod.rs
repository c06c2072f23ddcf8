pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};

pub fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    let mut events = EventHandler::new(250);

    let result = event_loop(&mut terminal, &mut events, &mut app);

    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    events: &mut EventHandler,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        match events.next()? {
            Event::Key(key) => handle_key_event(app, key),
            Event::Tick => app.update_flash(),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.save_and_quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.save_and_quit()
            }

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),

            // Judge columns
            KeyCode::Char(c @ '1'..='3') => {
                let slot = c as usize - '1' as usize;
                app.start_score_input(slot);
            }

            KeyCode::Char('a') => app.start_add_input(),
            KeyCode::Char('e') => app.start_rename_input(),
            KeyCode::Char('f') => app.start_feedback_input(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
            KeyCode::Char('z') => app.undo_last(),

            KeyCode::Tab => app.toggle_view(),
            KeyCode::Char('t') => app.toggle_theme(),
            KeyCode::Char('?') => app.show_help(),

            _ => {}
        },
        app::InputMode::Editing(_) => match key.code {
            KeyCode::Enter => app.confirm_input(),
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Backspace => {
                app.input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.input.push(c);
            }
            // Ignore all other keys (don't propagate to Normal mode)
            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}
