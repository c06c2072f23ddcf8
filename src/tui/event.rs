use crossterm::event::{self, KeyEvent, KeyEventKind};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub enum Event {
    Key(KeyEvent),
    Tick,
}

/// Polls the terminal for key presses, yielding a tick when nothing arrives
/// within the tick rate.
pub struct EventHandler {
    tick_rate: Duration,
    last_tick: Instant,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            tick_rate: Duration::from_millis(tick_rate_ms),
            last_tick: Instant::now(),
        }
    }

    pub fn next(&mut self) -> std::io::Result<Event> {
        loop {
            let timeout = self.tick_rate.saturating_sub(self.last_tick.elapsed());
            if event::poll(timeout)? {
                if let event::Event::Key(key) = event::read()? {
                    // Filter for Press only (Windows compatibility)
                    if key.kind == KeyEventKind::Press {
                        return Ok(Event::Key(key));
                    }
                }
                // Resize and other events just trigger a redraw
                if self.last_tick.elapsed() < self.tick_rate {
                    return Ok(Event::Tick);
                }
            }
            if self.last_tick.elapsed() >= self.tick_rate {
                self.last_tick = Instant::now();
                return Ok(Event::Tick);
            }
        }
    }
}
