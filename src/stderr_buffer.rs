use std::io::{self, Write};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

/// Activate buffering. While active, log lines are stored instead of
/// being printed to stderr.
pub fn activate() {
    if let Ok(mut guard) = BUFFER.lock() {
        *guard = Some(Vec::new());
    }
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    BUFFER
        .lock()
        .ok()
        .and_then(|mut guard| guard.take())
        .unwrap_or_default()
}

/// Write a message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn emit(msg: String) {
    let Ok(mut guard) = BUFFER.lock() else {
        eprintln!("{}", msg);
        return;
    };
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// `MakeWriter` for the log subscriber that routes every formatted event
/// through [`emit`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferedStderr;

impl<'a> MakeWriter<'a> for BufferedStderr {
    type Writer = EventWriter;

    fn make_writer(&'a self) -> Self::Writer {
        EventWriter(Vec::new())
    }
}

/// Collects one formatted event and emits it when dropped.
pub struct EventWriter(Vec<u8>);

impl Write for EventWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for EventWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.0);
        let text = text.trim_end();
        if !text.is_empty() {
            emit(text.to_string());
        }
    }
}

/// Convenience macro that works like `eprintln!` but routes through the
/// stderr buffer when it is active.
#[macro_export]
macro_rules! buffered_eprintln {
    ($($arg:tt)*) => {
        $crate::stderr_buffer::emit(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test touches the global buffer so parallel tests cannot interleave.
    #[test]
    fn test_buffer_collects_until_drained() {
        activate();
        emit("first".to_string());
        {
            let mut writer = BufferedStderr.make_writer();
            writer.write_all(b"WARN second\n").unwrap();
        }
        {
            // Blank events are dropped
            let mut writer = BufferedStderr.make_writer();
            writer.write_all(b"\n").unwrap();
        }
        assert_eq!(drain(), vec!["first".to_string(), "WARN second".to_string()]);
        assert!(drain().is_empty());
    }
}
