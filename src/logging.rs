use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::stderr_buffer::BufferedStderr;

/// Filter directive used when RUST_LOG is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "seoye_judge=debug,warn"
    } else {
        "seoye_judge=warn"
    }
}

/// Initialize logging with tracing.
///
/// Events go to stderr through the stderr buffer, so they are held back while
/// the TUI owns the terminal. `RUST_LOG` overrides the default filter; the
/// `verbose` flag switches the default to debug.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(BufferedStderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false)
                .without_time(),
        )
        .try_init();

    if result.is_err() {
        crate::buffered_eprintln!("Logging was already initialized");
    }
}
