//! Diagnostic logging setup.
//!
//! Logs go to stderr so they never interleave with the transcript on stdout.

use tracing_subscriber::EnvFilter;

use crate::core::constants::LOG_ENV;

/// Default filter directive for the number of `-v` flags.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the global subscriber. `GEMCHAT_LOG` wins over `verbosity`.
/// Calling this twice is harmless; the second call does nothing.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
