//! Diagnostic logging setup.
//!
//! Uses the `tracing` ecosystem. Diagnostics go to stderr; the per-file
//! progress listing on stdout comes from [`crate::output`] and is not affected
//! by log levels.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the global subscriber.
///
/// * `verbose` - enables DEBUG (every scale/crop decision); otherwise only
///   warnings are shown, since stdout already lists each file.
/// * `json_format` - structured JSON lines instead of human-readable output.
///
/// The `RUST_LOG` environment variable overrides the level.
pub fn init(verbose: bool, json_format: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
