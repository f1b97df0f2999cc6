//! Logging infrastructure for Circuit.
//!
//! Provides centralized tracing setup for the CLI.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with the default `info` level
///
/// `RUST_LOG` overrides the level when set.
pub fn init() {
    init_with_level("info")
}

/// Initialize logging with a specific default level
///
/// # Arguments
/// * `default_level` - Default log level (debug, info, warn, error)
///
/// Logs go to stderr so command output on stdout stays parseable.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
