//! Tracing setup for the silhouette binary and tests.
//!
//! Everything is written to stderr; stdout carries only JSON results.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Level used when neither RUST_LOG nor `-v` asks for more
pub const DEFAULT_LEVEL: &str = "warn";

/// Map a `-v` count to a filter level: 0 warn, 1 info, 2 debug, 3+ trace
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => DEFAULT_LEVEL,
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the stderr subscriber at the default level
pub fn init() {
    init_with_level(DEFAULT_LEVEL)
}

/// Install the stderr subscriber; RUST_LOG still overrides `default_level`
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
