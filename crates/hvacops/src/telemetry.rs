//! Tracing subscriber initialization for host processes.
//!
//! Filter priority, highest first: `HVACOPS_LOG`, `RUST_LOG`, the configured
//! `log_filter`. The storage layer logs through the `log` facade, so a
//! `LogTracer` bridge is installed alongside the subscriber.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Initializes the global subscriber. Safe to call more than once; a second
/// call (tests, re-entrant hosts) is a no-op.
pub fn init_tracing(default_filter: &str) {
    let filter = env_filter(default_filter);

    let fmt_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    let _ = tracing_log::LogTracer::init();
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn env_filter(default_filter: &str) -> EnvFilter {
    for var in ["HVACOPS_LOG", "RUST_LOG"] {
        if let Ok(directives) = std::env::var(var) {
            if !directives.is_empty() {
                if let Ok(filter) = EnvFilter::try_new(&directives) {
                    return filter;
                }
            }
        }
    }
    EnvFilter::try_new(default_filter).unwrap_or_else(|_| EnvFilter::new("info"))
}
