//! Logging configuration for saiku-embed.
//!
//! Rendered output goes to stdout, so diagnostics are written to stderr to
//! keep the two streams separable.

use tracing_subscriber::EnvFilter;

/// Default filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Initializes logging to stderr.
///
/// Honors `RUST_LOG`; falls back to `info`. Safe to call more than once,
/// later calls are ignored.
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Builds the env filter from `RUST_LOG`, or the default filter.
fn build_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
