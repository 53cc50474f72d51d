pub mod commands;

use tracing_subscriber::EnvFilter;

/// Initialize tracing from the configured level; RUST_LOG overrides when
/// set. Safe to call once per process, after config load.
pub fn init_logging(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
