//! Tracing subscriber setup
//!
//! The engine itself only emits `tracing` events; embedding services call
//! [`init`] once at startup (or install their own subscriber).

use tracing_subscriber::EnvFilter;

/// Initialize a formatted subscriber. `RUST_LOG` wins over `level`.
/// Safe to call more than once; later calls are no-ops.
pub fn init(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Like [`init`] but emitting one JSON object per event, for deployments
/// shipping logs to a collector.
pub fn init_json(level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init();
}
