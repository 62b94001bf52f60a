//! Logging initialization for binaries embedding the engine.
//!
//! The library itself never initializes a subscriber — only emits
//! `tracing` events. This module is opt-in scaffolding for the thin
//! exerciser binary and for integration tests that want readable output.

use tracing_subscriber::EnvFilter;

/// Initialize a process-wide `tracing` subscriber reading `RUST_LOG`
/// (defaulting to `info`). Safe to call more than once; later calls are
/// no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    #[cfg(feature = "telemetry-json")]
    let subscriber = tracing_subscriber::fmt().json().with_env_filter(filter).finish();
    #[cfg(not(feature = "telemetry-json"))]
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
