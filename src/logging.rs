//! Logging setup.
//!
//! Library code only emits `tracing` events; binaries call [`init`] once.

use tracing_subscriber::{EnvFilter, fmt};

/// Install the global fmt subscriber.
///
/// The filter is read from `RUST_LOG` and falls back to `info`, e.g.
/// `RUST_LOG=reelprint=debug reelprint slip shipment.json`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Verbose subscriber for tests. Safe to call more than once.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
