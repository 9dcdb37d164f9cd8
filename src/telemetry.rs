//! Telemetry logic.
//! Support logging through `tracing`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Install a global `fmt` subscriber filtered by `RUST_LOG`.
///
/// Defaults to `info` when `RUST_LOG` is unset or invalid.
///
/// # Errors
///
/// Returns `Err` if a global subscriber is already set.
pub fn setup_logging() -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
}
