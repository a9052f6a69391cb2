//! # Logging
//!
//! Console logging setup for binaries and tests embedding the engine. The
//! library itself only emits `tracing` events; nothing in the matching path
//! assumes a subscriber is installed.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize a console subscriber, at most once per process.
///
/// The filter comes from `SHOTQUEUE_LOG` (falling back to `RUST_LOG`, then
/// `info`). Safe to call from every test: if a global subscriber is already
/// installed the call is a no-op.
pub fn init_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_env("SHOTQUEUE_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(filter),
        );

        // Another subscriber (embedding application, test harness) may have
        // won the race; that is fine.
        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already initialized");
        }
    });
}
