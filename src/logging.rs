//! Logging and tracing utilities for provider binaries.
//!
//! Conversions in this crate emit `tracing` events: drift detection is logged
//! at `debug`, unchanged values at `trace`, and failed conversions at `warn`.
//! The helpers below install a subscriber that writes to **stderr**, since
//! stdout belongs to the plugin handshake.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls log levels (e.g., `info`, `immuta_provider_attrs=debug`)
//!
//! # Examples
//!
//! ```bash
//! # Log every detected drift
//! RUST_LOG=immuta_provider_attrs=debug ./terraform-provider-immuta
//!
//! # Also log values that were kept as-is
//! RUST_LOG=immuta_provider_attrs=trace ./terraform-provider-immuta
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_LEVEL: &str = "info";

/// Initialize the default logging subscriber.
///
/// Reads `RUST_LOG` and falls back to `info`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default(DEFAULT_LEVEL);
}

/// Initialize logging with a custom default level.
///
/// Like [`init_logging`], but `default_level` (e.g. `"debug"`) is used when
/// `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(stderr_layer())
        .init();
}

/// Try to initialize logging, returning false if already initialized.
///
/// Useful in tests, where several cases may race to install a subscriber.
pub fn try_init_logging() -> bool {
    tracing_subscriber::registry()
        .with(env_filter(DEFAULT_LEVEL))
        .with(stderr_layer())
        .try_init()
        .is_ok()
}

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn stderr_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
}
