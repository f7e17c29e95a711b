//! Logging setup utilities for the Tandem binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for the given crates.
///
/// Crate names are normalized to their module path form (`tandem-server` → `tandem_server`).
pub fn default_directive(crate_names: &[&str], default_log_level: &str) -> String {
    crate_names
        .iter()
        .map(|name| format!("{}={}", name.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `crate_names` - Crates (library and binary) whose logs should be emitted
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use tandem_shared::logger::setup_logger;
///
/// setup_logger(&["tandem-server", "tandem-shared"], "debug");
/// ```
pub fn setup_logger(crate_names: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(crate_names, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
