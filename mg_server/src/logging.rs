//! Structured logging configuration.
//!
//! The engine logs through the `log` facade; those records are forwarded into
//! the same `tracing` subscriber as the HTTP layer.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels come from `RUST_LOG`, defaulting to `info,sqlx=warn`.
///
/// ```no_run
/// mg_server::logging::init();
/// tracing::info!("Server starting");
/// ```
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log API request/response
pub fn log_api_request(method: &str, path: &str, status_code: u16, duration_ms: u64) {
    if duration_ms > 1000 {
        tracing::warn!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "Slow API request"
        );
    } else {
        tracing::info!(
            http_method = method,
            http_path = path,
            http_status = status_code,
            duration_ms = duration_ms,
            "API request completed"
        );
    }
}
