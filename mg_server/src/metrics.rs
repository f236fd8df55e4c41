//! Prometheus metrics for the mini-games server.
//!
//! Metrics are exposed in Prometheus text format on a separate listener.
//! When no exporter is installed the recording calls are no-ops.
//!
//! ```rust,no_run
//! use mg_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", "/api/v1/games", 201);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use mini_games::{GameType, Outcome, SessionManager};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// How often the registry gauges are refreshed.
pub const SESSION_GAUGE_INTERVAL: Duration = Duration::from_secs(5);

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Session Metrics
// ============================================================================

pub fn sessions_created(game_type: GameType) {
    metrics::counter!("sessions_created_total",
        "game_type" => game_type.key()
    )
    .increment(1);
}

/// Record a session reaching a terminal outcome.
pub fn sessions_completed(game_type: GameType, outcome: &Outcome) {
    let result = match outcome {
        Outcome::Continue => return,
        Outcome::WinFor(_) => "win",
        Outcome::Draw => "draw",
    };
    metrics::counter!("sessions_completed_total",
        "game_type" => game_type.key(),
        "result" => result
    )
    .increment(1);
}

pub fn actions_rejected(reason: &'static str) {
    metrics::counter!("actions_rejected_total",
        "reason" => reason
    )
    .increment(1);
}

pub fn sessions_active(count: usize) {
    metrics::gauge!("sessions_active").set(count as f64);
}

/// Expiries are counted inside the registry; publish its running total.
pub fn sessions_expired_total(total: u64) {
    metrics::counter!("sessions_expired_total").absolute(total);
}

/// Periodically publish registry gauges until the runtime shuts down.
pub fn spawn_session_gauges(manager: Arc<SessionManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_GAUGE_INTERVAL);
        loop {
            ticker.tick().await;
            sessions_active(manager.active_count().await);
            sessions_expired_total(manager.expired_total());
        }
    })
}
