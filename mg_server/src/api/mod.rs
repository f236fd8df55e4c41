//! HTTP API for the mini-games server.
//!
//! A chat transport (bot, bridge) turns chat events into these calls: a
//! challenge becomes `POST /games`, a button press becomes an action, and
//! every plain message is forwarded to the chat's message endpoint so that
//! text-driven games can pick up numbers.
//!
//! # Endpoints
//!
//! ```text
//! GET  /health                                         - Health check
//! POST /api/v1/games                                   - Start a game from a challenge
//! GET  /api/v1/games/{id}                              - Current session state
//! POST /api/v1/games/{id}/actions                      - Apply a player action
//! POST /api/v1/chats/{chat_id}/messages                - Route free text to a waiting game
//! GET  /api/v1/chats/{chat_id}/players/{user_id}/stats - Player statistics
//! GET  /api/v1/chats/{chat_id}/leaderboard             - Top players by points
//! ```
//!
//! # Errors
//!
//! Failures are JSON `{"error": "..."}`. A finished or expired session is
//! `404` with `game already over`; a rejected action is `400` with the reason.
//!
//! # CORS
//!
//! CORS is configured permissively. Restrict origins in front of the server
//! when it is exposed publicly.

pub mod games;
pub mod request_id;
pub mod stats;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use mini_games::{
    SessionError, SessionManager,
    db::Database,
    stats::{StatsError, StatsRepository},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::metrics;

/// Application state shared across all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub session_manager: Arc<SessionManager>,
    pub stats: Arc<dyn StatsRepository>,
    /// Set when statistics are stored in PostgreSQL; checked by `/health`.
    pub database: Option<Database>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Map a session failure to its HTTP response.
pub(crate) fn session_error(err: SessionError) -> ApiError {
    let (status, reason) = match &err {
        SessionError::SessionNotFound(_) => (StatusCode::NOT_FOUND, "session_not_found"),
        SessionError::InvalidAction(_) => (StatusCode::BAD_REQUEST, "invalid_action"),
    };
    metrics::actions_rejected(reason);
    error_response(status, err.client_message())
}

pub(crate) fn stats_error(err: StatsError) -> ApiError {
    tracing::error!("Statistics query failed: {}", err);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err.client_message())
}

/// Create the complete API router with all endpoints and middleware.
///
/// ```rust,no_run
/// # use mg_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let root_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    let game_routes = Router::new()
        .route("/games", post(games::create_game))
        .route("/games/{session_id}", get(games::get_game))
        .route("/games/{session_id}/actions", post(games::take_action))
        .route("/chats/{chat_id}/messages", post(games::chat_message));

    let stats_routes = Router::new()
        .route(
            "/chats/{chat_id}/players/{user_id}/stats",
            get(stats::player_stats),
        )
        .route("/chats/{chat_id}/leaderboard", get(stats::leaderboard));

    Router::new().merge(game_routes).merge(stats_routes)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the statistics database (if any) answers, and
/// `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","database":null,"sessions":{"active_count":2,"expired_total":0},...}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_healthy = match &state.database {
        Some(db) => Some(db.health_check().await.is_ok()),
        None => None,
    };
    let overall_healthy = db_healthy.unwrap_or(true);

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if overall_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_healthy,
        "sessions": {
            "active_count": state.session_manager.active_count().await,
            "expired_total": state.session_manager.expired_total(),
        },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
