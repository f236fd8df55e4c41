//! Game session handlers.
//!
//! Start a game:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/games \
//!   -H "Content-Type: application/json" \
//!   -d '{"game_type":"tic_tac_toe","chat_id":42,
//!        "challenger":{"id":1,"name":"alice"},"opponent":{"id":2,"name":"bob"}}'
//! ```
//!
//! Press a button:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/games/<id>/actions \
//!   -H "Content-Type: application/json" \
//!   -d '{"player_id":1,"action":{"type":"place","value":4}}'
//! ```

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mini_games::{
    Challenge,
    entities::{Action, ChatId, PlayerId},
    session::{ActionReport, Session, SessionId},
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, request_id::RequestId, session_error};
use crate::metrics;

#[derive(Debug, Serialize, Deserialize)]
pub struct ActionRequest {
    pub player_id: PlayerId,
    pub action: Action,
}

/// A plain chat message forwarded by the transport.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    pub player_id: PlayerId,
    pub text: String,
}

/// Start a game from an accepted challenge.
///
/// # Errors
///
/// - `400 Bad Request`: Self-play or a bot opponent
pub async fn create_game(
    State(state): State<AppState>,
    request_id: RequestId,
    Json(challenge): Json<Challenge>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let game_type = challenge.game_type;
    let session_id = state
        .session_manager
        .create(challenge)
        .await
        .map_err(session_error)?;

    tracing::info!(
        request_id = request_id.as_str(),
        session_id = %session_id,
        "Game started"
    );
    metrics::sessions_created(game_type);

    let session = state
        .session_manager
        .get(&session_id)
        .await
        .map_err(session_error)?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Current state of a running game.
///
/// # Errors
///
/// - `404 Not Found`: The game finished or expired
pub async fn get_game(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    state
        .session_manager
        .get(&SessionId::from(session_id))
        .await
        .map(Json)
        .map_err(session_error)
}

/// Apply one player action, typically a button press.
///
/// # Errors
///
/// - `400 Bad Request`: The action was rejected; the game is unchanged
/// - `404 Not Found`: The game finished or expired
pub async fn take_action(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<ActionReport>, ApiError> {
    let report = state
        .session_manager
        .apply_action(&SessionId::from(session_id), request.player_id, request.action)
        .await
        .map_err(session_error)?;

    metrics::sessions_completed(report.game_type, &report.transition.outcome);
    Ok(Json(report))
}

/// Offer a chat message to the text-driven game waiting on its sender.
///
/// Returns `204 No Content` when the message isn't a number or no game is
/// waiting on the sender, so the transport can ignore it.
pub async fn chat_message(
    State(state): State<AppState>,
    Path(chat_id): Path<ChatId>,
    Json(request): Json<ChatMessageRequest>,
) -> Response {
    match state
        .session_manager
        .route_text(chat_id, request.player_id, &request.text)
        .await
    {
        None => StatusCode::NO_CONTENT.into_response(),
        Some(Ok(report)) => {
            metrics::sessions_completed(report.game_type, &report.transition.outcome);
            Json(report).into_response()
        }
        Some(Err(err)) => session_error(err).into_response(),
    }
}
