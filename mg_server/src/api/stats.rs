//! Statistics handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mini_games::{
    entities::{ChatId, GameType, PlayerId},
    stats::{DEFAULT_LEADERBOARD_LIMIT, GameStats, PlayerStats},
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState, error_response, stats_error};

/// Largest leaderboard a single request may ask for.
pub const MAX_LEADERBOARD_LIMIT: i64 = 100;

#[derive(Debug, Serialize, Deserialize)]
pub struct GameStatsItem {
    pub game_type: GameType,
    pub wins: i64,
    pub losses: i64,
    pub games_played: i64,
    pub win_rate: f64,
}

impl From<GameStats> for GameStatsItem {
    fn from(stats: GameStats) -> Self {
        Self {
            game_type: stats.game_type,
            wins: stats.wins,
            losses: stats.losses,
            games_played: stats.games_played(),
            win_rate: stats.win_rate(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerStatsResponse {
    pub player: PlayerStats,
    pub games: Vec<GameStatsItem>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

/// Overall and per-game record of a player in a chat.
///
/// # Errors
///
/// - `404 Not Found`: The player has never played in this chat
pub async fn player_stats(
    State(state): State<AppState>,
    Path((chat_id, user_id)): Path<(ChatId, PlayerId)>,
) -> Result<Json<PlayerStatsResponse>, ApiError> {
    let player = state
        .stats
        .player_stats(user_id, chat_id)
        .await
        .map_err(stats_error)?
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "no games played yet"))?;

    let games = state
        .stats
        .game_stats(user_id, chat_id)
        .await
        .map_err(stats_error)?
        .into_iter()
        .map(GameStatsItem::from)
        .collect();

    Ok(Json(PlayerStatsResponse { player, games }))
}

/// Top players of a chat by points.
///
/// `?limit=N` is clamped to `1..=100`.
pub async fn leaderboard(
    State(state): State<AppState>,
    Path(chat_id): Path<ChatId>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<PlayerStats>>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
        .clamp(1, MAX_LEADERBOARD_LIMIT);

    state
        .stats
        .leaderboard(chat_id, limit)
        .await
        .map(Json)
        .map_err(stats_error)
}
