//! Statistics repository: the trait the session layer records results
//! through, plus PostgreSQL and in-memory implementations.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::errors::StatsResult;
use super::models::{GameStats, PlayerStats};
use crate::db::timeouts::{DEFAULT_TRANSACTION_TIMEOUT, with_default_timeout, with_timeout};
use crate::game::entities::{ChatId, GameType, PlayerId};

/// Persistent per-chat win/loss counters.
#[async_trait]
pub trait StatsRepository: Send + Sync {
    /// Create the player's record in this chat if it doesn't exist yet.
    async fn ensure_player(&self, user_id: PlayerId, chat_id: ChatId, username: &str)
    -> StatsResult<()>;

    /// Record one finished game for one participant.
    async fn record_result(
        &self,
        user_id: PlayerId,
        chat_id: ChatId,
        game_type: GameType,
        won: bool,
    ) -> StatsResult<()>;

    /// Overall record for a player in a chat
    async fn player_stats(&self, user_id: PlayerId, chat_id: ChatId)
    -> StatsResult<Option<PlayerStats>>;

    /// Per-game records for a player in a chat
    async fn game_stats(&self, user_id: PlayerId, chat_id: ChatId) -> StatsResult<Vec<GameStats>>;

    /// Top players of a chat by points
    async fn leaderboard(&self, chat_id: ChatId, limit: i64) -> StatsResult<Vec<PlayerStats>>;
}

const CREATE_PLAYERS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS players (
    user_id BIGINT NOT NULL,
    chat_id BIGINT NOT NULL,
    username TEXT NOT NULL DEFAULT '',
    wins BIGINT NOT NULL DEFAULT 0,
    losses BIGINT NOT NULL DEFAULT 0,
    points BIGINT NOT NULL DEFAULT 0,
    PRIMARY KEY (user_id, chat_id)
)";

const CREATE_GAME_STATS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS game_stats (
    user_id BIGINT NOT NULL,
    chat_id BIGINT NOT NULL,
    game_type TEXT NOT NULL,
    wins BIGINT NOT NULL DEFAULT 0,
    losses BIGINT NOT NULL DEFAULT 0,
    PRIMARY KEY (user_id, chat_id, game_type)
)";

/// PostgreSQL implementation of `StatsRepository`
pub struct PgStatsRepository {
    pool: PgPool,
}

impl PgStatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the statistics tables if they're missing.
    pub async fn init_schema(&self) -> StatsResult<()> {
        with_default_timeout(sqlx::query(CREATE_PLAYERS_TABLE).execute(&self.pool)).await?;
        with_default_timeout(sqlx::query(CREATE_GAME_STATS_TABLE).execute(&self.pool)).await?;
        Ok(())
    }
}

fn player_from_row(row: &sqlx::postgres::PgRow) -> PlayerStats {
    PlayerStats {
        user_id: row.get("user_id"),
        chat_id: row.get("chat_id"),
        username: row.get("username"),
        wins: row.get("wins"),
        losses: row.get("losses"),
        points: row.get("points"),
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn ensure_player(
        &self,
        user_id: PlayerId,
        chat_id: ChatId,
        username: &str,
    ) -> StatsResult<()> {
        with_default_timeout(
            sqlx::query(
                "INSERT INTO players (user_id, chat_id, username) VALUES ($1, $2, $3)
                 ON CONFLICT (user_id, chat_id) DO UPDATE SET username = EXCLUDED.username",
            )
            .bind(user_id)
            .bind(chat_id)
            .bind(username)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn record_result(
        &self,
        user_id: PlayerId,
        chat_id: ChatId,
        game_type: GameType,
        won: bool,
    ) -> StatsResult<()> {
        let (wins, losses) = if won { (1_i64, 0_i64) } else { (0, 1) };
        let points = wins - losses;

        with_timeout(DEFAULT_TRANSACTION_TIMEOUT, async {
            let mut tx = self.pool.begin().await?;

            sqlx::query(
                "INSERT INTO players (user_id, chat_id, wins, losses, points)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (user_id, chat_id) DO UPDATE SET
                    wins = players.wins + EXCLUDED.wins,
                    losses = players.losses + EXCLUDED.losses,
                    points = players.points + EXCLUDED.points",
            )
            .bind(user_id)
            .bind(chat_id)
            .bind(wins)
            .bind(losses)
            .bind(points)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO game_stats (user_id, chat_id, game_type, wins, losses)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (user_id, chat_id, game_type) DO UPDATE SET
                    wins = game_stats.wins + EXCLUDED.wins,
                    losses = game_stats.losses + EXCLUDED.losses",
            )
            .bind(user_id)
            .bind(chat_id)
            .bind(game_type.key())
            .bind(wins)
            .bind(losses)
            .execute(&mut *tx)
            .await?;

            tx.commit().await
        })
        .await?;

        Ok(())
    }

    async fn player_stats(
        &self,
        user_id: PlayerId,
        chat_id: ChatId,
    ) -> StatsResult<Option<PlayerStats>> {
        let row = with_default_timeout(
            sqlx::query(
                "SELECT user_id, chat_id, username, wins, losses, points
                 FROM players WHERE user_id = $1 AND chat_id = $2",
            )
            .bind(user_id)
            .bind(chat_id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(player_from_row))
    }

    async fn game_stats(&self, user_id: PlayerId, chat_id: ChatId) -> StatsResult<Vec<GameStats>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT game_type, wins, losses FROM game_stats
                 WHERE user_id = $1 AND chat_id = $2 ORDER BY game_type",
            )
            .bind(user_id)
            .bind(chat_id)
            .fetch_all(&self.pool),
        )
        .await?;

        rows.iter()
            .map(|row| -> StatsResult<GameStats> {
                let key: String = row.get("game_type");
                Ok(GameStats {
                    game_type: key.parse()?,
                    wins: row.get("wins"),
                    losses: row.get("losses"),
                })
            })
            .collect()
    }

    async fn leaderboard(&self, chat_id: ChatId, limit: i64) -> StatsResult<Vec<PlayerStats>> {
        let rows = with_default_timeout(
            sqlx::query(
                "SELECT user_id, chat_id, username, wins, losses, points
                 FROM players WHERE chat_id = $1
                 ORDER BY points DESC, wins DESC, user_id
                 LIMIT $2",
            )
            .bind(chat_id)
            .bind(limit)
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.iter().map(player_from_row).collect())
    }
}

#[derive(Default)]
struct MemoryTables {
    players: HashMap<(PlayerId, ChatId), PlayerStats>,
    games: HashMap<(PlayerId, ChatId, GameType), GameStats>,
}

/// In-process implementation, used when no database is configured and in tests.
#[derive(Default)]
pub struct InMemoryStatsRepository {
    tables: RwLock<MemoryTables>,
}

impl InMemoryStatsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatsRepository for InMemoryStatsRepository {
    async fn ensure_player(
        &self,
        user_id: PlayerId,
        chat_id: ChatId,
        username: &str,
    ) -> StatsResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .players
            .entry((user_id, chat_id))
            .and_modify(|stats| stats.username = username.to_string())
            .or_insert_with(|| PlayerStats::new(user_id, chat_id, username));
        Ok(())
    }

    async fn record_result(
        &self,
        user_id: PlayerId,
        chat_id: ChatId,
        game_type: GameType,
        won: bool,
    ) -> StatsResult<()> {
        let mut tables = self.tables.write().await;
        tables
            .players
            .entry((user_id, chat_id))
            .or_insert_with(|| PlayerStats::new(user_id, chat_id, ""))
            .record(won);
        tables
            .games
            .entry((user_id, chat_id, game_type))
            .or_insert_with(|| GameStats::new(game_type))
            .record(won);
        Ok(())
    }

    async fn player_stats(
        &self,
        user_id: PlayerId,
        chat_id: ChatId,
    ) -> StatsResult<Option<PlayerStats>> {
        Ok(self.tables.read().await.players.get(&(user_id, chat_id)).cloned())
    }

    async fn game_stats(&self, user_id: PlayerId, chat_id: ChatId) -> StatsResult<Vec<GameStats>> {
        let tables = self.tables.read().await;
        let mut stats: Vec<_> = tables
            .games
            .iter()
            .filter(|((user, chat, _), _)| *user == user_id && *chat == chat_id)
            .map(|(_, stats)| stats.clone())
            .collect();
        stats.sort_by_key(|stats| stats.game_type.key());
        Ok(stats)
    }

    async fn leaderboard(&self, chat_id: ChatId, limit: i64) -> StatsResult<Vec<PlayerStats>> {
        let tables = self.tables.read().await;
        let mut players: Vec<_> = tables
            .players
            .values()
            .filter(|stats| stats.chat_id == chat_id)
            .cloned()
            .collect();
        players.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(b.wins.cmp(&a.wins))
                .then(a.user_id.cmp(&b.user_id))
        });
        players.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(players)
    }
}
