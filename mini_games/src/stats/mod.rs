//! Per-chat win/loss statistics.
//!
//! Each player has an overall record per chat (wins, losses, points) plus a
//! record per game type. Results are written through [`StatsRepository`],
//! backed by PostgreSQL or, when no database is configured, by memory.

pub mod errors;
pub mod models;
pub mod repository;

pub use errors::{StatsError, StatsResult};
pub use models::{DEFAULT_LEADERBOARD_LIMIT, GameStats, PlayerStats};
pub use repository::{InMemoryStatsRepository, PgStatsRepository, StatsRepository};
