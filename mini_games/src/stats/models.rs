//! Statistics data models.

use serde::{Deserialize, Serialize};

use crate::game::entities::{ChatId, GameType, PlayerId};

/// Default number of rows returned by a leaderboard query.
pub const DEFAULT_LEADERBOARD_LIMIT: i64 = 10;

/// A player's overall record within one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub user_id: PlayerId,
    pub chat_id: ChatId,
    pub username: String,
    pub wins: i64,
    pub losses: i64,
    pub points: i64,
}

impl PlayerStats {
    pub fn new(user_id: PlayerId, chat_id: ChatId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            chat_id,
            username: username.into(),
            wins: 0,
            losses: 0,
            points: 0,
        }
    }

    /// Applies one game result: a win is worth a point, a loss costs one.
    pub fn record(&mut self, won: bool) {
        if won {
            self.wins += 1;
            self.points += 1;
        } else {
            self.losses += 1;
            self.points -= 1;
        }
    }
}

/// A player's record for a single game type within one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStats {
    pub game_type: GameType,
    pub wins: i64,
    pub losses: i64,
}

impl GameStats {
    pub fn new(game_type: GameType) -> Self {
        Self {
            game_type,
            wins: 0,
            losses: 0,
        }
    }

    pub fn record(&mut self, won: bool) {
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }

    pub fn games_played(&self) -> i64 {
        self.wins + self.losses
    }

    /// Percentage of games won, 0 when nothing has been played yet.
    pub fn win_rate(&self) -> f64 {
        let played = self.games_played();
        if played == 0 {
            0.0
        } else {
            self.wins as f64 / played as f64 * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_record_moves_points() {
        let mut stats = PlayerStats::new(1, -100, "alice");
        stats.record(true);
        stats.record(true);
        stats.record(false);
        assert_eq!((stats.wins, stats.losses, stats.points), (2, 1, 1));
    }

    #[test]
    fn test_points_can_go_negative() {
        let mut stats = PlayerStats::new(1, -100, "alice");
        stats.record(false);
        stats.record(false);
        assert_eq!(stats.points, -2);
    }

    #[test]
    fn test_win_rate() {
        let mut stats = GameStats::new(GameType::TicTacToe);
        assert_eq!(stats.win_rate(), 0.0);

        stats.record(true);
        stats.record(false);
        stats.record(false);
        stats.record(true);
        assert_eq!(stats.games_played(), 4);
        assert!((stats.win_rate() - 50.0).abs() < f64::EPSILON);
    }
}
