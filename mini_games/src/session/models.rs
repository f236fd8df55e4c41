//! Session data models.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::Instant;
use uuid::Uuid;

use crate::game::{
    ActionError, GameRules, SessionState,
    entities::{Action, ChatId, GameType, Outcome, Participant, PlayerId, ResultRecord, Transition},
};

/// Opaque session identifier.
///
/// Built from the game, chat, both players and the creation time, plus a
/// random suffix so back-to-back games between the same pair never collide.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub(crate) fn generate(
        game_type: GameType,
        chat_id: ChatId,
        players: [PlayerId; 2],
        created_at: DateTime<Utc>,
    ) -> Self {
        Self(format!(
            "{}_{}_{}_{}_{}_{}",
            game_type.key(),
            chat_id,
            players[0],
            players[1],
            created_at.timestamp_millis(),
            Uuid::new_v4().simple(),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A request by `challenger` to play `game_type` against `opponent`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Challenge {
    pub game_type: GameType,
    pub chat_id: ChatId,
    pub challenger: Participant,
    pub opponent: Participant,
}

impl Challenge {
    /// Rejects games nobody could meaningfully lose.
    pub fn validate(&self) -> Result<(), ActionError> {
        if self.challenger.id == self.opponent.id {
            return Err(ActionError::SelfPlay);
        }
        if self.challenger.is_bot || self.opponent.is_bot {
            return Err(ActionError::BotOpponent);
        }
        Ok(())
    }
}

/// One running game.
#[derive(Clone, Debug, Serialize)]
pub struct Session {
    pub id: SessionId,
    pub chat_id: ChatId,
    pub created_at: DateTime<Utc>,
    pub state: SessionState,
    #[serde(skip)]
    pub(crate) expires_at: Instant,
    #[serde(skip)]
    pub(crate) rng: StdRng,
    /// Set once the session reached a terminal outcome or expired. A handler
    /// that was already waiting on the lock must treat it as gone.
    #[serde(skip)]
    pub(crate) closed: bool,
}

impl Session {
    pub(crate) fn new(
        challenge: Challenge,
        created_at: DateTime<Utc>,
        expires_at: Instant,
        mut rng: StdRng,
    ) -> Self {
        let Challenge {
            game_type,
            chat_id,
            challenger,
            opponent,
        } = challenge;
        let id = SessionId::generate(game_type, chat_id, [challenger.id, opponent.id], created_at);
        let state = SessionState::new(game_type, challenger.into(), opponent.into(), &mut rng);
        Self {
            id,
            chat_id,
            created_at,
            state,
            expires_at,
            rng,
            closed: false,
        }
    }

    pub fn game_type(&self) -> GameType {
        self.state.game_type()
    }

    pub fn players(&self) -> [PlayerId; 2] {
        let [a, b] = self.state.seats();
        [a.id, b.id]
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        self.state.current_player()
    }

    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Applies `action` for `actor`. On rejection the state is left exactly
    /// as it was.
    pub(crate) fn apply(&mut self, actor: PlayerId, action: &Action) -> Result<Transition, ActionError> {
        let seat = self
            .state
            .seat_of(actor)
            .ok_or(ActionError::NotAParticipant)?;
        let mut next = self.state.clone();
        let transition = next.apply(seat, action, &mut self.rng)?;
        self.state = next;
        Ok(transition)
    }

    /// Statistics to record for `outcome`, one entry per player.
    ///
    /// A draw credits both players with a win.
    pub fn result_records(&self, outcome: &Outcome) -> Option<[ResultRecord; 2]> {
        let players = self.players();
        match *outcome {
            Outcome::Continue => None,
            Outcome::WinFor(winner) => Some(players.map(|player_id| ResultRecord {
                player_id,
                won: player_id == winner,
            })),
            Outcome::Draw => Some(players.map(|player_id| ResultRecord {
                player_id,
                won: true,
            })),
        }
    }
}
