//! Per-session game state machine.
//!
//! Every game variant is its own state type implementing [`GameRules`]. The
//! variants are collected in the [`SessionState`] tagged union and dispatched
//! with `enum_dispatch`, so a session can never be driven with another
//! variant's fields.

use enum_dispatch::enum_dispatch;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::entities::{Action, GameType, PlayerId, Seat, SeatIndex, Transition};
use super::states::{
    CoinFlipState, DiceBattleState, NumberGuessState, QuickMathState, RouletteState,
    TicTacToeState,
};

/// Reasons a player action or a challenge is rejected.
///
/// A rejected action never changes the session it targeted.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum ActionError {
    #[error("not your turn")]
    OutOfTurnAction,
    #[error("you're not playing in this game")]
    NotAParticipant,
    #[error("{action} doesn't apply to {game_type}")]
    WrongAction { game_type: GameType, action: String },
    #[error("cell {0} is already taken")]
    CellOccupied(usize),
    #[error("cell {0} is off the board")]
    InvalidCell(usize),
    #[error("guess {0} is outside 1..=100")]
    GuessOutOfRange(i64),
    #[error("can't play against yourself")]
    SelfPlay,
    #[error("can't play against a bot")]
    BotOpponent,
}

impl ActionError {
    pub(crate) fn wrong_action(game_type: GameType, action: &Action) -> Self {
        Self::WrongAction {
            game_type,
            action: action.to_string(),
        }
    }
}

/// Rules shared by every game variant.
#[enum_dispatch]
pub trait GameRules {
    fn game_type(&self) -> GameType;

    /// Challenger first, opponent second.
    fn seats(&self) -> [&Seat; 2];

    /// Player allowed to act next, or `None` when both players may act.
    fn current_player(&self) -> Option<PlayerId>;

    /// Validates and applies an action taken by the player in `actor`.
    ///
    /// Implementations must check everything before mutating anything.
    fn apply(
        &mut self,
        actor: SeatIndex,
        action: &Action,
        rng: &mut dyn RngCore,
    ) -> Result<Transition, ActionError>;

    fn seat_of(&self, player: PlayerId) -> Option<SeatIndex> {
        self.seats().iter().position(|seat| seat.id == player)
    }
}

/// State of one session, tagged by game variant.
#[enum_dispatch(GameRules)]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "game_type", rename_all = "snake_case")]
pub enum SessionState {
    RussianRoulette(RouletteState),
    DiceBattle(DiceBattleState),
    NumberGuess(NumberGuessState),
    TicTacToe(TicTacToeState),
    QuickMath(QuickMathState),
    CoinFlip(CoinFlipState),
}

impl SessionState {
    /// Builds the starting state for `game_type` with `challenger` moving first.
    pub fn new(game_type: GameType, challenger: Seat, opponent: Seat, rng: &mut dyn RngCore) -> Self {
        let seats = [challenger, opponent];
        match game_type {
            GameType::RussianRoulette => RouletteState::new(seats, rng).into(),
            GameType::DiceBattle => DiceBattleState::new(seats).into(),
            GameType::NumberGuess => NumberGuessState::new(seats, rng).into(),
            GameType::TicTacToe => TicTacToeState::new(seats).into(),
            GameType::QuickMath => QuickMathState::new(seats, rng).into(),
            GameType::CoinFlip => CoinFlipState::new(seats).into(),
        }
    }
}

/// Rejects `actor` unless `turn` belongs to them.
pub(crate) fn require_turn(turn: SeatIndex, actor: SeatIndex) -> Result<(), ActionError> {
    if turn == actor {
        Ok(())
    } else {
        Err(ActionError::OutOfTurnAction)
    }
}
