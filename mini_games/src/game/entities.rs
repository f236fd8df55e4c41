use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

use super::constants::{OPERAND_MAX, OPERAND_MIN};

/// Chat platform user identifier.
pub type PlayerId = i64;

/// Chat (conversation) identifier.
pub type ChatId = i64;

/// Index of a participant within a session (0 = challenger, 1 = opponent).
pub type SeatIndex = usize;

/// Returns the seat across the table from `seat`.
#[must_use]
pub const fn other_seat(seat: SeatIndex) -> SeatIndex {
    1 - seat
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    RussianRoulette,
    DiceBattle,
    NumberGuess,
    TicTacToe,
    QuickMath,
    CoinFlip,
}

impl GameType {
    pub const ALL: [Self; 6] = [
        Self::RussianRoulette,
        Self::DiceBattle,
        Self::NumberGuess,
        Self::TicTacToe,
        Self::QuickMath,
        Self::CoinFlip,
    ];

    /// Stable key used in session ids, storage rows, and the HTTP API.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::RussianRoulette => "russian_roulette",
            Self::DiceBattle => "dice_battle",
            Self::NumberGuess => "number_guess",
            Self::TicTacToe => "tic_tac_toe",
            Self::QuickMath => "quick_math",
            Self::CoinFlip => "coin_flip",
        }
    }

    /// Whether actions for this game arrive as free text rather than buttons.
    #[must_use]
    pub const fn is_text_driven(&self) -> bool {
        matches!(self, Self::NumberGuess | Self::QuickMath)
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Error, Eq, PartialEq)]
#[error("unknown game type: {0}")]
pub struct UnknownGameType(pub String);

impl FromStr for GameType {
    type Err = UnknownGameType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|game_type| game_type.key() == s)
            .ok_or_else(|| UnknownGameType(s.to_string()))
    }
}

/// A chat user as seen by the transport when a challenge is issued.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Participant {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub is_bot: bool,
}

impl Participant {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_bot: false,
        }
    }

    pub fn bot(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_bot: true,
        }
    }
}

/// Identity of a seated player. Every variant embeds one per player.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
}

impl From<Participant> for Seat {
    fn from(value: Participant) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    pub fn random(rng: &mut dyn RngCore) -> Self {
        if rng.random_bool(0.5) {
            Self::Heads
        } else {
            Self::Tails
        }
    }
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Heads => "heads",
            Self::Tails => "tails",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Cross,
    Nought,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Cross => "❌",
            Self::Nought => "⭕",
        };
        write!(f, "{repr}")
    }
}

/// Direction the secret number lies in relative to a wrong guess.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Hint {
    Lower,
    Higher,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
}

impl Operator {
    pub fn random(rng: &mut dyn RngCore) -> Self {
        match rng.random_range(0..3) {
            0 => Self::Add,
            1 => Self::Sub,
            _ => Self::Mul,
        }
    }

    #[must_use]
    pub const fn apply(&self, lhs: i64, rhs: i64) -> i64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MathProblem {
    pub lhs: i64,
    pub op: Operator,
    pub rhs: i64,
}

impl MathProblem {
    pub const fn new(lhs: i64, op: Operator, rhs: i64) -> Self {
        Self { lhs, op, rhs }
    }

    pub fn random(rng: &mut dyn RngCore) -> Self {
        let lhs = rng.random_range(OPERAND_MIN..=OPERAND_MAX);
        let rhs = rng.random_range(OPERAND_MIN..=OPERAND_MAX);
        let op = Operator::random(rng);
        Self { lhs, op, rhs }
    }

    #[must_use]
    pub const fn answer(&self) -> i64 {
        self.op.apply(self.lhs, self.rhs)
    }
}

impl fmt::Display for MathProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.lhs, self.op, self.rhs)
    }
}

/// Normalized player input. Which kinds are accepted depends on the game.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Action {
    Fire,
    Roll,
    Guess(i64),
    Place(usize),
    Answer(i64),
    Choose(CoinSide),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fire => write!(f, "fire"),
            Self::Roll => write!(f, "roll"),
            Self::Guess(n) => write!(f, "guess {n}"),
            Self::Place(cell) => write!(f, "place {cell}"),
            Self::Answer(n) => write!(f, "answer {n}"),
            Self::Choose(side) => write!(f, "choose {side}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "winner", rename_all = "snake_case")]
pub enum Outcome {
    Continue,
    WinFor(PlayerId),
    Draw,
}

impl Outcome {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// What an accepted action changed, for the transport to render.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Shot {
        shooter: PlayerId,
        chamber: usize,
        loaded: bool,
    },
    Rolled {
        player: PlayerId,
        value: u32,
        score: u32,
        rolls_left: u8,
        turn_passed: bool,
    },
    Guessed {
        player: PlayerId,
        guess: i64,
        hint: Option<Hint>,
        attempts: u32,
    },
    Placed {
        player: PlayerId,
        cell: usize,
        mark: Mark,
        line: Option<[usize; 3]>,
    },
    Answered {
        player: PlayerId,
        answer: i64,
        /// Answer to the problem that was just attempted
        expected: i64,
        correct: bool,
        score: u8,
        next_problem: Option<MathProblem>,
    },
    Chose {
        player: PlayerId,
        side: CoinSide,
        flip: Option<CoinSide>,
    },
}

/// Result of applying one accepted action.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Transition {
    pub event: GameEvent,
    pub outcome: Outcome,
}

impl Transition {
    pub const fn new(event: GameEvent, outcome: Outcome) -> Self {
        Self { event, outcome }
    }
}

/// Statistics instruction emitted once per participant on a terminal outcome.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ResultRecord {
    pub player_id: PlayerId,
    pub won: bool,
}
