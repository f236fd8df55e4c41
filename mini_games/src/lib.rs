//! # Mini Games
//!
//! Two-player mini-games played inside chat conversations.
//!
//! Each game variant is a small state machine implementing
//! [`GameRules`](game::GameRules); the six variants are collected in the
//! [`SessionState`] union and dispatched with `enum_dispatch`.
//!
//! ## Games
//!
//! - **Russian roulette**: one bullet in six chambers, players take turns firing
//! - **Dice battle**: three rolls each, higher total wins
//! - **Number guess**: alternate guesses at a number in 1..=100
//! - **Tic-tac-toe**: the classic 3x3 board
//! - **Quick math**: first to three correct answers
//! - **Coin flip**: both pick a side, then the coin decides
//!
//! ## Core Modules
//!
//! - [`game`]: Engines, actions, outcomes
//! - [`session`]: Registry of running games with idle expiry
//! - [`stats`]: Per-chat win/loss statistics
//! - [`db`]: PostgreSQL pool and query timeouts
//!
//! ## Example
//!
//! ```
//! use mini_games::{GameRules, SessionState};
//! use mini_games::game::entities::{Action, GameType, Outcome, Seat};
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let alice = Seat { id: 1, name: "alice".to_string() };
//! let bob = Seat { id: 2, name: "bob".to_string() };
//! let mut game = SessionState::new(GameType::TicTacToe, alice, bob, &mut rng);
//!
//! let transition = game.apply(0, &Action::Place(4), &mut rng).unwrap();
//! assert_eq!(transition.outcome, Outcome::Continue);
//! ```

/// Environment configuration helpers.
pub mod config;

/// Database connection pool and timeouts.
pub mod db;

/// Core game logic, entities, and state machines.
pub mod game;
pub use game::{
    ActionError, GameRules, SessionState,
    constants,
    entities::{self, Action, GameType, Outcome},
};

/// Session registry and lifecycle.
pub mod session;
pub use session::{Challenge, SessionError, SessionManager};

/// Win/loss statistics.
pub mod stats;
