//! Game engines - one state machine per mini-game.
//!
//! This module provides:
//! - Shared entities (actions, outcomes, events, seats)
//! - The [`GameRules`] trait every variant implements
//! - [`SessionState`], the `enum_dispatch` union of all variants

pub mod constants;
pub mod entities;
pub mod state_machine;
pub mod states;

pub use state_machine::{ActionError, GameRules, SessionState};
