//! State definitions for each game variant.
//!
//! Each state owns its two seats plus the variant-specific fields, and
//! implements [`GameRules`](crate::game::GameRules) with its own
//! transition function.

mod coin_flip;
mod dice_battle;
mod number_guess;
mod quick_math;
mod russian_roulette;
mod tic_tac_toe;

pub use coin_flip::{CoinFlipPlayer, CoinFlipState};
pub use dice_battle::{DiceBattleState, DicePlayer};
pub use number_guess::{GuessPlayer, NumberGuessState};
pub use quick_math::{MathPlayer, QuickMathState};
pub use russian_roulette::{RoulettePlayer, RouletteState};
pub use tic_tac_toe::{TicTacToePlayer, TicTacToeState, WIN_LINES, winning_line};
