use rand::{Rng, RngCore};
use serde::Serialize;
use std::cmp::Ordering;

use crate::game::{
    constants::{GUESS_MAX, GUESS_MIN},
    entities::{Action, GameEvent, GameType, Hint, Outcome, PlayerId, Seat, SeatIndex, Transition, other_seat},
    state_machine::{ActionError, GameRules, require_turn},
};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GuessPlayer {
    pub seat: Seat,
    pub attempts: u32,
}

/// Players alternate guessing a hidden number.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct NumberGuessState {
    pub players: [GuessPlayer; 2],
    #[serde(skip)]
    target: i64,
    pub turn: SeatIndex,
}

impl NumberGuessState {
    pub fn new(seats: [Seat; 2], rng: &mut dyn RngCore) -> Self {
        Self::with_target(seats, rng.random_range(GUESS_MIN..=GUESS_MAX))
    }

    pub fn with_target(seats: [Seat; 2], target: i64) -> Self {
        Self {
            players: seats.map(|seat| GuessPlayer { seat, attempts: 0 }),
            target,
            turn: 0,
        }
    }

    pub const fn target(&self) -> i64 {
        self.target
    }
}

impl GameRules for NumberGuessState {
    fn game_type(&self) -> GameType {
        GameType::NumberGuess
    }

    fn seats(&self) -> [&Seat; 2] {
        [&self.players[0].seat, &self.players[1].seat]
    }

    fn current_player(&self) -> Option<PlayerId> {
        Some(self.players[self.turn].seat.id)
    }

    fn apply(
        &mut self,
        actor: SeatIndex,
        action: &Action,
        _rng: &mut dyn RngCore,
    ) -> Result<Transition, ActionError> {
        let Action::Guess(guess) = *action else {
            return Err(ActionError::wrong_action(self.game_type(), action));
        };
        require_turn(self.turn, actor)?;
        if !(GUESS_MIN..=GUESS_MAX).contains(&guess) {
            return Err(ActionError::GuessOutOfRange(guess));
        }

        let guesser = &mut self.players[actor];
        guesser.attempts += 1;
        let (player, attempts) = (guesser.seat.id, guesser.attempts);

        let (hint, outcome) = match guess.cmp(&self.target) {
            Ordering::Equal => (None, Outcome::WinFor(player)),
            Ordering::Greater => (Some(Hint::Lower), Outcome::Continue),
            Ordering::Less => (Some(Hint::Higher), Outcome::Continue),
        };
        if hint.is_some() {
            self.turn = other_seat(actor);
        }

        Ok(Transition::new(
            GameEvent::Guessed {
                player,
                guess,
                hint,
                attempts,
            },
            outcome,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::states::test_support::{ALICE, BOB, seats};
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_target_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let state = NumberGuessState::new(seats(), &mut rng);
            assert!((GUESS_MIN..=GUESS_MAX).contains(&state.target()));
        }
    }

    #[test]
    fn test_high_guess_hints_lower_and_passes_turn() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = NumberGuessState::with_target(seats(), 57);

        let transition = state.apply(0, &Action::Guess(80), &mut rng).unwrap();
        assert_eq!(transition.outcome, Outcome::Continue);
        assert_eq!(
            transition.event,
            GameEvent::Guessed {
                player: ALICE,
                guess: 80,
                hint: Some(Hint::Lower),
                attempts: 1,
            }
        );
        assert_eq!(state.current_player(), Some(BOB));
    }

    #[test]
    fn test_low_guess_hints_higher() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = NumberGuessState::with_target(seats(), 57);
        let transition = state.apply(0, &Action::Guess(12), &mut rng).unwrap();
        assert!(matches!(
            transition.event,
            GameEvent::Guessed {
                hint: Some(Hint::Higher),
                ..
            }
        ));
    }

    #[test]
    fn test_exact_guess_wins_with_attempt_count() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = NumberGuessState::with_target(seats(), 57);

        state.apply(0, &Action::Guess(80), &mut rng).unwrap();
        state.apply(1, &Action::Guess(30), &mut rng).unwrap();
        let transition = state.apply(0, &Action::Guess(57), &mut rng).unwrap();

        assert_eq!(transition.outcome, Outcome::WinFor(ALICE));
        assert_eq!(
            transition.event,
            GameEvent::Guessed {
                player: ALICE,
                guess: 57,
                hint: None,
                attempts: 2,
            }
        );
    }

    #[test]
    fn test_out_of_range_guess_leaves_state() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = NumberGuessState::with_target(seats(), 57);
        let before = state.clone();

        for guess in [0, 101, -5] {
            assert_eq!(
                state.apply(0, &Action::Guess(guess), &mut rng),
                Err(ActionError::GuessOutOfRange(guess))
            );
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_out_of_turn_guess_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = NumberGuessState::with_target(seats(), 57);
        assert_eq!(
            state.apply(1, &Action::Guess(57), &mut rng),
            Err(ActionError::OutOfTurnAction)
        );
        assert_eq!(state.players[1].attempts, 0);
    }
}
