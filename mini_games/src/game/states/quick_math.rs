use rand::RngCore;
use serde::Serialize;

use crate::game::{
    constants::MATH_TARGET_SCORE,
    entities::{Action, GameEvent, GameType, MathProblem, Outcome, PlayerId, Seat, SeatIndex, Transition, other_seat},
    state_machine::{ActionError, GameRules, require_turn},
};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MathPlayer {
    pub seat: Seat,
    pub score: u8,
}

/// Players take turns answering arithmetic problems. Any answer, right or
/// wrong, gets the next player a fresh problem.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct QuickMathState {
    pub players: [MathPlayer; 2],
    pub problem: MathProblem,
    pub turn: SeatIndex,
}

impl QuickMathState {
    pub fn new(seats: [Seat; 2], rng: &mut dyn RngCore) -> Self {
        Self::with_problem(seats, MathProblem::random(rng))
    }

    pub fn with_problem(seats: [Seat; 2], problem: MathProblem) -> Self {
        Self {
            players: seats.map(|seat| MathPlayer { seat, score: 0 }),
            problem,
            turn: 0,
        }
    }
}

impl GameRules for QuickMathState {
    fn game_type(&self) -> GameType {
        GameType::QuickMath
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
        rng: &mut dyn RngCore,
    ) -> Result<Transition, ActionError> {
        let Action::Answer(answer) = *action else {
            return Err(ActionError::wrong_action(self.game_type(), action));
        };
        require_turn(self.turn, actor)?;

        let expected = self.problem.answer();
        let correct = answer == expected;
        let answerer = &mut self.players[actor];
        if correct {
            answerer.score += 1;
        }
        let (player, score) = (answerer.seat.id, answerer.score);

        let (outcome, next_problem) = if score >= MATH_TARGET_SCORE {
            (Outcome::WinFor(player), None)
        } else {
            self.problem = MathProblem::random(rng);
            self.turn = other_seat(actor);
            (Outcome::Continue, Some(self.problem))
        };

        Ok(Transition::new(
            GameEvent::Answered {
                player,
                answer,
                expected,
                correct,
                score,
                next_problem,
            },
            outcome,
        ))
    }
}
