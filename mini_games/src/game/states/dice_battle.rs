use rand::{Rng, RngCore};
use serde::Serialize;
use std::cmp::Ordering;

use crate::game::{
    constants::{DICE_ROLLS, DIE_FACES},
    entities::{Action, GameEvent, GameType, Outcome, PlayerId, Seat, SeatIndex, Transition, other_seat},
    state_machine::{ActionError, GameRules, require_turn},
};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DicePlayer {
    pub seat: Seat,
    pub score: u32,
    pub rolls_left: u8,
}

/// Each player rolls all of their dice before the turn passes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct DiceBattleState {
    pub players: [DicePlayer; 2],
    pub turn: SeatIndex,
}

impl DiceBattleState {
    pub fn new(seats: [Seat; 2]) -> Self {
        Self {
            players: seats.map(|seat| DicePlayer {
                seat,
                score: 0,
                rolls_left: DICE_ROLLS,
            }),
            turn: 0,
        }
    }

    fn settle(&self) -> Outcome {
        let [a, b] = &self.players;
        match a.score.cmp(&b.score) {
            Ordering::Greater => Outcome::WinFor(a.seat.id),
            Ordering::Less => Outcome::WinFor(b.seat.id),
            Ordering::Equal => Outcome::Draw,
        }
    }
}

impl GameRules for DiceBattleState {
    fn game_type(&self) -> GameType {
        GameType::DiceBattle
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
        if *action != Action::Roll {
            return Err(ActionError::wrong_action(self.game_type(), action));
        }
        require_turn(self.turn, actor)?;

        let value = rng.random_range(1..=DIE_FACES);
        let roller = &mut self.players[actor];
        roller.score += value;
        roller.rolls_left = roller.rolls_left.saturating_sub(1);
        let (player, score, rolls_left) = (roller.seat.id, roller.score, roller.rolls_left);

        let mut turn_passed = false;
        let outcome = if rolls_left > 0 {
            Outcome::Continue
        } else if self.players[other_seat(actor)].rolls_left > 0 {
            self.turn = other_seat(actor);
            turn_passed = true;
            Outcome::Continue
        } else {
            self.settle()
        };

        Ok(Transition::new(
            GameEvent::Rolled {
                player,
                value,
                score,
                rolls_left,
                turn_passed,
            },
            outcome,
        ))
    }
}
