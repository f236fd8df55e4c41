use rand::RngCore;
use serde::Serialize;

use crate::game::{
    entities::{Action, CoinSide, GameEvent, GameType, Outcome, PlayerId, Seat, SeatIndex, Transition, other_seat},
    state_machine::{ActionError, GameRules},
};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CoinFlipPlayer {
    pub seat: Seat,
    pub choice: Option<CoinSide>,
}

/// Both players pick a side in any order; the coin is flipped once both have
/// picked. The challenger wins when their side comes up, otherwise the
/// opponent wins, so a shared side still has exactly one winner.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CoinFlipState {
    pub players: [CoinFlipPlayer; 2],
    pub result: Option<CoinSide>,
}

impl CoinFlipState {
    pub fn new(seats: [Seat; 2]) -> Self {
        Self {
            players: seats.map(|seat| CoinFlipPlayer { seat, choice: None }),
            result: None,
        }
    }
}

impl GameRules for CoinFlipState {
    fn game_type(&self) -> GameType {
        GameType::CoinFlip
    }

    fn seats(&self) -> [&Seat; 2] {
        [&self.players[0].seat, &self.players[1].seat]
    }

    fn current_player(&self) -> Option<PlayerId> {
        None
    }

    fn apply(
        &mut self,
        actor: SeatIndex,
        action: &Action,
        rng: &mut dyn RngCore,
    ) -> Result<Transition, ActionError> {
        let Action::Choose(side) = *action else {
            return Err(ActionError::wrong_action(self.game_type(), action));
        };
        let other = other_seat(actor);
        self.players[actor].choice = Some(side);
        let player = self.players[actor].seat.id;

        if self.players[other].choice.is_none() {
            return Ok(Transition::new(
                GameEvent::Chose {
                    player,
                    side,
                    flip: None,
                },
                Outcome::Continue,
            ));
        }

        let flip = CoinSide::random(rng);
        self.result = Some(flip);
        let winner = if self.players[0].choice == Some(flip) {
            self.players[0].seat.id
        } else {
            self.players[1].seat.id
        };

        Ok(Transition::new(
            GameEvent::Chose {
                player,
                side,
                flip: Some(flip),
            },
            Outcome::WinFor(winner),
        ))
    }
}
