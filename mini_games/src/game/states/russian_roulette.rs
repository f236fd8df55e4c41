use rand::{Rng, RngCore};
use serde::Serialize;

use crate::game::{
    constants::CHAMBERS,
    entities::{Action, GameEvent, GameType, Outcome, PlayerId, Seat, SeatIndex, Transition, other_seat},
    state_machine::{ActionError, GameRules, require_turn},
};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RoulettePlayer {
    pub seat: Seat,
    pub alive: bool,
}

/// Revolver with one loaded chamber out of six.
///
/// The cursor moves one chamber per shot and wraps; it's never reset while
/// the game is running.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct RouletteState {
    pub players: [RoulettePlayer; 2],
    #[serde(skip)]
    chambers: [bool; CHAMBERS],
    pub cursor: usize,
    pub turn: SeatIndex,
}

impl RouletteState {
    pub fn new(seats: [Seat; 2], rng: &mut dyn RngCore) -> Self {
        let bullet = rng.random_range(0..CHAMBERS);
        Self::with_bullet(seats, bullet)
    }

    /// Loads the bullet into a known chamber.
    ///
    /// # Panics
    ///
    /// Panics if `bullet` isn't a valid chamber index.
    pub fn with_bullet(seats: [Seat; 2], bullet: usize) -> Self {
        assert!(bullet < CHAMBERS, "chamber {bullet} out of range");
        let mut chambers = [false; CHAMBERS];
        chambers[bullet] = true;
        Self {
            players: seats.map(|seat| RoulettePlayer { seat, alive: true }),
            chambers,
            cursor: 0,
            turn: 0,
        }
    }

    pub fn loaded_chamber(&self) -> usize {
        self.chambers.iter().position(|&loaded| loaded).unwrap_or(0)
    }
}

impl GameRules for RouletteState {
    fn game_type(&self) -> GameType {
        GameType::RussianRoulette
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
        if *action != Action::Fire {
            return Err(ActionError::wrong_action(self.game_type(), action));
        }
        require_turn(self.turn, actor)?;

        let chamber = self.cursor;
        let loaded = self.chambers[chamber];
        self.cursor = (chamber + 1) % CHAMBERS;

        let shooter = self.players[actor].seat.id;
        let outcome = if loaded {
            self.players[actor].alive = false;
            Outcome::WinFor(self.players[other_seat(actor)].seat.id)
        } else {
            self.turn = other_seat(actor);
            Outcome::Continue
        };

        Ok(Transition::new(
            GameEvent::Shot {
                shooter,
                chamber,
                loaded,
            },
            outcome,
        ))
    }
}
