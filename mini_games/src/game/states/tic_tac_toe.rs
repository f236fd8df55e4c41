use rand::RngCore;
use serde::Serialize;

use crate::game::{
    constants::BOARD_CELLS,
    entities::{Action, GameEvent, GameType, Mark, Outcome, PlayerId, Seat, SeatIndex, Transition, other_seat},
    state_machine::{ActionError, GameRules, require_turn},
};

/// Rows, columns, then diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// First line fully covered by `mark`.
pub fn winning_line(board: &[Option<Mark>; BOARD_CELLS], mark: Mark) -> Option<[usize; 3]> {
    WIN_LINES
        .into_iter()
        .find(|line| line.iter().all(|&cell| board[cell] == Some(mark)))
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TicTacToePlayer {
    pub seat: Seat,
    pub mark: Mark,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TicTacToeState {
    pub players: [TicTacToePlayer; 2],
    pub board: [Option<Mark>; BOARD_CELLS],
    pub turn: SeatIndex,
}

impl TicTacToeState {
    pub fn new(seats: [Seat; 2]) -> Self {
        let [challenger, opponent] = seats;
        Self {
            players: [
                TicTacToePlayer {
                    seat: challenger,
                    mark: Mark::Cross,
                },
                TicTacToePlayer {
                    seat: opponent,
                    mark: Mark::Nought,
                },
            ],
            board: [None; BOARD_CELLS],
            turn: 0,
        }
    }

    pub fn is_full(&self) -> bool {
        self.board.iter().all(Option::is_some)
    }
}

impl GameRules for TicTacToeState {
    fn game_type(&self) -> GameType {
        GameType::TicTacToe
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
        let Action::Place(cell) = *action else {
            return Err(ActionError::wrong_action(self.game_type(), action));
        };
        require_turn(self.turn, actor)?;
        if cell >= BOARD_CELLS {
            return Err(ActionError::InvalidCell(cell));
        }
        if self.board[cell].is_some() {
            return Err(ActionError::CellOccupied(cell));
        }

        let TicTacToePlayer { seat, mark } = &self.players[actor];
        let (player, mark) = (seat.id, *mark);
        self.board[cell] = Some(mark);

        let line = winning_line(&self.board, mark);
        let outcome = if line.is_some() {
            Outcome::WinFor(player)
        } else if self.is_full() {
            Outcome::Draw
        } else {
            self.turn = other_seat(actor);
            Outcome::Continue
        };

        Ok(Transition::new(
            GameEvent::Placed {
                player,
                cell,
                mark,
                line,
            },
            outcome,
        ))
    }
}
