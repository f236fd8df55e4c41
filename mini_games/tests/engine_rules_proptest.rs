/// Property-based tests for the game engines using proptest
///
/// These tests drive each engine through randomly generated games and check
/// the rules hold whatever the dice, bullets or move order turn out to be.
use mini_games::game::{
    GameRules,
    constants::{BOARD_CELLS, CHAMBERS, DICE_ROLLS, DIE_FACES, GUESS_MAX, GUESS_MIN},
    entities::{Action, GameEvent, Mark, Outcome, Seat},
    states::{DiceBattleState, NumberGuessState, RouletteState, TicTacToeState, winning_line},
};
use proptest::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

fn seats() -> [Seat; 2] {
    [
        Seat {
            id: 1,
            name: "alice".to_string(),
        },
        Seat {
            id: 2,
            name: "bob".to_string(),
        },
    ]
}

// Strategy for a full move order over the board
fn board_order_strategy() -> impl Strategy<Value = Vec<usize>> {
    Just((0..BOARD_CELLS).collect::<Vec<_>>()).prop_shuffle()
}

proptest! {
    #[test]
    fn test_roulette_hits_exactly_on_loaded_chamber(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = RouletteState::new(seats(), &mut rng);
        let bullet = state.loaded_chamber();

        for shot in 0..CHAMBERS {
            let shooter = state.turn;
            let transition = state.apply(shooter, &Action::Fire, &mut rng).unwrap();
            let GameEvent::Shot { chamber, loaded, .. } = transition.event else {
                panic!("unexpected event");
            };
            prop_assert_eq!(chamber, shot);
            prop_assert_eq!(loaded, shot == bullet);
            if loaded {
                let survivor = state.players[1 - shooter].seat.id;
                prop_assert_eq!(transition.outcome, Outcome::WinFor(survivor));
                prop_assert!(!state.players[shooter].alive);
                return Ok(());
            }
            prop_assert_eq!(transition.outcome, Outcome::Continue);
            prop_assert_eq!(state.turn, 1 - shooter);
        }
        prop_assert!(false, "bullet never fired");
    }

    #[test]
    fn test_dice_scores_are_sums_of_rolls(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = DiceBattleState::new(seats());
        let mut totals = [0_u32; 2];
        let mut rolls = [0_u8; 2];

        let outcome = loop {
            let roller = state.turn;
            let transition = state.apply(roller, &Action::Roll, &mut rng).unwrap();
            let GameEvent::Rolled { value, score, .. } = transition.event else {
                panic!("unexpected event");
            };
            prop_assert!((1..=DIE_FACES).contains(&value));
            totals[roller] += value;
            rolls[roller] += 1;
            prop_assert_eq!(score, totals[roller]);
            if transition.outcome.is_terminal() {
                break transition.outcome;
            }
        };

        prop_assert_eq!(rolls, [DICE_ROLLS, DICE_ROLLS]);
        let expected = match totals[0].cmp(&totals[1]) {
            std::cmp::Ordering::Greater => Outcome::WinFor(1),
            std::cmp::Ordering::Less => Outcome::WinFor(2),
            std::cmp::Ordering::Equal => Outcome::Draw,
        };
        prop_assert_eq!(outcome, expected);
    }

    #[test]
    fn test_tic_tac_toe_ends_on_first_line_or_full_board(order in board_order_strategy()) {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = TicTacToeState::new(seats());

        for (placed, &cell) in order.iter().enumerate() {
            let mover = state.turn;
            prop_assert_eq!(mover, placed % 2);
            let transition = state.apply(mover, &Action::Place(cell), &mut rng).unwrap();
            let mark = if mover == 0 { Mark::Cross } else { Mark::Nought };

            match transition.outcome {
                Outcome::WinFor(winner) => {
                    prop_assert_eq!(winner, state.players[mover].seat.id);
                    prop_assert!(winning_line(&state.board, mark).is_some());
                    return Ok(());
                }
                Outcome::Draw => {
                    prop_assert_eq!(placed, BOARD_CELLS - 1);
                    prop_assert!(winning_line(&state.board, Mark::Cross).is_none());
                    prop_assert!(winning_line(&state.board, Mark::Nought).is_none());
                    return Ok(());
                }
                Outcome::Continue => {
                    prop_assert!(winning_line(&state.board, mark).is_none());
                }
            }
        }
        prop_assert!(false, "game never ended");
    }

    #[test]
    fn test_number_guess_hint_points_at_target(
        target in GUESS_MIN..=GUESS_MAX,
        guess in GUESS_MIN..=GUESS_MAX,
    ) {
        let mut rng = StdRng::seed_from_u64(0);
        let mut state = NumberGuessState::with_target(seats(), target);
        let transition = state.apply(0, &Action::Guess(guess), &mut rng).unwrap();
        let GameEvent::Guessed { hint, attempts, .. } = transition.event else {
            panic!("unexpected event");
        };

        prop_assert_eq!(attempts, 1);
        if guess == target {
            prop_assert_eq!(transition.outcome, Outcome::WinFor(1));
            prop_assert!(hint.is_none());
        } else {
            prop_assert_eq!(transition.outcome, Outcome::Continue);
            prop_assert_eq!(state.turn, 1);
            let hint = hint.unwrap();
            let expected = if guess > target {
                mini_games::game::entities::Hint::Lower
            } else {
                mini_games::game::entities::Hint::Higher
            };
            prop_assert_eq!(hint, expected);
        }
    }
}
