//! Concurrent access to the session registry.

use mini_games::game::entities::{Action, GameType, Outcome, Participant};
use mini_games::game::ActionError;
use mini_games::session::{Challenge, SessionConfig, SessionError, SessionManager};
use mini_games::stats::{InMemoryStatsRepository, StatsRepository};
use std::sync::Arc;

fn manager() -> (Arc<SessionManager>, Arc<InMemoryStatsRepository>) {
    let stats = Arc::new(InMemoryStatsRepository::new());
    let manager = SessionManager::new(stats.clone(), SessionConfig::default());
    (Arc::new(manager), stats)
}

fn challenge(game_type: GameType, chat_id: i64) -> Challenge {
    Challenge {
        game_type,
        chat_id,
        challenger: Participant::new(1, "alice"),
        opponent: Participant::new(2, "bob"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_turn_claims_accept_exactly_one() {
    let (manager, _) = manager();

    for round in 0..50 {
        let id = manager
            .create(challenge(GameType::TicTacToe, round))
            .await
            .unwrap();

        let first = {
            let manager = Arc::clone(&manager);
            let id = id.clone();
            tokio::spawn(async move { manager.apply_action(&id, 1, Action::Place(0)).await })
        };
        let second = {
            let manager = Arc::clone(&manager);
            let id = id.clone();
            tokio::spawn(async move { manager.apply_action(&id, 1, Action::Place(8)).await })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let accepted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(accepted, 1, "round {round}");

        let rejected = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(
            rejected,
            &SessionError::InvalidAction(ActionError::OutOfTurnAction)
        );

        let session = manager.get(&id).await.unwrap();
        assert_eq!(session.current_player(), Some(2));
        manager.remove(&id).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_final_moves_finish_once() {
    let (manager, stats) = manager();
    let chat = 77;
    let id = manager
        .create(challenge(GameType::RussianRoulette, chat))
        .await
        .unwrap();

    // Fire until the game ends, with several copies of every shot in flight.
    let mut terminal = 0;
    for _ in 0..6 {
        let shooter = match manager.get(&id).await {
            Ok(session) => session.current_player().unwrap(),
            Err(_) => break,
        };
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let manager = Arc::clone(&manager);
                let id = id.clone();
                tokio::spawn(async move { manager.apply_action(&id, shooter, Action::Fire).await })
            })
            .collect();
        for handle in handles {
            if let Ok(report) = handle.await.unwrap() {
                if report.transition.outcome.is_terminal() {
                    terminal += 1;
                }
            }
        }
    }

    assert_eq!(terminal, 1);
    let a = stats.player_stats(1, chat).await.unwrap().unwrap();
    let b = stats.player_stats(2, chat).await.unwrap().unwrap();
    assert_eq!(a.wins + b.wins, 1);
    assert_eq!(a.losses + b.losses, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_sessions_progress_in_parallel() {
    let (manager, _) = manager();
    let mut handles = Vec::new();

    for chat in 0..32 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move {
            let id = manager
                .create(challenge(GameType::DiceBattle, chat))
                .await
                .unwrap();
            let mut outcome = Outcome::Continue;
            for player in [1, 1, 1, 2, 2, 2] {
                outcome = manager
                    .apply_action(&id, player, Action::Roll)
                    .await
                    .unwrap()
                    .transition
                    .outcome;
            }
            outcome
        }));
    }

    for handle in handles {
        assert!(handle.await.unwrap().is_terminal());
    }
    assert_eq!(manager.active_count().await, 0);
}
