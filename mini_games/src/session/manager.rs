//! Session registry: creates, looks up, expires and removes sessions.
//!
//! Locking: the map lock is only held to look up, insert or remove an
//! entry. Actions lock the session itself, so games in progress never wait
//! on each other. The map lock is never acquired while a session lock is held.

use chrono::Utc;
use rand::{SeedableRng, rngs::StdRng};
use serde::Serialize;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::{
    sync::{Mutex, RwLock},
    task::AbortHandle,
    time::Instant,
};

use super::{
    config::SessionConfig,
    errors::{SessionError, SessionResult},
    models::{Challenge, Session, SessionId},
};
use crate::game::entities::{Action, ChatId, GameType, PlayerId, ResultRecord, Transition};
use crate::stats::StatsRepository;

/// Everything a transport needs to render the result of one action.
#[derive(Clone, Debug, Serialize)]
pub struct ActionReport {
    pub session_id: SessionId,
    pub game_type: GameType,
    pub chat_id: ChatId,
    pub transition: Transition,
    /// State after the action was applied
    pub session: Session,
    /// Present when the action ended the game
    pub results: Option<[ResultRecord; 2]>,
}

struct SessionEntry {
    session: Arc<Mutex<Session>>,
    chat_id: ChatId,
    game_type: GameType,
    players: [PlayerId; 2],
    expiry: AbortHandle,
}

type SessionMap = Arc<RwLock<HashMap<SessionId, SessionEntry>>>;

/// Registry of active sessions
pub struct SessionManager {
    sessions: SessionMap,
    stats: Arc<dyn StatsRepository>,
    config: SessionConfig,
    seed_offset: AtomicU64,
    expired_total: Arc<AtomicU64>,
}

impl SessionManager {
    pub fn new(stats: Arc<dyn StatsRepository>, config: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            stats,
            config,
            seed_offset: AtomicU64::new(0),
            expired_total: Arc::new(AtomicU64::new(0)),
        }
    }

    fn session_rng(&self) -> StdRng {
        match self.config.rng_seed {
            Some(seed) => {
                let offset = self.seed_offset.fetch_add(1, Ordering::Relaxed);
                StdRng::seed_from_u64(seed.wrapping_add(offset))
            }
            None => StdRng::from_os_rng(),
        }
    }

    /// Start a new game and schedule its expiry
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidAction`] for self-play or a bot opponent.
    pub async fn create(&self, challenge: Challenge) -> SessionResult<SessionId> {
        challenge.validate()?;

        let names = [
            (challenge.challenger.id, challenge.challenger.name.clone()),
            (challenge.opponent.id, challenge.opponent.name.clone()),
        ];
        let timeout = self.config.idle_timeout();
        let session = Session::new(
            challenge,
            Utc::now(),
            Instant::now() + timeout,
            self.session_rng(),
        );
        let id = session.id.clone();
        let chat_id = session.chat_id;
        let game_type = session.game_type();
        let players = session.players();

        let expiry = {
            let sessions = Arc::clone(&self.sessions);
            let expired_total = Arc::clone(&self.expired_total);
            let id = id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                if expire(&sessions, &id).await {
                    expired_total.fetch_add(1, Ordering::Relaxed);
                }
            })
            .abort_handle()
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            id.clone(),
            SessionEntry {
                session: Arc::new(Mutex::new(session)),
                chat_id,
                game_type,
                players,
                expiry,
            },
        );
        drop(sessions);

        log::info!("Created {game_type} session {id} in chat {chat_id}");

        for (user_id, name) in names {
            if let Err(e) = self.stats.ensure_player(user_id, chat_id, &name).await {
                log::error!("Failed to register player {user_id} in chat {chat_id}: {e}");
            }
        }

        Ok(id)
    }

    async fn handle(&self, id: &SessionId) -> SessionResult<Arc<Mutex<Session>>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .map(|entry| Arc::clone(&entry.session))
            .ok_or_else(|| SessionError::SessionNotFound(id.clone()))
    }

    /// Snapshot of a live session
    pub async fn get(&self, id: &SessionId) -> SessionResult<Session> {
        let handle = self.handle(id).await?;
        let session = handle.lock().await;
        if session.closed {
            return Err(SessionError::SessionNotFound(id.clone()));
        }
        if session.is_expired(Instant::now()) {
            drop(session);
            self.expire_now(id).await;
            return Err(SessionError::SessionNotFound(id.clone()));
        }
        Ok(session.clone())
    }

    /// Drop a session without recording anything. Removing a missing session
    /// is not an error.
    pub async fn remove(&self, id: &SessionId) {
        if let Some(handle) = take_entry(&self.sessions, id).await {
            handle.lock().await.closed = true;
            log::debug!("Removed session {id}");
        }
    }

    async fn expire_now(&self, id: &SessionId) {
        if expire(&self.sessions, id).await {
            self.expired_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// The session of `game_type` in `chat_id` where it's `player_id`'s turn
    ///
    /// When more than one qualifies, the earliest created wins.
    pub async fn find_active_by_turn(
        &self,
        chat_id: ChatId,
        player_id: PlayerId,
        game_type: GameType,
    ) -> Option<Session> {
        let candidates: Vec<_> = {
            let sessions = self.sessions.read().await;
            sessions
                .values()
                .filter(|entry| {
                    entry.chat_id == chat_id
                        && entry.game_type == game_type
                        && entry.players.contains(&player_id)
                })
                .map(|entry| Arc::clone(&entry.session))
                .collect()
        };

        // Several games can wait on the same player; the oldest one gets the input.
        let now = Instant::now();
        let mut oldest: Option<Session> = None;
        for handle in candidates {
            let session = handle.lock().await;
            if session.closed
                || session.is_expired(now)
                || session.current_player() != Some(player_id)
            {
                continue;
            }
            let older = oldest.as_ref().is_none_or(|best| {
                (session.created_at, session.id.as_str()) < (best.created_at, best.id.as_str())
            });
            if older {
                oldest = Some(session.clone());
            }
        }
        oldest
    }

    /// Apply `action` on behalf of `actor`
    ///
    /// A terminal outcome removes the session and records both players'
    /// results before returning.
    ///
    /// # Errors
    ///
    /// - [`SessionError::SessionNotFound`] if the game already ended or expired
    /// - [`SessionError::InvalidAction`] if the action was rejected
    pub async fn apply_action(
        &self,
        id: &SessionId,
        actor: PlayerId,
        action: Action,
    ) -> SessionResult<ActionReport> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;

        if session.closed {
            return Err(SessionError::SessionNotFound(id.clone()));
        }
        if session.is_expired(Instant::now()) {
            drop(session);
            self.expire_now(id).await;
            return Err(SessionError::SessionNotFound(id.clone()));
        }

        let transition = match session.apply(actor, &action) {
            Ok(transition) => transition,
            Err(e) => {
                log::debug!("Rejected {action} from {actor} in {id}: {e}");
                return Err(e.into());
            }
        };
        log::debug!("{id}: {action} from {actor} -> {:?}", transition.outcome);

        let results = session.result_records(&transition.outcome);
        if results.is_some() {
            session.closed = true;
        }
        let report = ActionReport {
            session_id: id.clone(),
            game_type: session.game_type(),
            chat_id: session.chat_id,
            transition,
            session: session.clone(),
            results,
        };
        drop(session);

        if let Some(records) = results {
            take_entry(&self.sessions, id).await;
            log::info!(
                "{} session {id} finished: {:?}",
                report.game_type,
                report.transition.outcome
            );
            self.record_results(report.chat_id, report.game_type, &records)
                .await;
        }

        Ok(report)
    }

    async fn record_results(&self, chat_id: ChatId, game_type: GameType, records: &[ResultRecord]) {
        for record in records {
            if let Err(e) = self
                .stats
                .record_result(record.player_id, chat_id, game_type, record.won)
                .await
            {
                log::error!(
                    "Failed to record {game_type} result for {} in chat {chat_id}: {e}",
                    record.player_id
                );
            }
        }
    }

    /// Route a free-text message to the text-driven game waiting on `player_id`
    ///
    /// Digits go to a number guess first, then quick math; a signed number
    /// can only be a quick math answer. Returns `None` when the text isn't a
    /// number or no game is waiting on this player.
    pub async fn route_text(
        &self,
        chat_id: ChatId,
        player_id: PlayerId,
        text: &str,
    ) -> Option<SessionResult<ActionReport>> {
        let text = text.trim();
        let value: i64 = text.parse().ok()?;
        let digits_only = text.bytes().all(|b| b.is_ascii_digit());

        let candidates: &[GameType] = if digits_only {
            &[GameType::NumberGuess, GameType::QuickMath]
        } else {
            &[GameType::QuickMath]
        };

        for &game_type in candidates {
            let Some(session) = self.find_active_by_turn(chat_id, player_id, game_type).await else {
                continue;
            };
            let action = match game_type {
                GameType::NumberGuess => Action::Guess(value),
                _ => Action::Answer(value),
            };
            return Some(self.apply_action(&session.id, player_id, action).await);
        }
        None
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Sessions dropped by the idle timeout since startup
    pub fn expired_total(&self) -> u64 {
        self.expired_total.load(Ordering::Relaxed)
    }
}

/// Removes the entry and cancels its timer, returning the session handle if
/// it was still registered.
async fn take_entry(sessions: &SessionMap, id: &SessionId) -> Option<Arc<Mutex<Session>>> {
    let entry = sessions.write().await.remove(id)?;
    entry.expiry.abort();
    Some(entry.session)
}

/// Drops an expired session. Returns false if it was already gone or had
/// just finished.
async fn expire(sessions: &SessionMap, id: &SessionId) -> bool {
    let Some(entry) = sessions.write().await.remove(id) else {
        return false;
    };
    let mut session = entry.session.lock().await;
    if session.closed {
        return false;
    }
    session.closed = true;
    log::debug!("Session {id} expired");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::{CoinSide, GameEvent, Hint, Outcome, Participant};
    use crate::game::{ActionError, SessionState};
    use crate::stats::InMemoryStatsRepository;
    use std::time::Duration;

    const CHAT: ChatId = -500;
    const ALICE: PlayerId = 10;
    const BOB: PlayerId = 20;

    fn manager() -> (SessionManager, Arc<InMemoryStatsRepository>) {
        let stats = Arc::new(InMemoryStatsRepository::new());
        let config = SessionConfig {
            rng_seed: Some(7),
            ..SessionConfig::default()
        };
        (SessionManager::new(stats.clone(), config), stats)
    }

    fn challenge(game_type: GameType) -> Challenge {
        Challenge {
            game_type,
            chat_id: CHAT,
            challenger: Participant::new(ALICE, "alice"),
            opponent: Participant::new(BOB, "bob"),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let (manager, stats) = manager();
        let id = manager.create(challenge(GameType::TicTacToe)).await.unwrap();

        let session = manager.get(&id).await.unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.game_type(), GameType::TicTacToe);
        assert_eq!(session.current_player(), Some(ALICE));
        assert_eq!(manager.active_count().await, 1);

        let alice = stats.player_stats(ALICE, CHAT).await.unwrap().unwrap();
        assert_eq!(alice.username, "alice");
    }

    #[tokio::test]
    async fn test_create_rejects_self_play() {
        let (manager, _) = manager();
        let mut challenge = challenge(GameType::CoinFlip);
        challenge.opponent = Participant::new(ALICE, "alice");

        let err = manager.create(challenge).await.unwrap_err();
        assert_eq!(err, SessionError::InvalidAction(ActionError::SelfPlay));
        assert_eq!(manager.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let (manager, _) = manager();
        let id = manager.create(challenge(GameType::DiceBattle)).await.unwrap();

        manager.remove(&id).await;
        manager.remove(&id).await;

        assert!(matches!(
            manager.get(&id).await,
            Err(SessionError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejected_action_keeps_session() {
        let (manager, _) = manager();
        let id = manager.create(challenge(GameType::TicTacToe)).await.unwrap();
        let before = manager.get(&id).await.unwrap().state;

        let err = manager
            .apply_action(&id, BOB, Action::Place(4))
            .await
            .unwrap_err();
        assert_eq!(err, SessionError::InvalidAction(ActionError::OutOfTurnAction));
        assert_eq!(manager.get(&id).await.unwrap().state, before);
    }

    #[tokio::test]
    async fn test_terminal_outcome_removes_and_records() {
        let (manager, stats) = manager();
        let id = manager.create(challenge(GameType::TicTacToe)).await.unwrap();

        let moves = [(ALICE, 0), (BOB, 3), (ALICE, 1), (BOB, 4), (ALICE, 2)];
        let mut last = None;
        for (player, cell) in moves {
            last = Some(
                manager
                    .apply_action(&id, player, Action::Place(cell))
                    .await
                    .unwrap(),
            );
        }

        let report = last.unwrap();
        assert_eq!(report.transition.outcome, Outcome::WinFor(ALICE));
        assert!(report.results.is_some());
        assert!(matches!(
            manager.get(&id).await,
            Err(SessionError::SessionNotFound(_))
        ));

        let alice = stats.player_stats(ALICE, CHAT).await.unwrap().unwrap();
        let bob = stats.player_stats(BOB, CHAT).await.unwrap().unwrap();
        assert_eq!((alice.wins, alice.points), (1, 1));
        assert_eq!((bob.losses, bob.points), (1, -1));
    }

    #[tokio::test]
    async fn test_find_active_by_turn_prefers_oldest() {
        let (manager, _) = manager();
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(manager.create(challenge(GameType::NumberGuess)).await.unwrap());
            tokio::time::sleep(Duration::from_millis(2)).await;
        }

        for expected in &ids {
            for _ in 0..3 {
                let found = manager
                    .find_active_by_turn(CHAT, ALICE, GameType::NumberGuess)
                    .await
                    .unwrap();
                assert_eq!(&found.id, expected);
            }
            manager.remove(expected).await;
        }
    }

    #[tokio::test]
    async fn test_find_active_by_turn() {
        let (manager, _) = manager();
        let id = manager.create(challenge(GameType::NumberGuess)).await.unwrap();

        let found = manager
            .find_active_by_turn(CHAT, ALICE, GameType::NumberGuess)
            .await
            .unwrap();
        assert_eq!(found.id, id);

        assert!(manager
            .find_active_by_turn(CHAT, BOB, GameType::NumberGuess)
            .await
            .is_none());
        assert!(manager
            .find_active_by_turn(CHAT + 1, ALICE, GameType::NumberGuess)
            .await
            .is_none());
        assert!(manager
            .find_active_by_turn(CHAT, ALICE, GameType::QuickMath)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_route_text_guesses() {
        let (manager, _) = manager();
        let id = manager.create(challenge(GameType::NumberGuess)).await.unwrap();
        let SessionState::NumberGuess(state) = manager.get(&id).await.unwrap().state else {
            panic!("wrong state");
        };
        let wrong = if state.target() == 100 { 1 } else { 100 };

        assert!(manager.route_text(CHAT, ALICE, "hello").await.is_none());
        assert!(manager.route_text(CHAT, BOB, "50").await.is_none());

        let report = manager
            .route_text(CHAT, ALICE, &wrong.to_string())
            .await
            .unwrap()
            .unwrap();
        let GameEvent::Guessed { hint, .. } = report.transition.event else {
            panic!("unexpected event");
        };
        let expected = if wrong > state.target() {
            Hint::Lower
        } else {
            Hint::Higher
        };
        assert_eq!(hint, Some(expected));
        assert_eq!(report.session.current_player(), Some(BOB));
    }

    #[tokio::test]
    async fn test_route_text_signed_number_skips_guessing() {
        let (manager, _) = manager();
        manager.create(challenge(GameType::NumberGuess)).await.unwrap();
        assert!(manager.route_text(CHAT, ALICE, "-5").await.is_none());

        let id = manager.create(challenge(GameType::QuickMath)).await.unwrap();
        let report = manager
            .route_text(CHAT, ALICE, "-5")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.session_id, id);
        assert!(matches!(report.transition.event, GameEvent::Answered { .. }));
    }

    #[tokio::test]
    async fn test_coin_flip_late_choice_not_found() {
        let (manager, _) = manager();
        let id = manager.create(challenge(GameType::CoinFlip)).await.unwrap();

        manager
            .apply_action(&id, BOB, Action::Choose(CoinSide::Heads))
            .await
            .unwrap();
        let report = manager
            .apply_action(&id, ALICE, Action::Choose(CoinSide::Tails))
            .await
            .unwrap();
        assert!(matches!(report.transition.outcome, Outcome::WinFor(_)));

        let err = manager
            .apply_action(&id, ALICE, Action::Choose(CoinSide::Heads))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::SessionNotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_session_expires_without_stats() {
        let (manager, stats) = manager();
        let id = manager.create(challenge(GameType::DiceBattle)).await.unwrap();
        manager
            .apply_action(&id, ALICE, Action::Roll)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(601)).await;

        assert!(matches!(
            manager.get(&id).await,
            Err(SessionError::SessionNotFound(_))
        ));
        assert_eq!(manager.active_count().await, 0);
        assert_eq!(manager.expired_total(), 1);

        let alice = stats.player_stats(ALICE, CHAT).await.unwrap().unwrap();
        assert_eq!((alice.wins, alice.losses), (0, 0));
        assert!(stats.game_stats(ALICE, CHAT).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_finished_session_timer_is_harmless() {
        let (manager, _) = manager();
        let id = manager.create(challenge(GameType::CoinFlip)).await.unwrap();
        manager
            .apply_action(&id, ALICE, Action::Choose(CoinSide::Heads))
            .await
            .unwrap();
        manager
            .apply_action(&id, BOB, Action::Choose(CoinSide::Tails))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(601)).await;
        assert_eq!(manager.expired_total(), 0);
    }
}
