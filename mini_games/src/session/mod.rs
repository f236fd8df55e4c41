//! Session registry.
//!
//! A session is one game between two chat users. The registry keeps every
//! running session, applies actions to them one at a time, removes them when
//! they finish, and drops them after the idle window if nobody finishes them.
//!
//! ## Example
//!
//! ```no_run
//! use mini_games::game::entities::{Action, GameType, Participant};
//! use mini_games::session::{Challenge, SessionConfig, SessionManager};
//! use mini_games::stats::InMemoryStatsRepository;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = SessionManager::new(
//!         Arc::new(InMemoryStatsRepository::new()),
//!         SessionConfig::default(),
//!     );
//!
//!     let id = manager
//!         .create(Challenge {
//!             game_type: GameType::RussianRoulette,
//!             chat_id: -100,
//!             challenger: Participant::new(1, "alice"),
//!             opponent: Participant::new(2, "bob"),
//!         })
//!         .await?;
//!
//!     let report = manager.apply_action(&id, 1, Action::Fire).await?;
//!     println!("{:?}", report.transition.outcome);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod errors;
pub mod manager;
pub mod models;

pub use config::SessionConfig;
pub use errors::{SessionError, SessionResult};
pub use manager::{ActionReport, SessionManager};
pub use models::{Challenge, Session, SessionId};
