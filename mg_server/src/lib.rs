//! HTTP adapter for the mini-games engine.
//!
//! Exposes session creation, actions, free-text routing and statistics over
//! a small JSON API. Chat transports (bots, bridges) sit in front of it.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
