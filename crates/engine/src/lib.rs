//! Rules and runtime for a head-to-head trivia betting match.
//!
//! The crate is split along a functional-core / imperative-shell line:
//! the engine is a pure state machine that turns player actions and
//! timer expiries into ordered effects, and the room is the async task
//! that owns it, runs the clocks, and broadcasts to clients.
//!
//! ## Architecture
//!
//! - [`MatchEngine`] — Match state machine; pure, deterministic, silent on illegal input
//! - [`Room`] — Async coordinator applying one [`Command`] at a time
//! - [`Protocol`] — Wire codec between internal events and client JSON
//!
//! ## State
//!
//! - [`Ledger`] — Per-question betting state, pots, and contributions
//! - [`ClueState`] / [`BuzzerState`] — Reveal progress and buzz arbitration
//! - [`Snapshot`] — Reconnect-safe view of a match in flight
mod action;
mod buzzer;
mod clue;
mod config;
mod engine;
mod event;
mod ledger;
mod message;
mod player;
mod protocol;
mod question;
mod room;
mod slot;
mod snapshot;
mod timer;

pub use action::*;
pub use buzzer::*;
pub use clue::*;
pub use config::*;
pub use engine::*;
pub use event::*;
pub use ledger::*;
pub use message::*;
pub use player::*;
pub use protocol::*;
pub use question::*;
pub use room::*;
pub use slot::*;
pub use snapshot::*;
pub use timer::*;
