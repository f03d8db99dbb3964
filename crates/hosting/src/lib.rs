//! Match hosting infrastructure.
//!
//! Sits between the HTTP/WebSocket surface and the match engine: rooms
//! are created and seated here, client sockets are bridged onto room
//! command queues, and finished matches are reported to the stats seam.
//!
//! - [`Lobby`] — Room registry, seat binding, and WebSocket bridging
//! - [`QuestionSource`] — Deck seam; [`Deck`] draws from memory or a JSON file
//! - [`StatsStore`] — Rating/result seam; [`NullStats`] and [`MemoryStats`] ship in-process
mod lobby;
mod session;
mod source;
mod stats;

pub use lobby::*;
pub use session::*;
pub use source::*;
pub use stats::*;
