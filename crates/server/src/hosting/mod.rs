//! Live match hosting routes.

pub mod handlers;

pub use bzp_hosting::Lobby;
