//! Matrix connector module.
//!
//! Provides the `Connector` seam used by the bot handlers, a small
//! client-server API client implementing it, sync-response decoding,
//! and rate limiting for outgoing messages.

mod client;
mod connector;
mod error;
pub mod events;
mod rate_limiter;
mod sync;
mod types;

pub use client::MatrixClient;
pub use connector::Connector;
#[cfg(test)]
pub(crate) use connector::mock;
pub use error::MatrixError;
pub use rate_limiter::RateLimiter;
pub use sync::{SyncLoop, SyncSource};
pub use types::{BotEvent, InviteEvent, MessageEvent, RoomId, RoomRef};
