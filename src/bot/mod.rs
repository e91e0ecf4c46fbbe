//! Event dispatch module.
//!
//! Routes events from the sync loop to the invite handler and the
//! admin command dispatcher.

mod runner;

pub use runner::{BotMessage, EventRunner};
