//! Invite handling module.
//!
//! Joins rooms the bot is invited to while auto-accept is enabled.

mod handler;

pub use handler::{AutoInviteToggle, InviteHandler, InviteOutcome};
