//! Command handling module.
//!
//! Processes admin commands sent to the bot as chat messages.
//! Commands use the `!` prefix and are only honored in the admin room.

mod admin_room;
mod handler;
mod types;

pub use admin_room::AdminRoom;
pub use handler::CommandDispatcher;
pub use types::{AdminCommand, COMMAND_PREFIX, CommandRegistry, CommandResult, CommandSpec};
