//! Configuration module for the invite bot.
//!
//! Handles loading and validation of the Matrix account settings taken
//! from the environment and the connector file naming the bot's rooms.

mod connector;
mod settings;

pub use connector::{ConnectorConfig, ValidationError};
pub use settings::{BotSettings, ConfigError, MatrixConfig};

/// Key in the connector `rooms` mapping that names the admin room.
pub const ADMIN_ROOM_KEY: &str = "auto-accept-invite";
