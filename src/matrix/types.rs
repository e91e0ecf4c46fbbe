//! Matrix identifiers and bot-facing event types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sigil that starts a room id (`!opaque` or `!opaque:server`).
pub const ROOM_ID_SIGIL: char = '!';

/// Sigil that starts a room alias (`#name:server`).
pub const ROOM_ALIAS_SIGIL: char = '#';

/// A canonical Matrix room identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Wraps a room id string without checking its shape.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A room reference as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomRef {
    /// Already a canonical id, usable as is.
    Id(RoomId),
    /// Needs resolving through the connector.
    Alias(String),
}

impl RoomRef {
    /// Classifies a configured room string.
    ///
    /// Anything that is not a room id is treated as an alias.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.starts_with(ROOM_ID_SIGIL) {
            Self::Id(RoomId::new(value))
        } else {
            Self::Alias(value.to_owned())
        }
    }

    /// Checks that the value is a room id (`!opaque`, optionally with a
    /// `:server` suffix) or an alias of the form `#local:server`.
    #[must_use]
    pub fn is_well_formed(value: &str) -> bool {
        if let Some(opaque) = value.strip_prefix(ROOM_ID_SIGIL) {
            // Room version 12 ids carry no server part.
            return match opaque.split_once(':') {
                Some((local, server)) => !local.is_empty() && !server.is_empty(),
                None => !opaque.is_empty(),
            };
        }

        let Some(rest) = value.strip_prefix(ROOM_ALIAS_SIGIL) else {
            return false;
        };

        match rest.split_once(':') {
            Some((local, server)) => !local.is_empty() && !server.is_empty(),
            None => false,
        }
    }
}

/// The bot has been invited to a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteEvent {
    pub room_id: RoomId,
    /// User who sent the invite, if the server told us.
    pub sender: Option<String>,
}

/// A text message posted in a joined room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub room_id: RoomId,
    pub sender: String,
    pub body: String,
    pub event_id: Option<String>,
}

/// Events delivered to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotEvent {
    Invite(InviteEvent),
    Message(MessageEvent),
}
