//! Connector configuration and validation.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ADMIN_ROOM_KEY;
use crate::matrix::RoomRef;

/// Errors that can occur while loading or validating the connector file.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Room '{name}' has an invalid value '{value}' (expected !id, !id:server or #alias:server)")]
    InvalidRoom { name: String, value: String },

    #[error("Room entry has an empty name")]
    EmptyName,

    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Per-connector configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectorConfig {
    /// Named rooms, each a room id or alias.
    #[serde(default)]
    pub rooms: BTreeMap<String, String>,
}

impl ConnectorConfig {
    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ValidationError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates all room entries.
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_all().into_iter().collect()
    }

    /// Returns a validation result for every room entry, in name order.
    #[must_use]
    pub fn validate_all(&self) -> Vec<Result<(), ValidationError>> {
        self.rooms
            .iter()
            .map(|(name, value)| {
                if name.trim().is_empty() {
                    Err(ValidationError::EmptyName)
                } else if RoomRef::is_well_formed(value) {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidRoom {
                        name: name.clone(),
                        value: value.clone(),
                    })
                }
            })
            .collect()
    }

    /// Configured admin room reference, if any.
    #[must_use]
    pub fn admin_room(&self) -> Option<&str> {
        self.rooms.get(ADMIN_ROOM_KEY).map(String::as_str)
    }

    /// Number of configured rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns true if no rooms are configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Creates an example configuration.
    #[must_use]
    pub fn example() -> Self {
        let mut rooms = BTreeMap::new();
        rooms.insert(ADMIN_ROOM_KEY.to_owned(), "#bot-admin:example.org".to_owned());
        rooms.insert("main".to_owned(), "#general:example.org".to_owned());
        Self { rooms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_connector_file() {
        let json = r##"{ "rooms": { "auto-accept-invite": "#admin:example.org" } }"##;
        let config: ConnectorConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.admin_room(), Some("#admin:example.org"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_rooms_defaults_empty() {
        let config: ConnectorConfig = serde_json::from_str("{}").unwrap();
        assert!(config.is_empty());
        assert_eq!(config.admin_room(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_room_value() {
        let mut config = ConnectorConfig::example();
        config.rooms.insert("broken".to_owned(), "general".to_owned());

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidRoom { ref name, .. } if name == "broken"));

        let results = config.validate_all();
        assert_eq!(results.len(), 3);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[test]
    fn test_room_id_without_server_is_valid() {
        let mut config = ConnectorConfig::default();
        config.rooms.insert(
            ADMIN_ROOM_KEY.to_owned(),
            "!31hneApxJ_1o-63DmFrpeqnkFfWppnzWso1JvH3ogLM".to_owned(),
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_example_is_valid() {
        let config = ConnectorConfig::example();
        assert!(config.validate().is_ok());
        assert_eq!(config.admin_room(), Some("#bot-admin:example.org"));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!(
            "invite_bot_connector_{}.json",
            std::process::id()
        ));
        let config = ConnectorConfig::example();
        config.save_to_file(&path).unwrap();
        let loaded = ConnectorConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
