//! The connector seam between bot logic and the messaging protocol.

use async_trait::async_trait;

use super::{MatrixError, RoomId};
use crate::config::ConnectorConfig;

/// Operations the bot needs from a messaging connector.
///
/// `MatrixClient` is the production implementation; tests use a recording
/// mock so the handlers can be exercised without a homeserver.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Fully qualified user id of the bot account.
    fn own_user_id(&self) -> &str;

    /// Per-connector configuration (the `rooms` mapping).
    fn config(&self) -> &ConnectorConfig;

    /// Joins a room the bot was invited to.
    async fn join_room(&self, room_id: &RoomId) -> Result<(), MatrixError>;

    /// Resolves a room alias (`#name:server`) to its canonical id.
    async fn resolve_room_alias(&self, alias: &str) -> Result<RoomId, MatrixError>;

    /// Posts a plain text message to a room.
    async fn send_text(&self, room_id: &RoomId, body: &str) -> Result<(), MatrixError>;
}

#[cfg(test)]
pub(crate) mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    pub const BOT_USER: &str = "@invitebot:example.org";

    /// Connector that records every call instead of hitting the network.
    #[derive(Debug, Default)]
    pub struct MockConnector {
        config: ConnectorConfig,
        aliases: HashMap<String, RoomId>,
        resolve_delay: Option<Duration>,
        pub joins: Mutex<Vec<RoomId>>,
        pub sent: Mutex<Vec<(RoomId, String)>>,
        pub resolve_calls: AtomicUsize,
        pub fail_joins: bool,
    }

    impl MockConnector {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_room(mut self, name: &str, value: &str) -> Self {
            self.config.rooms.insert(name.to_owned(), value.to_owned());
            self
        }

        pub fn with_alias(mut self, alias: &str, room_id: &str) -> Self {
            self.aliases.insert(alias.to_owned(), RoomId::new(room_id));
            self
        }

        pub fn with_resolve_delay(mut self, delay: Duration) -> Self {
            self.resolve_delay = Some(delay);
            self
        }

        pub fn failing_joins(mut self) -> Self {
            self.fail_joins = true;
            self
        }

        pub fn join_count(&self) -> usize {
            self.joins.lock().unwrap().len()
        }

        pub fn sent_messages(&self) -> Vec<(RoomId, String)> {
            self.sent.lock().unwrap().clone()
        }

        pub fn resolve_count(&self) -> usize {
            self.resolve_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Connector for MockConnector {
        fn own_user_id(&self) -> &str {
            BOT_USER
        }

        fn config(&self) -> &ConnectorConfig {
            &self.config
        }

        async fn join_room(&self, room_id: &RoomId) -> Result<(), MatrixError> {
            self.joins.lock().unwrap().push(room_id.clone());
            if self.fail_joins {
                return Err(MatrixError::Api {
                    status: 403,
                    errcode: "M_FORBIDDEN".to_owned(),
                    message: "You are not invited to this room.".to_owned(),
                });
            }
            Ok(())
        }

        async fn resolve_room_alias(&self, alias: &str) -> Result<RoomId, MatrixError> {
            self.resolve_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.resolve_delay {
                tokio::time::sleep(delay).await;
            }
            self.aliases
                .get(alias)
                .cloned()
                .ok_or_else(|| MatrixError::Api {
                    status: 404,
                    errcode: "M_NOT_FOUND".to_owned(),
                    message: format!("Room alias {alias} not found"),
                })
        }

        async fn send_text(&self, room_id: &RoomId, body: &str) -> Result<(), MatrixError> {
            self.sent
                .lock()
                .unwrap()
                .push((room_id.clone(), body.to_owned()));
            Ok(())
        }
    }
}
