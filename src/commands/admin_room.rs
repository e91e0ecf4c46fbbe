//! Lazily resolved admin room.

use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::config::ADMIN_ROOM_KEY;
use crate::matrix::{Connector, RoomId, RoomRef};

/// The single room from which admin commands are accepted.
///
/// Resolved on first use and cached for the process lifetime. A failed
/// resolution is cached too, so it is never retried.
#[derive(Debug, Default)]
pub struct AdminRoom {
    resolved: OnceCell<Option<RoomId>>,
}

impl AdminRoom {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the admin room id, resolving it on the first call.
    ///
    /// Concurrent first calls share a single resolution.
    pub async fn get<C: Connector + ?Sized>(&self, connector: &C) -> Option<&RoomId> {
        self.resolved
            .get_or_init(|| resolve(connector))
            .await
            .as_ref()
    }

    /// Cached value without triggering resolution.
    #[must_use]
    pub fn cached(&self) -> Option<&RoomId> {
        self.resolved.get().and_then(Option::as_ref)
    }

    /// True once a resolution attempt has completed, successful or not.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.resolved.initialized()
    }
}

async fn resolve<C: Connector + ?Sized>(connector: &C) -> Option<RoomId> {
    let Some(configured) = connector.config().admin_room() else {
        warn!(
            "No '{}' room configured; admin commands are disabled",
            ADMIN_ROOM_KEY
        );
        return None;
    };

    match RoomRef::parse(configured) {
        RoomRef::Id(room_id) => {
            debug!("Admin room is {}", room_id);
            Some(room_id)
        }
        RoomRef::Alias(alias) => match connector.resolve_room_alias(&alias).await {
            Ok(room_id) => {
                info!("Resolved admin room {} to {}", alias, room_id);
                Some(room_id)
            }
            Err(e) => {
                let status = e
                    .status_code()
                    .map_or_else(|| "none".to_owned(), |s| s.to_string());
                error!(
                    "Error resolving admin room alias {}: {} (status code {})",
                    alias, e, status
                );
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::matrix::mock::MockConnector;

    #[tokio::test]
    async fn test_direct_id_skips_resolution() {
        let connector = MockConnector::new().with_room(ADMIN_ROOM_KEY, "!admin:example.org");
        let admin = AdminRoom::new();

        assert_eq!(
            admin.get(&connector).await,
            Some(&RoomId::new("!admin:example.org"))
        );
        assert_eq!(connector.resolve_count(), 0);
    }

    #[tokio::test]
    async fn test_alias_resolved_once() {
        let connector = MockConnector::new()
            .with_room(ADMIN_ROOM_KEY, "#admin:example.org")
            .with_alias("#admin:example.org", "!abc:example.org");
        let admin = AdminRoom::new();

        assert!(!admin.is_settled());
        assert_eq!(
            admin.get(&connector).await,
            Some(&RoomId::new("!abc:example.org"))
        );
        assert_eq!(
            admin.get(&connector).await,
            Some(&RoomId::new("!abc:example.org"))
        );
        assert_eq!(connector.resolve_count(), 1);
        assert_eq!(admin.cached(), Some(&RoomId::new("!abc:example.org")));
    }

    #[tokio::test]
    async fn test_failed_resolution_is_cached() {
        let connector = MockConnector::new().with_room(ADMIN_ROOM_KEY, "#missing:example.org");
        let admin = AdminRoom::new();

        assert_eq!(admin.get(&connector).await, None);
        assert_eq!(admin.get(&connector).await, None);
        assert!(admin.is_settled());
        assert_eq!(connector.resolve_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_entry() {
        let connector = MockConnector::new().with_room("main", "#general:example.org");
        let admin = AdminRoom::new();

        assert_eq!(admin.get(&connector).await, None);
        assert_eq!(connector.resolve_count(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_resolve_once() {
        let connector = Arc::new(
            MockConnector::new()
                .with_room(ADMIN_ROOM_KEY, "#admin:example.org")
                .with_alias("#admin:example.org", "!abc:example.org")
                .with_resolve_delay(Duration::from_millis(20)),
        );
        let admin = Arc::new(AdminRoom::new());

        let mut handles = Vec::new();
        for _ in 0..8 {
            let connector = Arc::clone(&connector);
            let admin = Arc::clone(&admin);
            handles.push(tokio::spawn(async move {
                admin.get(connector.as_ref()).await.cloned()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Some(RoomId::new("!abc:example.org")));
        }
        assert_eq!(connector.resolve_count(), 1);
    }
}
