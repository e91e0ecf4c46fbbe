//! Admin command dispatcher.

use tracing::{debug, info};

use super::AdminRoom;
use super::types::{AdminCommand, CommandRegistry, CommandResult};
use crate::matrix::{Connector, MessageEvent};

/// Matches messages against the registry and runs commands sent from the
/// admin room.
#[derive(Debug)]
pub struct CommandDispatcher {
    registry: CommandRegistry,

    admin_room: AdminRoom,
}

impl CommandDispatcher {
    /// Creates a new dispatcher over the given registry.
    #[must_use]
    pub fn new(registry: CommandRegistry) -> Self {
        Self {
            registry,
            admin_room: AdminRoom::new(),
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn admin_room(&self) -> &AdminRoom {
        &self.admin_room
    }

    /// Tries to match and execute a command from a message.
    ///
    /// Returns `None` if the message is not a command or was not sent in
    /// the admin room.
    pub async fn try_handle<C: Connector + ?Sized>(
        &self,
        connector: &C,
        message: &MessageEvent,
    ) -> Option<CommandResult> {
        let spec = self.registry.match_command(&message.body)?;

        let admin_room = self.admin_room.get(connector).await?;
        if *admin_room != message.room_id {
            debug!(
                "Ignoring {} from {} outside the admin room",
                spec.trigger(),
                message.room_id
            );
            return None;
        }

        debug!("Handling command: {}", spec.command);
        let result = self.execute(spec.command);
        info!(
            "Command {} from {}: success={}",
            spec.command, message.sender, result.success
        );

        Some(result)
    }

    /// Executes a matched command.
    fn execute(&self, command: AdminCommand) -> CommandResult {
        match command {
            AdminCommand::Help => self.handle_help(),
            AdminCommand::Rooms => CommandResult::not_implemented("Not Implemented yet"),
            AdminCommand::Stop | AdminCommand::Start => {
                CommandResult::not_implemented("Not Implemented yet.")
            }
        }
    }

    fn handle_help(&self) -> CommandResult {
        CommandResult::success(self.registry.help_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ADMIN_ROOM_KEY;
    use crate::matrix::RoomId;
    use crate::matrix::mock::MockConnector;

    const ADMIN: &str = "!admin:example.org";
    const OTHER: &str = "!other:example.org";

    fn message(room: &str, body: &str) -> MessageEvent {
        MessageEvent {
            room_id: RoomId::new(room),
            sender: "@alice:example.org".to_owned(),
            body: body.to_owned(),
            event_id: None,
        }
    }

    fn admin_connector() -> MockConnector {
        MockConnector::new()
            .with_room(ADMIN_ROOM_KEY, "#admin:example.org")
            .with_alias("#admin:example.org", ADMIN)
    }

    #[tokio::test]
    async fn test_help_in_admin_room_lists_all_commands() {
        let connector = admin_connector();
        let dispatcher = CommandDispatcher::new(CommandRegistry::standard());

        let result = dispatcher
            .try_handle(&connector, &message(ADMIN, "!help"))
            .await
            .unwrap();

        assert!(result.success);
        for spec in dispatcher.registry().iter() {
            assert!(result.message.contains(spec.trigger()));
        }
    }

    #[tokio::test]
    async fn test_command_outside_admin_room_ignored() {
        let connector = admin_connector();
        let dispatcher = CommandDispatcher::new(CommandRegistry::standard());

        assert!(
            dispatcher
                .try_handle(&connector, &message(OTHER, "!rooms"))
                .await
                .is_none()
        );
        assert!(
            dispatcher
                .try_handle(&connector, &message(OTHER, "!help"))
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_stub_commands_reply_not_implemented() {
        let connector = admin_connector();
        let dispatcher = CommandDispatcher::new(CommandRegistry::standard());

        let rooms = dispatcher
            .try_handle(&connector, &message(ADMIN, "!rooms"))
            .await
            .unwrap();
        assert_eq!(rooms.message, "Not Implemented yet");
        assert!(!rooms.success);

        for body in ["!stop", "!start"] {
            let result = dispatcher
                .try_handle(&connector, &message(ADMIN, body))
                .await
                .unwrap();
            assert_eq!(result.message, "Not Implemented yet.");
        }
    }

    #[tokio::test]
    async fn test_non_command_does_not_resolve() {
        let connector = admin_connector();
        let dispatcher = CommandDispatcher::new(CommandRegistry::standard());

        assert!(
            dispatcher
                .try_handle(&connector, &message(ADMIN, "hello there"))
                .await
                .is_none()
        );
        assert_eq!(connector.resolve_count(), 0);
        assert!(!dispatcher.admin_room().is_settled());
    }

    #[tokio::test]
    async fn test_failed_resolution_disables_commands_everywhere() {
        let connector = MockConnector::new().with_room(ADMIN_ROOM_KEY, "#admin:example.org");
        let dispatcher = CommandDispatcher::new(CommandRegistry::standard());

        for room in [ADMIN, OTHER] {
            for body in ["!help", "!rooms", "!stop", "!start"] {
                assert!(
                    dispatcher
                        .try_handle(&connector, &message(room, body))
                        .await
                        .is_none()
                );
            }
        }
        assert!(dispatcher.admin_room().cached().is_none());
        assert_eq!(connector.resolve_count(), 1);
    }
}
