//! Event runner.
//!
//! Consumes events one at a time, in arrival order:
//! 1. Invites go to the invite handler, which may join the room
//! 2. Messages from other users go to the command dispatcher
//! 3. A command reply is posted back to the room the command came from
//!
//! Failures while joining or replying are logged and dropped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::commands::CommandDispatcher;
use crate::invite::InviteHandler;
use crate::matrix::{BotEvent, Connector, MessageEvent};

/// Messages that can be sent to the runner.
#[derive(Debug, Clone)]
pub enum BotMessage {
    /// An event delivered by the sync loop.
    Event(BotEvent),
    /// Stop the runner.
    Shutdown,
}

/// Sequential event dispatcher.
pub struct EventRunner<C: Connector + ?Sized> {
    connector: Arc<C>,

    invites: InviteHandler,

    commands: CommandDispatcher,
}

impl<C: Connector + ?Sized> EventRunner<C> {
    /// Creates a new event runner.
    #[must_use]
    pub const fn new(
        connector: Arc<C>,
        invites: InviteHandler,
        commands: CommandDispatcher,
    ) -> Self {
        Self {
            connector,
            invites,
            commands,
        }
    }

    /// Runs the event loop until shutdown or until every sender is gone.
    pub async fn run(&self, mut rx: mpsc::Receiver<BotMessage>) {
        info!("Event runner started");

        while let Some(msg) = rx.recv().await {
            match msg {
                BotMessage::Event(event) => self.handle_event(event).await,
                BotMessage::Shutdown => break,
            }
        }

        info!("Event runner shutting down");
    }

    /// Handles a single event.
    pub async fn handle_event(&self, event: BotEvent) {
        match event {
            BotEvent::Invite(invite) => {
                self.invites.on_invite(self.connector.as_ref(), &invite).await;
            }
            BotEvent::Message(message) => self.handle_message(&message).await,
        }
    }

    async fn handle_message(&self, message: &MessageEvent) {
        if message.sender == self.connector.own_user_id() {
            return;
        }

        let Some(result) = self
            .commands
            .try_handle(self.connector.as_ref(), message)
            .await
        else {
            return;
        };

        debug!("Replying in {}", message.room_id);
        if let Err(e) = self
            .connector
            .send_text(&message.room_id, &result.message)
            .await
        {
            warn!("Failed to reply in {}: {}", message.room_id, e);
        }
    }

    #[must_use]
    pub const fn invites(&self) -> &InviteHandler {
        &self.invites
    }

    #[must_use]
    pub const fn commands(&self) -> &CommandDispatcher {
        &self.commands
    }
}

impl<C: Connector + ?Sized> std::fmt::Debug for EventRunner<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRunner")
            .field("invites", &self.invites)
            .field("commands", &self.commands)
            .finish_non_exhaustive()
    }
}
