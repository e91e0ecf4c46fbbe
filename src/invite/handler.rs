//! Invite handler implementation.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::matrix::{Connector, InviteEvent};

/// Whether invites are accepted. Held in memory for the process lifetime.
#[derive(Debug)]
pub struct AutoInviteToggle(AtomicBool);

impl AutoInviteToggle {
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self(AtomicBool::new(enabled))
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for AutoInviteToggle {
    fn default() -> Self {
        Self::new(true)
    }
}

/// What the handler did with an invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InviteOutcome {
    /// A join was issued.
    Joined,
    /// Auto-accept is off; nothing was done.
    Rejected,
}

/// Accepts or ignores room invites according to the toggle.
#[derive(Debug, Default)]
pub struct InviteHandler {
    toggle: AutoInviteToggle,
}

impl InviteHandler {
    #[must_use]
    pub const fn new(toggle: AutoInviteToggle) -> Self {
        Self { toggle }
    }

    #[must_use]
    pub const fn toggle(&self) -> &AutoInviteToggle {
        &self.toggle
    }

    /// Handles one invite.
    ///
    /// The join result does not influence the outcome and is never retried.
    pub async fn on_invite<C: Connector + ?Sized>(
        &self,
        connector: &C,
        invite: &InviteEvent,
    ) -> InviteOutcome {
        let from = invite.sender.as_deref().unwrap_or("unknown");

        if !self.toggle.is_enabled() {
            info!("Rejected room invite to {} from {}", invite.room_id, from);
            return InviteOutcome::Rejected;
        }

        info!("Accepted room invite to {} from {}", invite.room_id, from);
        if let Err(e) = connector.join_room(&invite.room_id).await {
            warn!("Joining {} failed: {}", invite.room_id, e);
        }
        InviteOutcome::Joined
    }
}
