//! Conversion of `/sync` responses into bot events.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{BotEvent, InviteEvent, MessageEvent, RoomId};

/// Subset of the `/sync` response body the bot cares about.
#[derive(Debug, Deserialize)]
pub struct SyncResponse {
    pub next_batch: String,

    #[serde(default)]
    pub rooms: SyncRooms,
}

#[derive(Debug, Default, Deserialize)]
pub struct SyncRooms {
    #[serde(default)]
    pub invite: BTreeMap<String, InvitedRoom>,

    #[serde(default)]
    pub join: BTreeMap<String, JoinedRoom>,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvitedRoom {
    #[serde(default)]
    pub invite_state: EventList,
}

#[derive(Debug, Default, Deserialize)]
pub struct JoinedRoom {
    #[serde(default)]
    pub timeline: EventList,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventList {
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

/// A client event with untyped content.
#[derive(Debug, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub sender: Option<String>,

    #[serde(default)]
    pub state_key: Option<String>,

    #[serde(default)]
    pub event_id: Option<String>,

    #[serde(default)]
    pub content: serde_json::Value,
}

impl RawEvent {
    fn is_invite_for(&self, user_id: &str) -> bool {
        self.kind == "m.room.member"
            && self.state_key.as_deref() == Some(user_id)
            && self.content.get("membership").and_then(|m| m.as_str()) == Some("invite")
    }

    fn is_join_of(&self, user_id: &str) -> bool {
        self.kind == "m.room.member"
            && self.state_key.as_deref() == Some(user_id)
            && self.content.get("membership").and_then(|m| m.as_str()) == Some("join")
    }

    /// Body of a text message. Notices are skipped so bots cannot talk to
    /// each other in a loop.
    fn message_body(&self) -> Option<&str> {
        if self.kind != "m.room.message" {
            return None;
        }
        if self.content.get("msgtype").and_then(|m| m.as_str()) == Some("m.notice") {
            return None;
        }
        self.content.get("body").and_then(|b| b.as_str())
    }
}

/// A decoded sync batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncBatch {
    /// Token to pass as `since` on the next sync.
    pub next_batch: String,

    pub events: Vec<BotEvent>,
}

/// Extracts invites and timeline messages from a sync response.
///
/// Every invited room yields exactly one invite. Timeline messages are only
/// collected when `include_timeline` is set, so the initial sync does not
/// replay old commands. In a timeline that contains the bot's own join,
/// only messages after that join are collected.
pub fn collect_events(
    response: SyncResponse,
    own_user_id: &str,
    include_timeline: bool,
) -> SyncBatch {
    let mut events = Vec::new();

    for (room_id, room) in response.rooms.invite {
        let sender = room
            .invite_state
            .events
            .iter()
            .find(|e| e.is_invite_for(own_user_id))
            .and_then(|e| e.sender.clone());

        events.push(BotEvent::Invite(InviteEvent {
            room_id: RoomId::new(room_id),
            sender,
        }));
    }

    if include_timeline {
        for (room_id, room) in response.rooms.join {
            let timeline = &room.timeline.events;
            let start = timeline
                .iter()
                .rposition(|e| e.is_join_of(own_user_id))
                .map_or(0, |i| i + 1);

            for raw in &timeline[start..] {
                let (Some(body), Some(sender)) = (raw.message_body(), raw.sender.as_ref()) else {
                    continue;
                };

                events.push(BotEvent::Message(MessageEvent {
                    room_id: RoomId::new(room_id.clone()),
                    sender: sender.clone(),
                    body: body.to_owned(),
                    event_id: raw.event_id.clone(),
                }));
            }
        }
    }

    SyncBatch {
        next_batch: response.next_batch,
        events,
    }
}
