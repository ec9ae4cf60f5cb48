//! # Matrix Transport
//!
//! Implements the `ChatProvider` trait for Matrix rooms using `matrix_sdk`, and
//! routes incoming room messages onto the matching channel worker's queue.
//! A configured channel id is a Matrix room id.

use anyhow::{Context, Result};
use async_trait::async_trait;
use matrix_sdk::Client;
use matrix_sdk::config::SyncSettings;
use matrix_sdk::room::Room;
use matrix_sdk::ruma::events::room::member::{MembershipState, StrippedRoomMemberEvent};
use matrix_sdk::ruma::events::room::message::{
    MessageType, RoomMessageEventContent, SyncRoomMessageEvent,
};
use matrix_sdk::ruma::{OwnedRoomId, RoomId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::config::{AppConfig, MatrixConfig};
use crate::domain::traits::ChatProvider;
use crate::domain::types::IncomingLine;

pub async fn connect(config: &MatrixConfig) -> Result<Client> {
    let client = Client::builder()
        .homeserver_url(&config.homeserver)
        .build()
        .await
        .context("Failed to build Matrix client")?;

    client
        .matrix_auth()
        .login_username(&config.username, &config.password)
        .send()
        .await
        .context("Matrix login failed")?;

    tracing::info!("Logged in as {}", config.username);
    Ok(client)
}

/// One Matrix room as a chat channel. The room is looked up on every send,
/// so the bot may join after the worker has started.
#[derive(Clone)]
pub struct MatrixChannel {
    client: Client,
    room_id: OwnedRoomId,
}

impl MatrixChannel {
    pub fn new(client: Client, room_id: &str) -> Result<Self> {
        let room_id = RoomId::parse(room_id).with_context(|| format!("invalid room id {room_id}"))?;
        Ok(Self { client, room_id })
    }
}

#[async_trait]
impl ChatProvider for MatrixChannel {
    fn room_id(&self) -> String {
        self.room_id.as_str().to_string()
    }

    async fn send_message(&self, content: &str) -> Result<(), String> {
        let Some(room) = self.client.get_room(&self.room_id) else {
            return Err(format!("not joined to {}", self.room_id));
        };
        tracing::info!("Bot sending message to {}: {}", self.room_id, content);
        room.send(RoomMessageEventContent::text_markdown(content))
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Room id -> channel queue.
pub struct MatrixRouter {
    routes: HashMap<String, mpsc::Sender<IncomingLine>>,
    config: Arc<AppConfig>,
    started: SystemTime,
}

impl MatrixRouter {
    pub fn new(routes: HashMap<String, mpsc::Sender<IncomingLine>>, config: Arc<AppConfig>) -> Self {
        Self {
            routes,
            config,
            started: SystemTime::now(),
        }
    }

    pub fn handles(&self, room_id: &str) -> bool {
        self.routes.contains_key(room_id)
    }

    /// Queues a line for the room's worker. Never waits: a full queue drops the line.
    pub fn forward(&self, room_id: &str, sender: &str, display_name: &str, body: &str) -> bool {
        let Some(queue) = self.routes.get(room_id) else {
            return false;
        };
        let line = IncomingLine {
            author: self.config.author(sender, display_name),
            body: body.to_string(),
        };
        match queue.try_send(line) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(room = room_id, "channel queue full, dropping message");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::error!(room = room_id, "channel worker is gone");
                false
            }
        }
    }

    async fn on_message(&self, ev: &SyncRoomMessageEvent, room: &Room) {
        let Some(original) = ev.as_original() else {
            return;
        };

        // skip history replayed by the initial sync
        let event_time = UNIX_EPOCH + Duration::from_millis(ev.origin_server_ts().get().into());
        if event_time < self.started {
            return;
        }

        if original.sender == room.own_user_id() {
            return;
        }

        if let MessageType::Text(text) = &original.content.msgtype {
            tracing::debug!("Received message from {}: {}", original.sender, text.body);
            let member = match room.get_member_no_sync(&original.sender).await {
                Ok(member) => member,
                Err(e) => {
                    tracing::debug!(sender = %original.sender, "member lookup failed: {}", e);
                    None
                }
            };
            let name = author_name(
                member.as_ref().and_then(|m| m.display_name()),
                original.sender.localpart(),
            );
            self.forward(room.room_id().as_str(), original.sender.as_str(), name, &text.body);
        }
    }
}

/// Room display name, falling back to the user id's localpart.
fn author_name<'a>(display_name: Option<&'a str>, localpart: &'a str) -> &'a str {
    match display_name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => localpart,
    }
}

/// Wires the router into the client and syncs until the connection ends.
pub async fn run(client: Client, router: MatrixRouter) -> Result<()> {
    let router = Arc::new(router);

    let message_router = router.clone();
    client.add_event_handler(move |ev: SyncRoomMessageEvent, room: Room| {
        let router = message_router.clone();
        async move { router.on_message(&ev, &room).await }
    });

    let invite_router = router.clone();
    client.add_event_handler(move |ev: StrippedRoomMemberEvent, room: Room| {
        let router = invite_router.clone();
        async move {
            if ev.content.membership != MembershipState::Invite {
                return;
            }
            if !router.handles(room.room_id().as_str()) {
                tracing::info!(room = %room.room_id(), "ignoring invite to unconfigured room");
                return;
            }
            if let Err(e) = room.join().await {
                tracing::error!(room = %room.room_id(), "Failed to join room: {}", e);
            }
        }
    });

    client
        .sync(SyncSettings::default())
        .await
        .context("Matrix sync stopped")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Arc<AppConfig> {
        Arc::new(serde_yaml::from_str("moderators: [\"@mod:example.org\"]").unwrap())
    }

    #[tokio::test]
    async fn test_forward_builds_author_and_routes() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut routes = HashMap::new();
        routes.insert("!room:example.org".to_string(), tx);
        let router = MatrixRouter::new(routes, config());

        assert!(router.forward("!room:example.org", "@mod:example.org", "mod", "r!help"));
        assert!(!router.forward("!other:example.org", "@mod:example.org", "mod", "r!help"));

        let line = rx.recv().await.unwrap();
        assert_eq!(line.body, "r!help");
        assert_eq!(line.author.name, "mod");
        assert!(line.author.is_moderator);
    }

    #[tokio::test]
    async fn test_full_queue_drops() {
        let (tx, _rx) = mpsc::channel(1);
        let mut routes = HashMap::new();
        routes.insert("!room:example.org".to_string(), tx);
        let router = MatrixRouter::new(routes, config());

        assert!(router.forward("!room:example.org", "@a:example.org", "a", "one"));
        assert!(!router.forward("!room:example.org", "@a:example.org", "a", "two"));
    }

    #[test]
    fn test_author_name_prefers_display_name() {
        assert_eq!(author_name(Some("Alice W."), "alice"), "Alice W.");
        assert_eq!(author_name(Some("  "), "alice"), "alice");
        assert_eq!(author_name(None, "alice"), "alice");
    }
}
