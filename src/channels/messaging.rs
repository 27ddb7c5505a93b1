use bytes::Bytes;
use std::sync::Arc;

use super::connection::Frame;
use super::error::{ChannelError, UpdateError};
use super::ChannelManager;
use crate::codec::{EntityState, ENTITY_TYPE_USER};
use crate::protocol::{ChatMessage, ClientId, UserId, WorldId};

impl ChannelManager {
    /// Format a world-chat line from the sender's cached identity and fan it
    /// out to every chat subscriber of the world, sender included.
    pub async fn send_world_chat_message(
        &self,
        sender: ClientId,
        world: WorldId,
        text: &str,
    ) -> Result<(), ChannelError> {
        let channels = self
            .worlds
            .get(&world)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(ChannelError::WorldNotFound(world))?;
        let identity = self
            .directory
            .lookup(sender)
            .await
            .ok_or(ChannelError::SenderNotCached(sender))?;

        let message = ChatMessage::new(true, sender, identity.name, identity.role, text);
        let Some(frame) = render_chat_frame(&message) else {
            return Ok(());
        };

        for conn in channels.chat.iter() {
            conn.value().send(frame.clone());
        }
        tracing::debug!(
            world,
            sender,
            recipients = channels.chat.len(),
            "World chat message delivered"
        );
        Ok(())
    }

    /// Deliver a private chat line. The sender must be online (present in
    /// the presence table). An offline recipient produces a
    /// `delivered: false` echo to the sender only, a fire-and-forget
    /// non-delivery notification.
    pub async fn send_user_chat_message(
        &self,
        sender: UserId,
        recipient: UserId,
        text: &str,
    ) -> Result<(), ChannelError> {
        let sender_conn = self
            .presence
            .get(&sender)
            .map(|entry| entry.value().clone())
            .ok_or(ChannelError::SenderOffline(sender))?;
        let identity = self
            .directory
            .lookup(sender)
            .await
            .ok_or(ChannelError::SenderNotCached(sender))?;

        let recipient_conn = self.presence.get(&recipient).map(|e| e.value().clone());
        let delivered = recipient_conn.is_some();
        let message = ChatMessage::new(delivered, sender, identity.name, identity.role, text);
        let Some(frame) = render_chat_frame(&message) else {
            return Ok(());
        };

        if let Some(recipient_conn) = recipient_conn {
            recipient_conn.send(frame.clone());
        }
        sender_conn.send(frame);
        tracing::debug!(sender, recipient, delivered, "User chat message routed");
        Ok(())
    }

    /// Validate a raw entity-state payload against the sender's identity and
    /// store it into the world's coalescing buffer, overwriting any pending
    /// record for that client.
    pub async fn update_world_state(
        &self,
        sender: ClientId,
        world: WorldId,
        payload: &[u8],
    ) -> Result<(), UpdateError> {
        if !self.worlds.contains_key(&world) {
            return Err(ChannelError::WorldNotFound(world).into());
        }
        self.directory
            .lookup(sender)
            .await
            .ok_or(ChannelError::SenderNotCached(sender))?;

        let state = EntityState::forward(ENTITY_TYPE_USER, sender, payload)?;
        let buffer = Arc::clone(&self.buffers.entry(world).or_default());
        buffer.store(sender, state);
        Ok(())
    }

    /// Relay pre-formatted world-content change bytes to every update
    /// subscriber of the world. A no-op, not an error, when the world has no
    /// update channels yet.
    pub fn broadcast_world_update(&self, world: WorldId, payload: Bytes) {
        let Some(channels) = self.worlds.get(&world) else {
            return;
        };
        for conn in channels.update.iter() {
            conn.value().send(Frame::Binary(payload.clone()));
        }
        tracing::debug!(
            world,
            recipients = channels.update.len(),
            "World update broadcast"
        );
    }
}

/// Serialize a chat message to its shared text frame. Serialization of this
/// struct cannot realistically fail; a failure is logged and the message
/// dropped rather than crashing the channel.
fn render_chat_frame(message: &ChatMessage) -> Option<Frame> {
    match serde_json::to_string(message) {
        Ok(json) => Some(Frame::Text(json.into())),
        Err(err) => {
            tracing::error!(error = %err, "Failed to serialize chat message");
            None
        }
    }
}
