use serde::{Deserialize, Serialize};

use super::types::UserId;

/// A chat line as delivered to channel subscribers. Sent as a JSON text
/// frame; never persisted.
///
/// `delivered` is `false` only on the non-delivery echo a private-chat sender
/// receives when the recipient is offline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub delivered: bool,
    /// Sender's numeric user id.
    pub id: UserId,
    pub name: String,
    pub role: String,
    pub msg: String,
}

impl ChatMessage {
    #[must_use]
    pub fn new(
        delivered: bool,
        id: UserId,
        name: impl Into<String>,
        role: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self {
            delivered,
            id,
            name: name.into(),
            role: role.into(),
            msg: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_stable_field_names() {
        let message = ChatMessage::new(true, 1, "Bob", "admin", "hi");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(
            json,
            r#"{"delivered":true,"id":1,"name":"Bob","role":"admin","msg":"hi"}"#
        );
    }

    #[test]
    fn round_trips_through_json() {
        let message = ChatMessage::new(false, 42, "Alice", "citizen", "are you there?");
        let json = serde_json::to_string(&message).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
    }
}
