use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identifier of a world, assigned by the platform's world store.
pub type WorldId = u32;

/// Numeric identifier of a user account.
pub type UserId = u32;

/// Identifier of a client within a world channel. For avatar traffic this is
/// the user id of the connected account.
pub type ClientId = u32;

/// The four channel families a socket upgrade can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    WorldChat,
    WorldState,
    WorldUpdate,
    UserChat,
}

impl ChannelKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WorldChat => "world_chat",
            Self::WorldState => "world_state",
            Self::WorldUpdate => "world_update",
            Self::UserChat => "user_chat",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (kind, id) pair identifying one concrete channel. The id is a world id
/// for the world families and a user id for user chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelScope {
    pub kind: ChannelKind,
    pub id: u32,
}

impl ChannelScope {
    #[must_use]
    pub const fn new(kind: ChannelKind, id: u32) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for ChannelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_kind_display() {
        assert_eq!(ChannelKind::WorldChat.to_string(), "world_chat");
        assert_eq!(ChannelKind::UserChat.to_string(), "user_chat");
    }

    #[test]
    fn channel_scope_display() {
        let scope = ChannelScope::new(ChannelKind::WorldState, 7);
        assert_eq!(scope.to_string(), "world_state/7");
    }
}
