//! Wire-level message and identifier definitions shared by the channel
//! manager and the upgrade router.

pub mod chat;
pub mod types;

pub use chat::ChatMessage;
pub use types::{ChannelKind, ChannelScope, ClientId, UserId, WorldId};
