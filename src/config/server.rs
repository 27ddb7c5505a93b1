//! Server behavior configuration.

use super::defaults::{default_max_message_size, default_queue_capacity};
use serde::{Deserialize, Serialize};

/// Connection-handling settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerSection {
    /// Maximum inbound WebSocket frame size in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,
    /// Outbound frame queue depth per connection. A slow consumer whose
    /// queue fills has frames dropped rather than stalling the sender.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            max_message_size: default_max_message_size(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Broadcast scheduler settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BroadcastSection {
    /// Fixed cadence, in milliseconds, at which buffered state is packed and
    /// flushed to world subscribers.
    #[serde(default = "super::defaults::default_broadcast_period_ms")]
    pub period_ms: u64,
}

impl Default for BroadcastSection {
    fn default() -> Self {
        Self {
            period_ms: super::defaults::default_broadcast_period_ms(),
        }
    }
}
