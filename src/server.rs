//! Top-level server state shared across WebSocket handlers.

use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::channels::ChannelManager;

/// Runtime limits applied to every WebSocket connection.
#[derive(Debug, Clone)]
pub struct ServerLimits {
    /// Largest accepted inbound frame, in bytes. Oversized frames close
    /// the connection.
    pub max_message_size: usize,
    /// Capacity of the per-connection outbound queue. A full queue drops
    /// the frame rather than blocking the sender.
    pub queue_capacity: usize,
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            max_message_size: crate::config::defaults::default_max_message_size(),
            queue_capacity: crate::config::defaults::default_queue_capacity(),
        }
    }
}

/// Shared state handed to the Axum router: channel registries, the token
/// verifier, and per-connection limits.
pub struct LiveServer {
    channels: Arc<ChannelManager>,
    verifier: Arc<dyn TokenVerifier>,
    limits: ServerLimits,
}

impl LiveServer {
    pub fn new(
        channels: Arc<ChannelManager>,
        verifier: Arc<dyn TokenVerifier>,
        limits: ServerLimits,
    ) -> Arc<Self> {
        Arc::new(Self {
            channels,
            verifier,
            limits,
        })
    }

    pub fn channels(&self) -> &Arc<ChannelManager> {
        &self.channels
    }

    pub fn verifier(&self) -> &Arc<dyn TokenVerifier> {
        &self.verifier
    }

    pub fn limits(&self) -> &ServerLimits {
        &self.limits
    }

    /// Liveness probe for the health endpoint. The server is considered
    /// healthy while the broadcast scheduler is running.
    pub fn health_check(&self) -> bool {
        self.channels.broadcast_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::HmacTokenVerifier;
    use crate::channels::DEFAULT_BROADCAST_PERIOD;
    use crate::directory::InMemoryUserDirectory;

    fn test_server() -> Arc<LiveServer> {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let channels = ChannelManager::new(directory, DEFAULT_BROADCAST_PERIOD);
        let verifier = Arc::new(HmacTokenVerifier::new(b"test-secret-please-rotate"));
        LiveServer::new(channels, verifier, ServerLimits::default())
    }

    #[tokio::test]
    async fn health_tracks_scheduler_state() {
        let server = test_server();
        assert!(!server.health_check());

        server.channels().start_broadcast();
        assert!(server.health_check());

        server.channels().stop_broadcast().unwrap();
        assert!(!server.health_check());
    }
}
