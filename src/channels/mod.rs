//! Channel registries, coalescing state buffers, and the broadcast
//! scheduler, orchestrated by [`ChannelManager`].
//!
//! All per-world and per-user tables are owned by the manager and mutated
//! only through its operations; tests can instantiate independent managers
//! in parallel.

use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

mod connection;
mod error;
mod messaging;
mod registry;
mod scheduler;
mod state_buffer;

pub use connection::{Connection, Frame};
pub use error::{ChannelError, SchedulerError, UpdateError};

use crate::directory::UserDirectory;
use crate::protocol::{ChannelKind, ChannelScope, ClientId, UserId, WorldId};
use registry::{occupy_slot, vacate_slot, vacate_slot_if_serial, WorldChannels};
use state_buffer::WorldStateBuffer;

/// Default broadcast cadence.
pub const DEFAULT_BROADCAST_PERIOD: Duration = Duration::from_millis(50);

/// Owner of the live channel tables: per-world chat/state/update maps, the
/// user presence table, and the per-world state buffers.
pub struct ChannelManager {
    worlds: DashMap<WorldId, Arc<WorldChannels>>,
    presence: DashMap<UserId, Connection>,
    buffers: DashMap<WorldId, Arc<WorldStateBuffer>>,
    directory: Arc<dyn UserDirectory>,
    broadcast_period: Duration,
    broadcast_task: Mutex<Option<CancellationToken>>,
}

impl ChannelManager {
    #[must_use]
    pub fn new(directory: Arc<dyn UserDirectory>, broadcast_period: Duration) -> Arc<Self> {
        Arc::new(Self {
            worlds: DashMap::new(),
            presence: DashMap::new(),
            buffers: DashMap::new(),
            directory,
            broadcast_period,
            broadcast_task: Mutex::new(None),
        })
    }

    /// Register a world-chat connection, closing and replacing any existing
    /// connection for the same client. Lazily creates the world's channel
    /// set.
    pub fn add_world_chat_connection(&self, world: WorldId, conn: Connection, client: ClientId) {
        let channels = self.world_channels(world);
        occupy_slot(&channels.chat, client, conn);
        tracing::debug!(world, client, "World chat connection registered");
    }

    pub fn remove_world_chat_connection(&self, world: WorldId, client: ClientId) {
        if let Some(channels) = self.worlds.get(&world) {
            vacate_slot(&channels.chat, client);
        }
    }

    /// Register a world-state connection; additionally ensures the world's
    /// state buffer exists.
    pub fn add_world_state_connection(&self, world: WorldId, conn: Connection, client: ClientId) {
        let channels = self.world_channels(world);
        self.buffers.entry(world).or_default();
        occupy_slot(&channels.state, client, conn);
        tracing::debug!(world, client, "World state connection registered");
    }

    /// Close and delete the state slot; also forgets the client's pending
    /// buffered record.
    pub fn remove_world_state_connection(&self, world: WorldId, client: ClientId) {
        if let Some(channels) = self.worlds.get(&world) {
            vacate_slot(&channels.state, client);
        }
        if let Some(buffer) = self.buffers.get(&world) {
            buffer.forget(client);
        }
    }

    pub fn add_world_update_connection(&self, world: WorldId, conn: Connection, client: ClientId) {
        let channels = self.world_channels(world);
        occupy_slot(&channels.update, client, conn);
        tracing::debug!(world, client, "World update connection registered");
    }

    pub fn remove_world_update_connection(&self, world: WorldId, client: ClientId) {
        if let Some(channels) = self.worlds.get(&world) {
            vacate_slot(&channels.update, client);
        }
    }

    /// Register a user's presence connection. A user is considered online
    /// iff present in this table.
    pub fn add_user_chat_connection(&self, conn: Connection, user: UserId) {
        occupy_slot(&self.presence, user, conn);
        tracing::debug!(user, "User chat presence registered");
    }

    pub fn remove_user_chat_connection(&self, user: UserId) {
        vacate_slot(&self.presence, user);
    }

    /// Socket-teardown cleanup: vacate the slot only while it still holds
    /// the connection instance identified by `serial`, so a handler that was
    /// already replaced does not evict its successor. The state variant also
    /// forgets the buffered record, but only when the slot was actually
    /// vacated.
    pub(crate) fn detach(&self, scope: ChannelScope, client: ClientId, serial: u64) {
        match scope.kind {
            ChannelKind::WorldChat => {
                if let Some(channels) = self.worlds.get(&scope.id) {
                    vacate_slot_if_serial(&channels.chat, client, serial);
                }
            }
            ChannelKind::WorldState => {
                let vacated = match self.worlds.get(&scope.id) {
                    Some(channels) => vacate_slot_if_serial(&channels.state, client, serial),
                    None => false,
                };
                if vacated {
                    if let Some(buffer) = self.buffers.get(&scope.id) {
                        buffer.forget(client);
                    }
                }
            }
            ChannelKind::WorldUpdate => {
                if let Some(channels) = self.worlds.get(&scope.id) {
                    vacate_slot_if_serial(&channels.update, client, serial);
                }
            }
            ChannelKind::UserChat => {
                vacate_slot_if_serial(&self.presence, client, serial);
            }
        }
    }

    /// Whether a user currently has a registered presence connection.
    #[must_use]
    pub fn is_user_online(&self, user: UserId) -> bool {
        self.presence.contains_key(&user)
    }

    /// Whether a client has a pending buffered record for a world.
    #[must_use]
    pub fn has_buffered_state(&self, world: WorldId, client: ClientId) -> bool {
        self.buffers
            .get(&world)
            .is_some_and(|buffer| buffer.contains(client))
    }

    /// Number of pending records in a world's state buffer.
    #[must_use]
    pub fn buffered_state_len(&self, world: WorldId) -> usize {
        self.buffers.get(&world).map_or(0, |buffer| buffer.len())
    }

    /// Number of registered connections for a channel family in a world.
    #[must_use]
    pub fn connection_count(&self, world: WorldId, kind: ChannelKind) -> usize {
        match kind {
            ChannelKind::UserChat => self.presence.len(),
            _ => self.worlds.get(&world).map_or(0, |channels| match kind {
                ChannelKind::WorldChat => channels.chat.len(),
                ChannelKind::WorldState => channels.state.len(),
                ChannelKind::WorldUpdate => channels.update.len(),
                ChannelKind::UserChat => unreachable!(),
            }),
        }
    }

    fn world_channels(&self, world: WorldId) -> Arc<WorldChannels> {
        Arc::clone(&self.worlds.entry(world).or_default())
    }

    fn lock_broadcast_task(
        &self,
    ) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.broadcast_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ChannelManager {
    fn drop(&mut self) {
        if let Some(cancel) = self.lock_broadcast_task().take() {
            cancel.cancel();
        }
    }
}
