use dashmap::DashMap;
use smallvec::SmallVec;

use crate::codec::EntityState;
use crate::protocol::ClientId;

/// Typical number of avatars moving in one world at once; snapshots of this
/// size stay on the stack.
pub(super) const TYPICAL_WORLD_POPULATION: usize = 16;

pub(super) type StateSnapshot = SmallVec<[EntityState; TYPICAL_WORLD_POPULATION]>;

/// Latest validated entity-state record per client, for one world. A
/// coalescing buffer: entries are overwritten, never queued, so the pending
/// payload per tick is bounded by the number of connected state clients.
#[derive(Default)]
pub(super) struct WorldStateBuffer {
    records: DashMap<ClientId, EntityState>,
}

impl WorldStateBuffer {
    pub fn store(&self, client: ClientId, state: EntityState) {
        self.records.insert(client, state);
    }

    pub fn forget(&self, client: ClientId) {
        self.records.remove(&client);
    }

    pub fn contains(&self, client: ClientId) -> bool {
        self.records.contains_key(&client)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Copy out the current records in the buffer's iteration order. Stable
    /// within a tick, otherwise unspecified.
    pub fn snapshot(&self) -> StateSnapshot {
        self.records.iter().map(|entry| *entry.value()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ENTITY_TYPE_USER;

    fn record(id: u32, x: f32) -> EntityState {
        EntityState {
            entity_type: ENTITY_TYPE_USER,
            update_type: 0,
            entity_id: id,
            x,
            y: 0.0,
            z: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            data: [0; 8],
        }
    }

    #[test]
    fn store_coalesces_per_client() {
        let buffer = WorldStateBuffer::default();
        buffer.store(1, record(1, 1.0));
        buffer.store(1, record(1, 2.0));
        buffer.store(2, record(2, 9.0));

        assert_eq!(buffer.len(), 2);
        let snapshot = buffer.snapshot();
        let client_one = snapshot.iter().find(|r| r.entity_id == 1).unwrap();
        assert_eq!(client_one.x, 2.0);
    }

    #[test]
    fn forget_empties_naturally() {
        let buffer = WorldStateBuffer::default();
        buffer.store(1, record(1, 1.0));
        assert!(!buffer.is_empty());
        buffer.forget(1);
        assert!(buffer.is_empty());
        buffer.forget(1);
    }
}
