use dashmap::DashMap;

use super::connection::Connection;
use crate::protocol::ClientId;

/// The three independent per-world channel maps. Created lazily on the
/// first connection to a world and never explicitly destroyed; the maps
/// empty naturally as connections close.
#[derive(Default)]
pub(super) struct WorldChannels {
    pub chat: DashMap<ClientId, Connection>,
    pub state: DashMap<ClientId, Connection>,
    pub update: DashMap<ClientId, Connection>,
}

/// Install `conn` under `client`, closing a previous occupant first. At most
/// one connection per (scope, clientId) at any time.
pub(super) fn occupy_slot(slots: &DashMap<ClientId, Connection>, client: ClientId, conn: Connection) {
    if let Some(previous) = slots.insert(client, conn) {
        previous.close();
    }
}

/// Close and delete the slot. Idempotent on the absent case.
pub(super) fn vacate_slot(slots: &DashMap<ClientId, Connection>, client: ClientId) -> bool {
    match slots.remove(&client) {
        Some((_, conn)) => {
            conn.close();
            true
        }
        None => false,
    }
}

/// Delete the slot only while it still holds the connection instance
/// identified by `serial`. Used by socket teardown so a handler whose
/// connection was already replaced does not evict its successor.
pub(super) fn vacate_slot_if_serial(
    slots: &DashMap<ClientId, Connection>,
    client: ClientId,
    serial: u64,
) -> bool {
    slots
        .remove_if(&client, |_, conn| conn.serial() == serial)
        .map(|(_, conn)| {
            conn.close();
        })
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    fn conn() -> Connection {
        let (tx, rx) = mpsc::channel(1);
        std::mem::forget(rx);
        Connection::new(tx, CancellationToken::new())
    }

    #[test]
    fn occupy_replaces_and_closes_previous() {
        let slots = DashMap::new();
        let first = conn();
        let first_handle = first.clone();
        occupy_slot(&slots, 1, first);
        assert!(!first_handle.is_closed());

        occupy_slot(&slots, 1, conn());
        assert!(first_handle.is_closed());
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn vacate_closes_and_is_idempotent() {
        let slots = DashMap::new();
        let c = conn();
        let handle = c.clone();
        occupy_slot(&slots, 1, c);

        assert!(vacate_slot(&slots, 1));
        assert!(handle.is_closed());
        assert!(!vacate_slot(&slots, 1));
    }

    #[test]
    fn serial_guarded_vacate_spares_a_replacement() {
        let slots = DashMap::new();
        let first = conn();
        let stale_serial = first.serial();
        occupy_slot(&slots, 1, first);

        let second = conn();
        let second_serial = second.serial();
        occupy_slot(&slots, 1, second);

        // The stale teardown must not evict the replacement.
        assert!(!vacate_slot_if_serial(&slots, 1, stale_serial));
        assert!(slots.contains_key(&1));

        assert!(vacate_slot_if_serial(&slots, 1, second_serial));
        assert!(!slots.contains_key(&1));
    }
}
