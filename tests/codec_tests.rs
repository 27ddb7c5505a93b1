//! Property-based coverage of the entity-state wire format.

use proptest::prelude::*;
use world_live_server::codec::{
    pack, unpack, CodecError, EntityState, ENTITY_STATE_LEN, ENTITY_TYPE_USER, PACK_HEADER_LEN,
};

/// Rewrite an encoded record as the opposite byte order would have produced
/// it: every field span reversed independently, the buffer never as a whole.
fn as_foreign_endian(bytes: &[u8; ENTITY_STATE_LEN]) -> [u8; ENTITY_STATE_LEN] {
    let mut out = *bytes;
    let spans: &[(usize, usize)] = &[
        (0x00, 4),
        (0x04, 2),
        (0x06, 2),
        (0x08, 4),
        (0x0c, 4),
        (0x10, 4),
        (0x14, 4),
        (0x18, 4),
        (0x1c, 4),
        (0x20, 4),
    ];
    for &(at, len) in spans {
        out[at..at + len].reverse();
    }
    for i in 0..8 {
        let at = 0x24 + i * 2;
        out[at..at + 2].reverse();
    }
    out
}

prop_compose! {
    fn arb_state()(
        entity_type in any::<u16>(),
        update_type in any::<u16>(),
        entity_id in any::<u32>(),
        x in -1.0e6_f32..1.0e6,
        y in -1.0e6_f32..1.0e6,
        z in -1.0e6_f32..1.0e6,
        yaw in -10.0_f32..10.0,
        pitch in -10.0_f32..10.0,
        roll in -10.0_f32..10.0,
        data in any::<[u16; 8]>(),
    ) -> EntityState {
        EntityState { entity_type, update_type, entity_id, x, y, z, yaw, pitch, roll, data }
    }
}

proptest! {
    #[test]
    fn validate_round_trips_any_record(state in arb_state()) {
        let decoded = EntityState::validate(&state.to_bytes()).unwrap();
        prop_assert_eq!(decoded, state);
    }

    #[test]
    fn foreign_endian_records_decode_identically(state in arb_state()) {
        let foreign = as_foreign_endian(&state.to_bytes());
        let decoded = EntityState::validate(&foreign).unwrap();
        prop_assert_eq!(decoded, state);
    }

    #[test]
    fn pack_round_trips_any_batch(states in prop::collection::vec(arb_state(), 0..12)) {
        let bytes = pack(&states);
        prop_assert_eq!(bytes.len(), PACK_HEADER_LEN + states.len() * ENTITY_STATE_LEN);
        let decoded = unpack(&bytes).unwrap();
        prop_assert_eq!(decoded, states);
    }

    #[test]
    fn forward_accepts_only_the_asserted_identity(
        state in arb_state(),
        asserted_id in any::<u32>(),
    ) {
        let result = EntityState::forward(ENTITY_TYPE_USER, asserted_id, &state.to_bytes());
        if state.entity_type == ENTITY_TYPE_USER && state.entity_id == asserted_id {
            prop_assert!(result.is_ok());
        } else {
            prop_assert!(
                matches!(result, Err(CodecError::IdentityMismatch { .. })),
                "expected CodecError::IdentityMismatch, got {:?}",
                result
            );
        }
    }
}
