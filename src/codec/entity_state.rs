use super::error::CodecError;

/// Magic value written at the head of every record and pack. Reads as the
/// ASCII bytes `LIVE` on a little-endian machine.
pub const ENDIAN_CUE: u32 = 0x4556_494C;

/// Total encoded size of one record, cue included.
pub const ENTITY_STATE_LEN: usize = 52;

/// Entity-type code for a user avatar. State updates arriving over a state
/// channel must carry this type; other codes are reserved for server-driven
/// entities.
pub const ENTITY_TYPE_USER: u16 = 1;

/// One entity transform update. Immutable once constructed; positions are
/// meters, orientations radians. The eight `data` blocks carry
/// client-defined payload (animation state, gesture codes) and default to
/// zero.
///
/// Wire layout (offsets in bytes):
/// `0x00` cue, `0x04` entity type, `0x06` update type, `0x08` entity id,
/// `0x0c`/`0x10`/`0x14` x/y/z, `0x18`/`0x1c`/`0x20` yaw/pitch/roll,
/// `0x24..0x34` eight u16 data blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityState {
    pub entity_type: u16,
    pub update_type: u16,
    pub entity_id: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub data: [u16; 8],
}

impl EntityState {
    /// Encode into the fixed 52-byte wire form in native byte order.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; ENTITY_STATE_LEN] {
        let mut buf = [0u8; ENTITY_STATE_LEN];
        buf[0x00..0x04].copy_from_slice(&ENDIAN_CUE.to_ne_bytes());
        buf[0x04..0x06].copy_from_slice(&self.entity_type.to_ne_bytes());
        buf[0x06..0x08].copy_from_slice(&self.update_type.to_ne_bytes());
        buf[0x08..0x0c].copy_from_slice(&self.entity_id.to_ne_bytes());
        buf[0x0c..0x10].copy_from_slice(&self.x.to_ne_bytes());
        buf[0x10..0x14].copy_from_slice(&self.y.to_ne_bytes());
        buf[0x14..0x18].copy_from_slice(&self.z.to_ne_bytes());
        buf[0x18..0x1c].copy_from_slice(&self.yaw.to_ne_bytes());
        buf[0x1c..0x20].copy_from_slice(&self.pitch.to_ne_bytes());
        buf[0x20..0x24].copy_from_slice(&self.roll.to_ne_bytes());
        for (i, block) in self.data.iter().enumerate() {
            let at = 0x24 + i * 2;
            buf[at..at + 2].copy_from_slice(&block.to_ne_bytes());
        }
        buf
    }

    /// Decode a 52-byte payload, detecting and correcting byte order from the
    /// cue. A byte-swapped cue triggers a field-wise reversal: each declared
    /// field is byte-reversed independently, never the buffer as a whole.
    pub fn validate(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() != ENTITY_STATE_LEN {
            return Err(CodecError::MalformedPayload {
                expected: ENTITY_STATE_LEN,
                actual: bytes.len(),
            });
        }

        let cue = read_u32(bytes, 0x00);
        let swap = if cue == ENDIAN_CUE {
            false
        } else if cue.swap_bytes() == ENDIAN_CUE {
            true
        } else {
            return Err(CodecError::UnknownEndianness { cue });
        };

        let u16_at = |at: usize| {
            let v = read_u16(bytes, at);
            if swap {
                v.swap_bytes()
            } else {
                v
            }
        };
        let u32_at = |at: usize| {
            let v = read_u32(bytes, at);
            if swap {
                v.swap_bytes()
            } else {
                v
            }
        };
        let f32_at = |at: usize| f32::from_bits(u32_at(at));

        let mut data = [0u16; 8];
        for (i, block) in data.iter_mut().enumerate() {
            *block = u16_at(0x24 + i * 2);
        }

        Ok(Self {
            entity_type: u16_at(0x04),
            update_type: u16_at(0x06),
            entity_id: u32_at(0x08),
            x: f32_at(0x0c),
            y: f32_at(0x10),
            z: f32_at(0x14),
            yaw: f32_at(0x18),
            pitch: f32_at(0x1c),
            roll: f32_at(0x20),
            data,
        })
    }

    /// [`validate`](Self::validate), plus the anti-spoofing check applied
    /// before any update is admitted into a state buffer: the decoded entity
    /// type and id must match the asserted sender identity.
    pub fn forward(
        expected_type: u16,
        expected_id: u32,
        bytes: &[u8],
    ) -> Result<Self, CodecError> {
        let state = Self::validate(bytes)?;
        if state.entity_type != expected_type || state.entity_id != expected_id {
            return Err(CodecError::IdentityMismatch {
                expected_type,
                expected_id,
                found_type: state.entity_type,
                found_id: state.entity_id,
            });
        }
        Ok(state)
    }
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    let mut raw = [0u8; 2];
    raw.copy_from_slice(&bytes[at..at + 2]);
    u16::from_ne_bytes(raw)
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[at..at + 4]);
    u32::from_ne_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntityState {
        EntityState {
            entity_type: ENTITY_TYPE_USER,
            update_type: 3,
            entity_id: 42,
            x: 1.5,
            y: -20.25,
            z: 300.0,
            yaw: 0.5,
            pitch: -0.25,
            roll: 3.0,
            data: [7, 0, 0, 9, 0, 0, 0, 0xFFFF],
        }
    }

    /// Build the byte-reversed rendition a machine of the opposite byte
    /// order would have produced: every field reversed in place, cue
    /// included.
    fn byte_swapped(bytes: &[u8; ENTITY_STATE_LEN]) -> [u8; ENTITY_STATE_LEN] {
        let mut out = *bytes;
        let field_spans: &[(usize, usize)] = &[
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
            (0x24, 2),
            (0x26, 2),
            (0x28, 2),
            (0x2a, 2),
            (0x2c, 2),
            (0x2e, 2),
            (0x30, 2),
            (0x32, 2),
        ];
        for &(at, len) in field_spans {
            out[at..at + len].reverse();
        }
        out
    }

    #[test]
    fn encode_decode_round_trip() {
        let state = sample();
        let bytes = state.to_bytes();
        assert_eq!(bytes.len(), ENTITY_STATE_LEN);
        let decoded = EntityState::validate(&bytes).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn field_offsets_are_fixed() {
        let bytes = sample().to_bytes();
        assert_eq!(
            u32::from_ne_bytes(bytes[0..4].try_into().unwrap()),
            ENDIAN_CUE
        );
        assert_eq!(
            u16::from_ne_bytes(bytes[0x04..0x06].try_into().unwrap()),
            ENTITY_TYPE_USER
        );
        assert_eq!(
            u32::from_ne_bytes(bytes[0x08..0x0c].try_into().unwrap()),
            42
        );
        assert_eq!(
            u16::from_ne_bytes(bytes[0x32..0x34].try_into().unwrap()),
            0xFFFF
        );
    }

    #[test]
    fn unset_data_blocks_default_to_zero() {
        let state = EntityState {
            data: [0; 8],
            ..sample()
        };
        let bytes = state.to_bytes();
        assert!(bytes[0x24..0x34].iter().all(|&b| b == 0));
    }

    #[test]
    fn rejects_wrong_length() {
        let err = EntityState::validate(&[0u8; 51]).unwrap_err();
        assert_eq!(
            err,
            CodecError::MalformedPayload {
                expected: 52,
                actual: 51
            }
        );
        assert!(EntityState::validate(&[]).is_err());
        assert!(EntityState::validate(&[0u8; 53]).is_err());
    }

    #[test]
    fn rejects_unknown_cue() {
        let mut bytes = sample().to_bytes();
        bytes[0..4].copy_from_slice(&0xDEAD_BEEFu32.to_ne_bytes());
        assert!(matches!(
            EntityState::validate(&bytes),
            Err(CodecError::UnknownEndianness { .. })
        ));
    }

    #[test]
    fn opposite_endian_payload_decodes_to_identical_record() {
        let state = sample();
        let foreign = byte_swapped(&state.to_bytes());
        let decoded = EntityState::validate(&foreign).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn forward_accepts_matching_identity() {
        let state = sample();
        let decoded = EntityState::forward(ENTITY_TYPE_USER, 42, &state.to_bytes()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn forward_rejects_mismatched_id() {
        let state = EntityState {
            entity_id: 43,
            ..sample()
        };
        let err = EntityState::forward(ENTITY_TYPE_USER, 42, &state.to_bytes()).unwrap_err();
        assert_eq!(
            err,
            CodecError::IdentityMismatch {
                expected_type: ENTITY_TYPE_USER,
                expected_id: 42,
                found_type: ENTITY_TYPE_USER,
                found_id: 43,
            }
        );
    }

    #[test]
    fn forward_rejects_mismatched_type() {
        let state = EntityState {
            entity_type: 2,
            ..sample()
        };
        assert!(matches!(
            EntityState::forward(ENTITY_TYPE_USER, 42, &state.to_bytes()),
            Err(CodecError::IdentityMismatch { .. })
        ));
    }

    #[test]
    fn forward_checks_identity_after_endian_correction() {
        let state = sample();
        let foreign = byte_swapped(&state.to_bytes());
        assert!(EntityState::forward(ENTITY_TYPE_USER, 42, &foreign).is_ok());
        assert!(EntityState::forward(ENTITY_TYPE_USER, 41, &foreign).is_err());
    }
}
