use bytes::{BufMut, Bytes, BytesMut};

use super::entity_state::{EntityState, ENDIAN_CUE, ENTITY_STATE_LEN};
use super::error::CodecError;

/// Cue plus record count.
pub const PACK_HEADER_LEN: usize = 8;

/// Batch already-validated records into one wire pack: 4-byte local cue,
/// 4-byte count, then each record's native bytes in caller iteration order.
pub fn pack<'a, I>(records: I) -> Bytes
where
    I: IntoIterator<Item = &'a EntityState>,
{
    let records = records.into_iter();
    let (lower, _) = records.size_hint();
    let mut buf = BytesMut::with_capacity(PACK_HEADER_LEN + lower * ENTITY_STATE_LEN);
    buf.put_slice(&ENDIAN_CUE.to_ne_bytes());
    // Count is back-patched once the iterator is drained.
    buf.put_slice(&0u32.to_ne_bytes());

    let mut count: u32 = 0;
    for record in records {
        buf.put_slice(&record.to_bytes());
        count += 1;
    }
    buf[4..8].copy_from_slice(&count.to_ne_bytes());
    buf.freeze()
}

/// Split a pack into its records, validating each one independently. The
/// count field is endian-corrected from the pack's own cue; the records carry
/// their own cues and are corrected individually.
pub fn unpack(bytes: &[u8]) -> Result<Vec<EntityState>, CodecError> {
    if bytes.len() < PACK_HEADER_LEN {
        return Err(CodecError::TruncatedPack {
            count: 0,
            expected: PACK_HEADER_LEN,
            actual: bytes.len(),
        });
    }

    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[0..4]);
    let cue = u32::from_ne_bytes(raw);
    raw.copy_from_slice(&bytes[4..8]);
    let mut count = u32::from_ne_bytes(raw);
    if cue.swap_bytes() == ENDIAN_CUE {
        count = count.swap_bytes();
    } else if cue != ENDIAN_CUE {
        return Err(CodecError::UnknownEndianness { cue });
    }

    // The count is attacker-supplied; the length it implies can overflow
    // usize on 32-bit targets.
    let expected = (count as usize)
        .checked_mul(ENTITY_STATE_LEN)
        .and_then(|records| records.checked_add(PACK_HEADER_LEN));
    if expected != Some(bytes.len()) {
        return Err(CodecError::TruncatedPack {
            count,
            expected: expected.unwrap_or(usize::MAX),
            actual: bytes.len(),
        });
    }

    let mut records = Vec::with_capacity(count as usize);
    for chunk in bytes[PACK_HEADER_LEN..].chunks_exact(ENTITY_STATE_LEN) {
        records.push(EntityState::validate(chunk)?);
    }
    Ok(records)
}
