use thiserror::Error;

/// Codec failures. All variants are raised before any state mutation: a
/// corrupt or spoofed record is rejected wholesale, never partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("entity state payload must be {expected} bytes, got {actual}")]
    MalformedPayload { expected: usize, actual: usize },

    #[error("unrecognized endianness cue {cue:#010x}")]
    UnknownEndianness { cue: u32 },

    #[error("pack of {count} records requires {expected} bytes, got {actual}")]
    TruncatedPack {
        count: u32,
        expected: usize,
        actual: usize,
    },

    #[error(
        "entity identity mismatch: payload declares type {found_type}, id {found_id}; \
         sender is type {expected_type}, id {expected_id}"
    )]
    IdentityMismatch {
        expected_type: u16,
        expected_id: u32,
        found_type: u16,
        found_id: u32,
    },
}
