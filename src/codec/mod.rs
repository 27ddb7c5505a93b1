//! Binary codec for entity-state records and their batched wire form.
//!
//! Every record begins with a fixed 4-byte endianness cue. A reader that
//! finds the cue byte-swapped reverses every declared field independently,
//! so a record stays decodable even when extracted from a pack produced on a
//! machine of the opposite byte order.

pub mod entity_state;
pub mod error;
pub mod pack;

pub use entity_state::{EntityState, ENDIAN_CUE, ENTITY_STATE_LEN, ENTITY_TYPE_USER};
pub use error::CodecError;
pub use pack::{pack, unpack, PACK_HEADER_LEN};
