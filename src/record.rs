//! Record capability contract
//!
//! Any fixed-size value type can be stored in a heap file by implementing
//! [`Record`]. The engine never inspects record contents beyond this trait:
//! it packs encoded records into blocks and locates them again by logical key.

use crate::Result;

/// A fixed-size, serializable, key-addressable record.
///
/// ## Contract
/// - `encode` returns exactly [`SIZE`](Record::SIZE) bytes and `decode` is its
///   lossless inverse.
/// - `decode` of `SIZE` zero bytes must succeed. The resulting "zero record"
///   must not match any key that a real record can carry: block decoding
///   materializes a record in every slot, including zero-filled empty ones,
///   and scans distinguish live records from padding only via `matches`.
/// - `matches` compares the logical key, not full field equality.
pub trait Record: Clone {
    /// Lookup key type, e.g. `str` for records keyed by a string id.
    type Key: ?Sized;

    /// Encoded size in bytes, constant for the type.
    const SIZE: usize;

    fn encode(&self) -> Vec<u8>;

    fn decode(bytes: &[u8]) -> Result<Self>;

    fn matches(&self, key: &Self::Key) -> bool;
}
