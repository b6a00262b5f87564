//! Fixed-capacity record block
//!
//! A block is the unit of disk I/O: a packed prefix of records plus a 32-bit
//! valid-count, encoded to exactly `block_size` bytes.
//!
//! ## Block Format
//! ```text
//! [valid_count: u32 LE][block_factor × R::SIZE record slots][zero padding]
//! ```
//! Empty slots serialize as `R::SIZE` zero bytes. Decoding materializes a
//! record in EVERY slot, including the zero-filled ones past `valid_count`;
//! live records are distinguished from padding only by key matching, never by
//! slot occupancy. See the `Record` contract for the zero-record requirement
//! this relies on.

use crate::config::BLOCK_HEADER_BYTES;
use crate::record::Record;
use crate::{Result, StorageError};

/// In-memory image of one on-disk block.
///
/// Invariant: slots `[0, valid_count)` are occupied with no gaps; a freshly
/// constructed or freshly mutated block never has an empty slot before a full
/// one. (A freshly *decoded* block additionally carries decoded zero records
/// in its tail slots — see the module docs.)
pub struct Block<R: Record> {
    slots: Vec<Option<R>>,
    valid_count: usize,
    block_size: usize,
}

impl<R: Record> Block<R> {
    /// Create an empty block for the given block size.
    ///
    /// The capacity is `floor((block_size - 4) / R::SIZE)`; a block that
    /// cannot hold a single record is a configuration error.
    pub fn new(block_size: usize) -> Result<Self> {
        let block_factor = block_size.saturating_sub(BLOCK_HEADER_BYTES) / R::SIZE;
        if block_factor == 0 {
            return Err(StorageError::InvalidConfig(format!(
                "block size {} cannot hold a {}-byte record",
                block_size,
                R::SIZE
            )));
        }
        let mut slots = Vec::with_capacity(block_factor);
        slots.resize_with(block_factor, || None);
        Ok(Self {
            slots,
            valid_count: 0,
            block_size,
        })
    }

    pub fn block_factor(&self) -> usize {
        self.slots.len()
    }

    pub fn valid_count(&self) -> usize {
        self.valid_count
    }

    pub fn is_full(&self) -> bool {
        self.valid_count == self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid_count == 0
    }

    /// Place a record in the first free slot.
    ///
    /// Errors with [`StorageError::CapacityExceeded`] when the block is
    /// already full; `HeapFile` never selects a full block, so hitting this
    /// indicates an internal consistency fault.
    pub fn add_record(&mut self, record: R) -> Result<()> {
        if self.is_full() {
            return Err(StorageError::CapacityExceeded);
        }
        self.slots[self.valid_count] = Some(record);
        self.valid_count += 1;
        Ok(())
    }

    /// Remove the first record matching `key`, compacting the occupied prefix.
    ///
    /// Returns the removed record, or `None` (and no mutation) when no slot
    /// matches. Live records always occupy the packed prefix `[0, valid_count)`,
    /// so a match in a tail slot can only be a ghost decoded from zero padding
    /// and is treated as not found; removing it would corrupt the count.
    pub fn remove_record(&mut self, key: &R::Key) -> Option<R> {
        let index = self.position_of(key)?;
        if index >= self.valid_count {
            return None;
        }
        let removed = self.slots[index].take();
        self.valid_count -= 1;
        // Shift the occupied tail left so the prefix stays gap-free.
        for i in index..self.valid_count {
            self.slots[i] = self.slots[i + 1].take();
        }
        self.slots[self.valid_count] = None;
        removed
    }

    /// Return a copy of the first record matching `key`, without mutation.
    pub fn get_copy_of_record(&self, key: &R::Key) -> Option<R> {
        let index = self.position_of(key)?;
        self.slots[index].clone()
    }

    fn position_of(&self, key: &R::Key) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|r| r.matches(key)))
    }

    /// Record stored at `index`, if the slot is occupied.
    pub fn record_at(&self, index: usize) -> Option<&R> {
        self.slots.get(index).and_then(|slot| slot.as_ref())
    }

    /// Iterate the occupied prefix, slots `[0, valid_count)`.
    pub fn records(&self) -> impl Iterator<Item = &R> {
        self.slots[..self.valid_count]
            .iter()
            .filter_map(|slot| slot.as_ref())
    }

    /// Serialize to exactly `block_size` bytes.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.block_size);
        buf.extend_from_slice(&(self.valid_count as u32).to_le_bytes());
        for slot in &self.slots {
            match slot {
                Some(record) => {
                    let bytes = record.encode();
                    debug_assert_eq!(bytes.len(), R::SIZE);
                    buf.extend_from_slice(&bytes);
                }
                None => buf.resize(buf.len() + R::SIZE, 0),
            }
        }
        // Remainder left over by the capacity division.
        buf.resize(self.block_size, 0);
        buf
    }

    /// Deserialize from exactly `block_size` bytes, replacing all slots.
    ///
    /// Every slot is decoded regardless of `valid_count`; tail slots end up
    /// holding decoded zero records rather than an empty marker.
    pub fn decode(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() != self.block_size {
            return Err(StorageError::InvalidData(format!(
                "block expects {} bytes, got {}",
                self.block_size,
                bytes.len()
            )));
        }
        let valid_count = u32::from_le_bytes(
            bytes[..BLOCK_HEADER_BYTES]
                .try_into()
                .expect("header length is constant"),
        ) as usize;
        if valid_count > self.slots.len() {
            return Err(StorageError::Corruption(format!(
                "valid count {} exceeds block factor {}",
                valid_count,
                self.slots.len()
            )));
        }
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let start = BLOCK_HEADER_BYTES + i * R::SIZE;
            *slot = Some(R::decode(&bytes[start..start + R::SIZE])?);
        }
        self.valid_count = valid_count;
        Ok(())
    }
}
