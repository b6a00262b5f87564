//! Persisted heap-file metadata
//!
//! The header (`total_blocks`, `total_records`) and both free-block lists are
//! one logical record; they are persisted together as a single framed blob
//! next to the data file, so the sidecar can never be internally torn.
//!
//! ## File Format
//! ```text
//! [magic: u32 LE][version: u32 LE][len: u32 LE][bincode payload][crc32: u32 LE]
//! ```
//! The blob is written to a temp file, synced, then renamed over the previous
//! one. No atomicity is provided BETWEEN this file and the data file.

use crate::{Result, StorageError};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

const META_MAGIC: u32 = 0x48504D54; // "HPMT"
const META_VERSION: u32 = 1;
const FRAME_BYTES: usize = 12; // magic + version + len

/// Everything the heap file must remember across restarts, besides the block
/// data itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapMetadata {
    /// Block geometry, validated on reopen so one file is never read with two
    /// different layouts.
    pub block_size: u32,
    pub record_size: u32,

    pub total_blocks: u32,
    pub total_records: u64,

    /// Indices with no records, in FIFO reuse order.
    pub empty_blocks: VecDeque<u32>,
    /// Indices with some free slots, in FIFO reuse order.
    pub partially_empty_blocks: VecDeque<u32>,
}

impl HeapMetadata {
    pub fn new(block_size: u32, record_size: u32) -> Self {
        Self {
            block_size,
            record_size,
            total_blocks: 0,
            total_records: 0,
            empty_blocks: VecDeque::new(),
            partially_empty_blocks: VecDeque::new(),
        }
    }

    /// Write the blob to `path` via temp file + rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let payload = bincode::serialize(self)?;
        let mut buf = Vec::with_capacity(FRAME_BYTES + payload.len() + 4);
        buf.extend_from_slice(&META_MAGIC.to_le_bytes());
        buf.extend_from_slice(&META_VERSION.to_le_bytes());
        buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        buf.extend_from_slice(&payload);
        buf.extend_from_slice(&crc32fast::hash(&payload).to_le_bytes());

        let tmp_path = path.with_extension("meta.tmp");
        let mut tmp = File::create(&tmp_path)?;
        tmp.write_all(&buf)?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Read and verify the blob at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let mut buf = Vec::new();
        File::open(path)?.read_to_end(&mut buf)?;

        if buf.len() < FRAME_BYTES + 4 {
            return Err(StorageError::Corruption(format!(
                "metadata file truncated: {} bytes",
                buf.len()
            )));
        }
        let magic = u32::from_le_bytes(buf[0..4].try_into().expect("frame length checked"));
        if magic != META_MAGIC {
            return Err(StorageError::Corruption(format!(
                "bad metadata magic: {:#010x}",
                magic
            )));
        }
        let version = u32::from_le_bytes(buf[4..8].try_into().expect("frame length checked"));
        if version != META_VERSION {
            return Err(StorageError::Corruption(format!(
                "unsupported metadata version: {}",
                version
            )));
        }
        let len = u32::from_le_bytes(buf[8..12].try_into().expect("frame length checked")) as usize;
        if buf.len() != FRAME_BYTES + len + 4 {
            return Err(StorageError::Corruption(format!(
                "metadata length mismatch: frame says {}, file holds {}",
                len,
                buf.len() - FRAME_BYTES - 4
            )));
        }

        let payload = &buf[FRAME_BYTES..FRAME_BYTES + len];
        let stored_crc = u32::from_le_bytes(
            buf[FRAME_BYTES + len..]
                .try_into()
                .expect("frame length checked"),
        );
        let computed_crc = crc32fast::hash(payload);
        if stored_crc != computed_crc {
            return Err(StorageError::Corruption(format!(
                "metadata CRC mismatch: stored {:#010x}, computed {:#010x}",
                stored_crc, computed_crc
            )));
        }

        Ok(bincode::deserialize(payload)?)
    }
}
