//! Heap file: a flat sequence of fixed-size blocks with free-space reuse
//!
//! The heap file owns one data file plus a metadata sidecar. Inserts prefer
//! partially filled blocks, then fully empty ones, then append; deletes
//! compact the target block, reclassify it, and truncate any trailing run of
//! empty blocks. Metadata is flushed after every mutating operation, so no
//! in-memory-only bookkeeping survives a crash.
//!
//! Single-process, single-threaded design: every block read or write opens
//! and closes its own file handle, and callers must serialize access
//! externally if they share an instance across threads.

use crate::config::HeapFileConfig;
use crate::record::Record;
use crate::storage::block::Block;
use crate::storage::metadata::HeapMetadata;
use crate::{Result, StorageError};
use log::debug;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Suffix appended to the base path for the metadata sidecar.
const META_SUFFIX: &str = ".meta";

pub struct HeapFile<R: Record> {
    data_path: PathBuf,
    meta_path: PathBuf,
    config: HeapFileConfig,
    meta: HeapMetadata,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> HeapFile<R> {
    /// Open the heap file at `base_path`, creating it if absent.
    ///
    /// An existing file is validated against the caller's geometry: reopening
    /// with a different `block_size` (or after the record type's encoded size
    /// changed) is an [`StorageError::InvalidConfig`], not silent corruption.
    /// A fresh file gets empty metadata persisted before any block is
    /// written, so data file and sidecar always exist together.
    pub fn open(base_path: impl AsRef<Path>, config: HeapFileConfig) -> Result<Self> {
        config.validate(R::SIZE)?;

        let data_path = base_path.as_ref().to_path_buf();
        let mut sidecar = data_path.as_os_str().to_os_string();
        sidecar.push(META_SUFFIX);
        let meta_path = PathBuf::from(sidecar);

        let meta = if data_path.exists() {
            let meta = HeapMetadata::load(&meta_path)?;
            if meta.block_size as usize != config.block_size {
                return Err(StorageError::InvalidConfig(format!(
                    "file was created with block size {}, reopened with {}",
                    meta.block_size, config.block_size
                )));
            }
            if meta.record_size as usize != R::SIZE {
                return Err(StorageError::InvalidConfig(format!(
                    "file was created with record size {}, reopened with {}",
                    meta.record_size,
                    R::SIZE
                )));
            }
            meta
        } else {
            File::create(&data_path)?;
            let meta = HeapMetadata::new(config.block_size as u32, R::SIZE as u32);
            meta.save(&meta_path)?;
            meta
        };

        Ok(Self {
            data_path,
            meta_path,
            config,
            meta,
            _record: PhantomData,
        })
    }

    // ========= core operations =========

    /// Insert a record, returning the index of the block it landed in.
    ///
    /// Target selection priority: first partially empty block, else first
    /// empty block, else append a new block at the end of the file.
    ///
    /// The free lists and counters are only touched after the block write
    /// succeeds; a failed read or write leaves the classification exactly as
    /// it was.
    pub fn insert_record(&mut self, record: R) -> Result<u32> {
        enum Target {
            Partial,
            Empty,
            Append,
        }

        let (block_index, target) = if let Some(&index) = self.meta.partially_empty_blocks.front()
        {
            debug!("insert: reusing partially empty block {}", index);
            (index, Target::Partial)
        } else if let Some(&index) = self.meta.empty_blocks.front() {
            debug!("insert: reusing empty block {}", index);
            (index, Target::Empty)
        } else {
            debug!("insert: appending block {}", self.meta.total_blocks);
            (self.meta.total_blocks, Target::Append)
        };

        let mut block = match target {
            Target::Append => Block::new(self.config.block_size)?,
            _ => self.read_block(block_index)?,
        };
        block.add_record(record)?;
        self.write_block(&block, block_index)?;

        // The block is on disk; now the metadata can follow it.
        match target {
            Target::Partial => {
                self.meta.partially_empty_blocks.pop_front();
            }
            Target::Empty => {
                self.meta.empty_blocks.pop_front();
            }
            Target::Append => {
                self.meta.total_blocks += 1;
            }
        }
        // A still-partial block goes to the back of the queue, so reuse
        // rotates through partial blocks in FIFO order. A full block is
        // tracked in neither list.
        if !block.is_full() {
            self.meta.partially_empty_blocks.push_back(block_index);
        }
        self.meta.total_records += 1;

        self.persist()?;
        Ok(block_index)
    }

    /// Delete the record matching `key` from block `block_index`.
    ///
    /// Returns `Ok(false)` without any mutation when the index is out of
    /// range or no record in that block matches; this is a targeted delete,
    /// the caller knows the block from a prior insert or find.
    pub fn delete_record(&mut self, block_index: u32, key: &R::Key) -> Result<bool> {
        if block_index >= self.meta.total_blocks {
            return Ok(false);
        }

        let mut block = self.read_block(block_index)?;
        if block.remove_record(key).is_none() {
            return Ok(false);
        }
        self.write_block(&block, block_index)?;

        // The block is on disk; now reclassify and recount. The saturating
        // decrement tolerates a sidecar left stale by a crash between the
        // data-file write and the metadata flush.
        self.meta.total_records = self.meta.total_records.saturating_sub(1);
        if block.is_empty() {
            self.meta.partially_empty_blocks.retain(|&i| i != block_index);
            self.meta.empty_blocks.push_back(block_index);
        } else if !self.meta.partially_empty_blocks.contains(&block_index) {
            // Was full before this delete.
            self.meta.partially_empty_blocks.push_back(block_index);
        }

        self.trim_trailing_empty_blocks()?;

        self.persist()?;
        Ok(true)
    }

    /// Look up the record matching `key` in block `block_index`.
    ///
    /// Out-of-range indices and missing keys both yield `Ok(None)`.
    pub fn find_record(&self, block_index: u32, key: &R::Key) -> Result<Option<R>> {
        if block_index >= self.meta.total_blocks {
            return Ok(None);
        }
        let block = self.read_block(block_index)?;
        Ok(block.get_copy_of_record(key))
    }

    /// Read-only snapshot of one block, for inspection and iteration.
    ///
    /// Mutating the returned block does not affect the file.
    pub fn get_block(&self, block_index: u32) -> Result<Block<R>> {
        if block_index >= self.meta.total_blocks {
            return Err(StorageError::BlockOutOfRange(block_index));
        }
        self.read_block(block_index)
    }

    // ========= accessors (display/debugging only) =========

    pub fn total_blocks(&self) -> u32 {
        self.meta.total_blocks
    }

    pub fn total_records(&self) -> u64 {
        self.meta.total_records
    }

    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    /// Indices of fully empty blocks, in FIFO reuse order.
    pub fn empty_blocks(&self) -> &VecDeque<u32> {
        &self.meta.empty_blocks
    }

    /// Indices of partially occupied blocks, in FIFO reuse order.
    pub fn partially_empty_blocks(&self) -> &VecDeque<u32> {
        &self.meta.partially_empty_blocks
    }

    // ========= file I/O =========

    fn read_block(&self, block_index: u32) -> Result<Block<R>> {
        let mut file = File::open(&self.data_path)?;
        file.seek(SeekFrom::Start(self.block_offset(block_index)))?;
        let mut bytes = vec![0u8; self.config.block_size];
        file.read_exact(&mut bytes)?;

        let mut block = Block::new(self.config.block_size)?;
        block.decode(&bytes)?;
        Ok(block)
    }

    fn write_block(&self, block: &Block<R>, block_index: u32) -> Result<()> {
        let bytes = block.encode();
        let mut file = OpenOptions::new().write(true).open(&self.data_path)?;
        file.seek(SeekFrom::Start(self.block_offset(block_index)))?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        Ok(())
    }

    /// Drop the trailing run of empty blocks, shrinking the data file.
    ///
    /// Only a contiguous run at the end of the file is reclaimed; interior
    /// empty blocks stay allocated and reusable.
    fn trim_trailing_empty_blocks(&mut self) -> Result<()> {
        while self.meta.total_blocks > 0 {
            let last = self.meta.total_blocks - 1;
            if !self.meta.empty_blocks.contains(&last) {
                break;
            }
            let file = OpenOptions::new().write(true).open(&self.data_path)?;
            file.set_len(self.block_offset(last))?;
            file.sync_all()?;
            self.meta.total_blocks = last;
            self.meta.empty_blocks.retain(|&i| i != last);
            debug!("truncated trailing empty block {}", last);
        }
        Ok(())
    }

    fn block_offset(&self, block_index: u32) -> u64 {
        block_index as u64 * self.config.block_size as u64
    }

    fn persist(&self) -> Result<()> {
        self.meta.save(&self.meta_path)
    }
}
