//! Heap-file configuration

use serde::{Deserialize, Serialize};

use crate::{Result, StorageError};

/// Number of header bytes at the start of every block (one 32-bit valid-count).
pub const BLOCK_HEADER_BYTES: usize = 4;

/// Configuration for a [`HeapFile`](crate::HeapFile) instance.
///
/// `block_size` is fixed per data file: the same value must be supplied every
/// time the same base path is reopened (enforced against the persisted
/// metadata on open).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapFileConfig {
    /// Size of one on-disk block in bytes.
    pub block_size: usize,
}

impl Default for HeapFileConfig {
    fn default() -> Self {
        Self { block_size: 1024 }
    }
}

impl HeapFileConfig {
    pub fn new(block_size: usize) -> Self {
        Self { block_size }
    }

    /// Maximum number of `record_size`-byte records one block can hold.
    pub fn block_factor(&self, record_size: usize) -> usize {
        self.block_size.saturating_sub(BLOCK_HEADER_BYTES) / record_size
    }

    /// A block must be able to hold at least one record.
    pub fn validate(&self, record_size: usize) -> Result<()> {
        if record_size == 0 {
            return Err(StorageError::InvalidConfig(
                "record size must be non-zero".into(),
            ));
        }
        if self.block_factor(record_size) == 0 {
            return Err(StorageError::InvalidConfig(format!(
                "block size {} too small for a {}-byte record plus {}-byte header",
                self.block_size, record_size, BLOCK_HEADER_BYTES
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_factor() {
        let config = HeapFileConfig::new(1024);
        assert_eq!(config.block_factor(88), 11);
        assert_eq!(config.block_factor(59), 17);
        assert_eq!(config.block_factor(1020), 1);
        assert_eq!(config.block_factor(1021), 0);
    }

    #[test]
    fn test_validate_rejects_tiny_blocks() {
        assert!(HeapFileConfig::new(1024).validate(88).is_ok());
        assert!(HeapFileConfig::new(64).validate(88).is_err());
        assert!(HeapFileConfig::new(1024).validate(0).is_err());
    }
}
