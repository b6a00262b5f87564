//! Error types for the heap-file storage engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Data corruption: {0}")]
    Corruption(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// `add_record` called on a full block. Unreachable under correct
    /// `insert_record` usage, which always selects a non-full block.
    #[error("block capacity exceeded")]
    CapacityExceeded,

    #[error("block index {0} is out of range")]
    BlockOutOfRange(u32),
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
