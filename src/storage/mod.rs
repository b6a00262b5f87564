//! Storage layer: block codec, heap file, and persisted free-space metadata

pub mod block;
pub mod heap_file;
pub mod metadata;


pub use block::Block;
pub use heap_file::HeapFile;
pub use metadata::HeapMetadata;
