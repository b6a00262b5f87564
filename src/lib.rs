//! Fixed-block heap-file storage engine
//!
//! Persists fixed-size records into equal-size disk blocks, reuses freed
//! space through persisted free-block lists, and addresses records by
//! `(block index, key)`.
//!
//! ## Architecture
//! - [`Record`]: capability contract for any fixed-size, key-addressable
//!   record type (see [`person::Person`] for the sample layout)
//! - [`Block`]: in-memory image of one block, packed records + valid-count
//! - [`HeapFile`]: the data file, free-space classification, and its
//!   persisted metadata sidecar
//!
//! ## Example
//! ```no_run
//! use heapfile::{HeapFile, HeapFileConfig, person::Person};
//!
//! # fn main() -> heapfile::Result<()> {
//! let mut heap: HeapFile<Person> = HeapFile::open("people.db", HeapFileConfig::default())?;
//! let block = heap.insert_record(Person::new("Ada", "Lovelace", 0, "id-0000001"))?;
//! if let Some(found) = heap.find_record(block, "id-0000001")? {
//!     println!("{} {}", found.first_name(), found.last_name());
//! }
//! heap.delete_record(block, "id-0000001")?;
//! # Ok(())
//! # }
//! ```
//!
//! Single-process, single-threaded, synchronous I/O. There is no
//! cross-file atomicity between the data file and the metadata sidecar.

pub mod config;
pub mod person;
pub mod record;
pub mod storage;

mod error;

pub use config::{HeapFileConfig, BLOCK_HEADER_BYTES};
pub use error::{Result, StorageError};
pub use record::Record;
pub use storage::{Block, HeapFile, HeapMetadata};
