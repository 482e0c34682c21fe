//! Storage subsystem for docstore
//!
//! A uniform async file-operation contract over pluggable physical
//! substrates. The database engine holds a [`Storage`] (or any
//! `Box<dyn StorageBackend>`) and stays oblivious to whether its
//! datafiles live in a directory tree or a flat key/value store.
//!
//! # Design Principles
//!
//! - Byte payloads are opaque; the contract moves them, never parses them
//! - Handles are re-resolved per operation, never cached
//! - Crash-safe writes go through a temp sibling plus atomic rename
//! - Startup integrity reconciliation is all-or-nothing
//! - No locking or ordering beyond what the substrate itself provides

mod contract;
mod errors;
mod file;
mod kv;
mod lazy;
mod path;

pub use contract::{Encoding, StorageBackend};
pub use errors::{StorageError, StorageResult};
pub use file::FileBackend;
pub use kv::{KeyValueStore, KvBackend, MemoryKv};
pub use lazy::Storage;
pub use path::{temp_sibling, LogicalPath};
