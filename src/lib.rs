//! docstore - pluggable persistence layer for an embedded document database
//!
//! A uniform, crash-safe file-operation contract backed by either a native
//! filesystem tree or a flat key/value substrate.

pub mod config;
pub mod observability;
pub mod storage;

pub use config::{StorageConfig, SubstrateKind};
pub use storage::{
    Encoding, FileBackend, KeyValueStore, KvBackend, MemoryKv, Storage, StorageBackend,
    StorageError, StorageResult,
};
