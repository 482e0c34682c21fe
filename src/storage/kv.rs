//! # Key/Value Backend
//!
//! Key-oriented adapter for substrates exposing a flat get/set/remove
//! surface. Each logical path is one key; directories do not exist, so
//! `mkdirp` is a no-op. A value overwrite is atomic from the caller's
//! perspective, so the crash-safe write degenerates to a plain write and
//! the startup integrity check has nothing to reconcile.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::contract::StorageBackend;
use super::errors::{StorageError, StorageResult};
use super::path::LogicalPath;

/// The key/value substrate capability consumed by [`KvBackend`].
///
/// Supplied externally; this crate calls through it and never
/// reimplements it. Implementations must be `Send + Sync`.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetch the value for `key`, or `None` if absent.
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Store `value` under `key`, overwriting any previous value.
    async fn set(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Remove `key`. Succeeds when the key is absent.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-process key/value substrate, for tests and ephemeral databases.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| StorageError::IoFailure("key/value store lock poisoned".into()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        self.lock()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Storage adapter over a flat key/value substrate.
pub struct KvBackend<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvBackend<S> {
    /// Bind the adapter to an already-initialized substrate.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Normalize a logical path into the substrate key.
    fn key(path: &str) -> String {
        LogicalPath::parse(path).as_string()
    }
}

#[async_trait]
impl<S: KeyValueStore> StorageBackend for KvBackend<S> {
    async fn exists(&self, path: &str) -> bool {
        matches!(self.store.get(&Self::key(path)).await, Ok(Some(_)))
    }

    async fn read_file(&self, path: &str) -> StorageResult<Vec<u8>> {
        self.store
            .get(&Self::key(path))
            .await?
            .ok_or_else(|| StorageError::not_found(path))
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        self.store.set(&Self::key(path), data).await
    }

    async fn append_file(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        let key = Self::key(path);
        let mut contents = self.store.get(&key).await?.unwrap_or_default();
        contents.extend_from_slice(data);
        self.store.set(&key, &contents).await
    }

    async fn unlink(&self, path: &str) -> StorageResult<()> {
        self.store.remove(&Self::key(path)).await
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> StorageResult<()> {
        let old_key = Self::key(old_path);
        let new_key = Self::key(new_path);

        match self.store.get(&old_key).await? {
            Some(value) => {
                self.store.set(&new_key, &value).await?;
                self.store.remove(&old_key).await
            }
            // Missing source: the destination is cleared instead, so a
            // promoting rename after a lost temp value leaves no stale
            // destination behind.
            None => self.store.remove(&new_key).await,
        }
    }

    /// No directories on a flat substrate.
    async fn mkdirp(&self, _path: &str) -> StorageResult<()> {
        Ok(())
    }

    /// A single-key overwrite cannot be left half-written.
    async fn crash_safe_write_file(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        self.write_file(path, data).await
    }

    /// No intermediate write state exists to recover from.
    async fn ensure_datafile_integrity(&self, _path: &str) -> StorageResult<()> {
        Ok(())
    }
}
