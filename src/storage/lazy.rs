//! # Lazy-Initialized Storage Front
//!
//! `Storage` is what the database engine holds: the configured adapter
//! behind a once-bound cell. An explicit `init(root)` binds the adapter
//! up front; otherwise the first real operation binds it lazily from the
//! configured default root, and fails with `NotInitialized` when no
//! default exists. The wrapper only interposes that check — arguments and
//! results pass through untouched.

use std::path::Path;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::config::{StorageConfig, SubstrateKind};
use crate::observability::{Logger, Severity};

use super::contract::{Encoding, StorageBackend};
use super::errors::{StorageError, StorageResult};
use super::file::FileBackend;
use super::kv::{KvBackend, MemoryKv};

/// Storage front holding the bound adapter for the process lifetime.
///
/// The root handle is bound at most once and never mutated afterwards;
/// all operations share it read-only.
pub struct Storage {
    config: StorageConfig,
    backend: OnceCell<Box<dyn StorageBackend>>,
}

impl Storage {
    /// Create an unbound front with the given configuration.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            backend: OnceCell::new(),
        }
    }

    /// Create a front over an externally-constructed, already-bound
    /// adapter (e.g. a `KvBackend` over a device substrate).
    pub fn with_backend(backend: Box<dyn StorageBackend>) -> Self {
        Self {
            config: StorageConfig {
                substrate: SubstrateKind::KeyValue,
                default_root: None,
            },
            backend: OnceCell::new_with(Some(backend)),
        }
    }

    /// Bind the configured adapter to `root` explicitly.
    ///
    /// Must run before the first operation to take effect; the key/value
    /// substrate needs no root and ignores it.
    ///
    /// # Errors
    ///
    /// `IoFailure` if the root cannot be bound or a root is already bound.
    pub async fn init(&self, root: impl AsRef<Path>) -> StorageResult<()> {
        let backend = Self::build(self.config.substrate, Some(root.as_ref())).await?;
        self.backend
            .set(backend)
            .map_err(|_| StorageError::IoFailure("storage root already bound".into()))
    }

    async fn build(
        substrate: SubstrateKind,
        root: Option<&Path>,
    ) -> StorageResult<Box<dyn StorageBackend>> {
        match substrate {
            SubstrateKind::Filesystem => {
                let root = root.ok_or(StorageError::NotInitialized)?;
                Ok(Box::new(FileBackend::init(root).await?))
            }
            SubstrateKind::KeyValue => Ok(Box::new(KvBackend::new(MemoryKv::new()))),
        }
    }

    /// The bound adapter, binding it from the default root on first use.
    async fn backend(&self) -> StorageResult<&dyn StorageBackend> {
        let backend = self
            .backend
            .get_or_try_init(|| async {
                match self.config.substrate {
                    SubstrateKind::KeyValue => Self::build(SubstrateKind::KeyValue, None).await,
                    SubstrateKind::Filesystem => match &self.config.default_root {
                        Some(root) => {
                            Logger::log(
                                Severity::Warn,
                                "STORAGE_DEFAULT_ROOT",
                                &[("root", &root.display().to_string())],
                            );
                            Self::build(SubstrateKind::Filesystem, Some(root)).await
                        }
                        None => {
                            Logger::log_stderr(Severity::Fatal, "STORAGE_NOT_INITIALIZED", &[]);
                            Err(StorageError::NotInitialized)
                        }
                    },
                }
            })
            .await?;
        Ok(backend.as_ref())
    }
}

// Pure delegation. The provided contract methods are forwarded too, so an
// adapter's overrides (the key/value degenerate crash-safety) stay in
// effect behind the front.
#[async_trait]
impl StorageBackend for Storage {
    async fn exists(&self, path: &str) -> bool {
        match self.backend().await {
            Ok(backend) => backend.exists(path).await,
            Err(_) => false,
        }
    }

    async fn read_file(&self, path: &str) -> StorageResult<Vec<u8>> {
        self.backend().await?.read_file(path).await
    }

    async fn read_file_text(&self, path: &str, encoding: Encoding) -> StorageResult<String> {
        self.backend().await?.read_file_text(path, encoding).await
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        self.backend().await?.write_file(path, data).await
    }

    async fn append_file(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        self.backend().await?.append_file(path, data).await
    }

    async fn unlink(&self, path: &str) -> StorageResult<()> {
        self.backend().await?.unlink(path).await
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> StorageResult<()> {
        self.backend().await?.rename(old_path, new_path).await
    }

    async fn mkdirp(&self, path: &str) -> StorageResult<()> {
        self.backend().await?.mkdirp(path).await
    }

    async fn crash_safe_write_file(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        self.backend().await?.crash_safe_write_file(path, data).await
    }

    async fn ensure_file_doesnt_exist(&self, path: &str) -> StorageResult<()> {
        self.backend().await?.ensure_file_doesnt_exist(path).await
    }

    async fn ensure_datafile_integrity(&self, path: &str) -> StorageResult<()> {
        self.backend().await?.ensure_datafile_integrity(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_explicit_init_binds_root() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(StorageConfig {
            substrate: SubstrateKind::Filesystem,
            default_root: None,
        });

        storage.init(temp.path()).await.unwrap();
        storage.write_file("users.db", b"d").await.unwrap();
        assert!(temp.path().join("users.db").exists());
    }

    #[tokio::test]
    async fn test_lazy_fallback_to_default_root() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(StorageConfig {
            substrate: SubstrateKind::Filesystem,
            default_root: Some(temp.path().join("fallback")),
        });

        // No init call: first operation binds the default root.
        storage.write_file("users.db", b"d").await.unwrap();
        assert!(temp.path().join("fallback/users.db").exists());
    }

    #[tokio::test]
    async fn test_no_default_fails_not_initialized() {
        let storage = Storage::new(StorageConfig {
            substrate: SubstrateKind::Filesystem,
            default_root: None,
        });

        let err = storage.read_file("users.db").await.unwrap_err();
        assert!(matches!(err, StorageError::NotInitialized));

        // exists never fails, even unbound.
        assert!(!storage.exists("users.db").await);
    }

    #[tokio::test]
    async fn test_second_init_rejected() {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(StorageConfig::default());

        storage.init(temp.path()).await.unwrap();
        let err = storage.init(temp.path()).await.unwrap_err();
        assert!(matches!(err, StorageError::IoFailure(_)));
    }

    #[tokio::test]
    async fn test_key_value_substrate_needs_no_root() {
        let storage = Storage::new(StorageConfig {
            substrate: SubstrateKind::KeyValue,
            default_root: None,
        });

        storage.write_file("users.db", b"d").await.unwrap();
        assert_eq!(storage.read_file("users.db").await.unwrap(), b"d");
    }

    #[tokio::test]
    async fn test_with_backend_uses_supplied_adapter() {
        let storage = Storage::with_backend(Box::new(KvBackend::new(MemoryKv::new())));

        storage.crash_safe_write_file("users.db", b"d").await.unwrap();
        assert!(!storage.exists("users.db~").await);
        assert_eq!(storage.read_file("users.db").await.unwrap(), b"d");
    }
}
