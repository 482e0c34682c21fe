//! # Storage Contract
//!
//! The uniform async file-operation interface consumed by the database
//! engine. Both adapters (`FileBackend`, `KvBackend`) implement it, so the
//! engine never knows which physical substrate holds its datafiles.
//!
//! Byte payloads are opaque: the contract moves them, it never interprets
//! them. The crash-safe write and startup-integrity operations are provided
//! here as compositions of the primitive operations; substrates where plain
//! overwrite is already atomic override them with cheaper equivalents.

use async_trait::async_trait;

use crate::observability::{Logger, Severity};

use super::errors::{StorageError, StorageResult};
use super::path::temp_sibling;

/// Text encoding for the text-reading convenience operation.
///
/// UTF-8 is the only supported encoding and the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Utf8,
}

impl Encoding {
    /// Decode raw bytes with this encoding.
    pub fn decode(&self, path: &str, bytes: Vec<u8>) -> StorageResult<String> {
        match self {
            Encoding::Utf8 => String::from_utf8(bytes)
                .map_err(|e| StorageError::io(path, format!("invalid UTF-8: {}", e))),
        }
    }
}

/// The uniform storage contract.
///
/// All operations are asynchronous and run to their natural completion;
/// there is no cancellation and no cross-call ordering beyond what the
/// substrate provides for a single path. Callers serialize mutating
/// operations per path themselves.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// True iff a file or directory resolves at `path`. Never fails:
    /// an unresolvable path yields `false`.
    async fn exists(&self, path: &str) -> bool;

    /// Read the full contents of the file at `path`.
    ///
    /// # Errors
    ///
    /// `NotFound` if no file resolves at `path`.
    async fn read_file(&self, path: &str) -> StorageResult<Vec<u8>>;

    /// Create or truncate the file at `path` and write `data`, creating
    /// missing intermediate directories.
    async fn write_file(&self, path: &str, data: &[u8]) -> StorageResult<()>;

    /// Append `data` to the file at `path`; a missing file is created
    /// containing only `data`. No separator is inserted.
    async fn append_file(&self, path: &str, data: &[u8]) -> StorageResult<()>;

    /// Remove the file at `path`, or the directory and all its contents
    /// if `path` resolves to one. Succeeds silently when nothing exists.
    async fn unlink(&self, path: &str) -> StorageResult<()>;

    /// Rename `old_path` to `new_path`. Same parent directory: an in-place
    /// rename. Different parent: a move, creating destination directories
    /// as needed. Contents are preserved exactly.
    async fn rename(&self, old_path: &str, new_path: &str) -> StorageResult<()>;

    /// Ensure every directory segment of `path` exists. No-op on
    /// substrates without directories.
    async fn mkdirp(&self, path: &str) -> StorageResult<()>;

    /// Read the file at `path` and decode it as text.
    async fn read_file_text(&self, path: &str, encoding: Encoding) -> StorageResult<String> {
        let bytes = self.read_file(path).await?;
        encoding.decode(path, bytes)
    }

    /// Write `data` so that a crash mid-write never leaves a corrupt or
    /// truncated live file: write to the temp sibling (`path~`), then
    /// promote it over `path` with an atomic rename.
    ///
    /// Substrates where plain overwrite is already atomic override this
    /// with `write_file`.
    async fn crash_safe_write_file(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        let temp_path = temp_sibling(path);
        self.write_file(&temp_path, data).await?;
        self.rename(&temp_path, path).await
    }

    /// Delete the file at `path` if present; no-op otherwise. Idempotent.
    async fn ensure_file_doesnt_exist(&self, path: &str) -> StorageResult<()> {
        if !self.exists(path).await {
            return Ok(());
        }
        self.unlink(path).await
    }

    /// Reconcile the datafile at `path` with its temp sibling after a
    /// possible crash. Run at startup, before the datafile is opened.
    ///
    /// Three branches, no others:
    /// - `path` exists: the prior write completed, nothing to do
    /// - neither `path` nor `path~` exists: first run, create `path` empty
    /// - only `path~` exists: the prior write was interrupted before the
    ///   promoting rename; recover by renaming `path~` to `path`
    ///
    /// Substrates without an intermediate write state override this with
    /// a no-op.
    async fn ensure_datafile_integrity(&self, path: &str) -> StorageResult<()> {
        if self.exists(path).await {
            return Ok(());
        }

        let temp_path = temp_sibling(path);
        if !self.exists(&temp_path).await {
            return self.write_file(path, b"").await;
        }

        Logger::log(Severity::Info, "DATAFILE_RECOVERED", &[("path", path)]);
        self.rename(&temp_path, path).await
    }
}
