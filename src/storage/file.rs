//! # Filesystem Backend
//!
//! Path-oriented adapter for substrates exposing a hierarchical directory
//! tree, backed by `tokio::fs`. Logical paths are resolved against the
//! bound root one segment at a time; create-style operations grow missing
//! intermediate directories on demand, read-style operations fail
//! `NotFound` instead.
//!
//! Crash safety comes from the contract's temp-sibling protocol: every
//! write here fsyncs before returning, and every rename fsyncs the parent
//! directory afterwards, so the write-then-promote sequence is durable.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::contract::StorageBackend;
use super::errors::{StorageError, StorageResult};
use super::path::LogicalPath;

/// Storage adapter bound to a root directory on a native filesystem.
///
/// The root is bound once at construction and never mutated; all logical
/// paths resolve relative to it. Handles are not cached across calls.
#[derive(Debug)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Bind the adapter to `root`, creating the directory if missing.
    ///
    /// # Errors
    ///
    /// `IoFailure` if the root cannot be created or is not a directory.
    pub async fn init(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::io(&root.display().to_string(), e))?;
        Ok(Self { root })
    }

    /// The bound root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk `path` one directory segment per step, starting from the root.
    ///
    /// With `create` set, missing segments are created; without it, a
    /// missing segment fails `NotFound`. A segment that exists but is not
    /// a directory fails `IoFailure` either way.
    async fn resolve_dir(&self, path: &LogicalPath, create: bool) -> StorageResult<PathBuf> {
        let mut current = self.root.clone();
        for segment in path.segments() {
            current.push(segment);
            match fs::symlink_metadata(&current).await {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => {
                    return Err(StorageError::io(
                        &path.as_string(),
                        format!("segment `{}` is not a directory", segment),
                    ));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    if !create {
                        return Err(StorageError::not_found(path.as_string()));
                    }
                    fs::create_dir(&current)
                        .await
                        .map_err(|e| StorageError::io(&path.as_string(), e))?;
                }
                Err(e) => return Err(StorageError::io(&path.as_string(), e)),
            }
        }
        Ok(current)
    }

    /// Resolve `path` to the native location of its final file segment.
    async fn resolve_file(&self, path: &str, create_parents: bool) -> StorageResult<PathBuf> {
        let logical = LogicalPath::parse(path);
        let name = logical
            .file_name()
            .ok_or_else(|| StorageError::io(path, "path has no file segment"))?
            .to_string();
        let dir = self.resolve_dir(&logical.parent(), create_parents).await?;
        Ok(dir.join(name))
    }

    /// Write `data` through an open handle and fsync before returning.
    async fn write_and_sync(path: &str, mut file: File, data: &[u8]) -> StorageResult<()> {
        file.write_all(data)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        file.sync_all().await.map_err(|e| StorageError::io(path, e))
    }

    /// Fsync the parent directory of `native` so a completed rename is
    /// durable. Best-effort: not every platform allows opening a
    /// directory for sync.
    async fn sync_parent_dir(native: &Path) {
        if let Some(parent) = native.parent() {
            if let Ok(dir) = File::open(parent).await {
                let _ = dir.sync_all().await;
            }
        }
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn exists(&self, path: &str) -> bool {
        let logical = LogicalPath::parse(path);
        let mut native = self.root.clone();
        for segment in logical.segments() {
            native.push(segment);
        }
        fs::try_exists(&native).await.unwrap_or(false)
    }

    async fn read_file(&self, path: &str) -> StorageResult<Vec<u8>> {
        let native = self.resolve_file(path, false).await?;
        fs::read(&native).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::not_found(path)
            } else {
                StorageError::io(path, e)
            }
        })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        let native = self.resolve_file(path, true).await?;
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&native)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        Self::write_and_sync(path, file, data).await
    }

    async fn append_file(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        let native = self.resolve_file(path, true).await?;
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&native)
            .await
            .map_err(|e| StorageError::io(path, e))?;
        Self::write_and_sync(path, file, data).await
    }

    async fn unlink(&self, path: &str) -> StorageResult<()> {
        let native = match self.resolve_file(path, false).await {
            Ok(native) => native,
            // Missing intermediate directory: nothing exists at `path`.
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e),
        };

        match fs::symlink_metadata(&native).await {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&native)
                .await
                .map_err(|e| StorageError::io(path, e)),
            Ok(_) => fs::remove_file(&native)
                .await
                .map_err(|e| StorageError::io(path, e)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    async fn rename(&self, old_path: &str, new_path: &str) -> StorageResult<()> {
        let old_logical = LogicalPath::parse(old_path);
        let new_logical = LogicalPath::parse(new_path);

        let src = self.resolve_file(old_path, false).await?;
        let new_name = new_logical
            .file_name()
            .ok_or_else(|| StorageError::io(new_path, "path has no file segment"))?
            .to_string();

        // Same parent (or parentless destination): in-place rename.
        // Otherwise: a move, growing the destination directory tree first.
        let dst = if new_logical.parent().is_root() || old_logical.parent() == new_logical.parent()
        {
            src.parent()
                .map(|p| p.join(&new_name))
                .unwrap_or_else(|| self.root.join(&new_name))
        } else {
            let dir = self.resolve_dir(&new_logical.parent(), true).await?;
            dir.join(&new_name)
        };

        fs::rename(&src, &dst).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::not_found(old_path)
            } else {
                StorageError::io(old_path, e)
            }
        })?;

        Self::sync_parent_dir(&dst).await;
        Ok(())
    }

    async fn mkdirp(&self, path: &str) -> StorageResult<()> {
        let logical = LogicalPath::parse(path);
        self.resolve_dir(&logical, true).await?;
        Ok(())
    }
}
