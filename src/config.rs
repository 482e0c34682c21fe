//! # Storage Configuration
//!
//! Substrate selection happens once, at process start, from this
//! configuration. Operations never branch on substrate per call.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::storage::{StorageError, StorageResult};

/// Which physical substrate backs the storage contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstrateKind {
    /// A hierarchical directory/file tree on a native filesystem.
    Filesystem,
    /// A flat key/value store.
    KeyValue,
}

/// Configuration for the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Substrate selected at startup.
    pub substrate: SubstrateKind,

    /// Root location used when no explicit `init` call arrives before the
    /// first operation. `None` disables the lazy fallback: uninitialized
    /// operations then fail with `NotInitialized`.
    pub default_root: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            substrate: SubstrateKind::Filesystem,
            default_root: Some(PathBuf::from("./data")),
        }
    }
}

impl StorageConfig {
    /// Parse a configuration from its JSON representation.
    pub fn from_json(json: &str) -> StorageResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| StorageError::IoFailure(format!("invalid storage config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_uses_filesystem_with_data_root() {
        let config = StorageConfig::default();
        assert_eq!(config.substrate, SubstrateKind::Filesystem);
        assert_eq!(config.default_root, Some(PathBuf::from("./data")));
    }

    #[test]
    fn test_parse_from_json() {
        let config =
            StorageConfig::from_json(r#"{"substrate":"key_value","default_root":null}"#).unwrap();
        assert_eq!(config.substrate, SubstrateKind::KeyValue);
        assert!(config.default_root.is_none());
    }

    #[test]
    fn test_invalid_json_is_io_failure() {
        let err = StorageConfig::from_json("{").unwrap_err();
        assert!(matches!(err, StorageError::IoFailure(_)));
    }
}
