use std::path::PathBuf;

use thiserror::Error;

pub mod json;
#[cfg(test)]
pub mod memory;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read key '{key}' from '{path}': {source}")]
    ReadFailed {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write key '{key}' to '{path}': {source}")]
    WriteFailed {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove key '{key}' at '{path}': {source}")]
    RemoveFailed {
        key: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize value for key '{key}': {source}")]
    SerializeFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String-keyed blob storage. The repository layer decides what the blobs
/// mean; implementations only move bytes.
pub trait KvStore {
    /// Read one key. A key that was never written is `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write one key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove several keys at once. Keys that do not exist are skipped.
    fn remove(&self, keys: &[&str]) -> Result<(), StorageError>;
}
