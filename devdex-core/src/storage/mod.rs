//! Storage ports
//!
//! The core never touches process-wide singletons directly. Everything that
//! persists goes through one of two injected capabilities:
//!
//! - [`PackDirectory`]: the sandboxed directory holding downloaded pack files
//! - [`KeyValueStore`]: durable string key/value pairs (streak, favorites)
//!
//! ## Implementations
//!
//! - [`fs::FsPackDirectory`] / [`fs::JsonFileStore`]: production, on disk
//! - [`memory::MemoryPackDirectory`] / [`memory::MemoryStore`]: tests
//!
//! Neither port offers transactions. Callers that read, modify and write
//! back (favorites toggle, streak completion) can lose updates if two of
//! them interleave.

use async_trait::async_trait;

use crate::error::StorageError;

pub mod fs;
pub mod memory;

pub use fs::{FsPackDirectory, JsonFileStore};
pub use memory::{MemoryPackDirectory, MemoryStore};

/// A directory of overlay pack files, addressed by plain file name
#[async_trait]
pub trait PackDirectory: Send + Sync {
    /// Create the directory if absent. Idempotent.
    async fn ensure(&self) -> Result<(), StorageError>;

    /// Names of the regular files in the directory, sorted
    async fn list(&self) -> Result<Vec<String>, StorageError>;

    /// Read a file as UTF-8 text
    async fn read(&self, name: &str) -> Result<String, StorageError>;

    /// Create or replace a file
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Atomically move `from` over `to`
    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError>;

    /// Delete a file. Missing files are an error.
    async fn remove(&self, name: &str) -> Result<(), StorageError>;

    /// Human readable location for log lines
    fn describe(&self) -> String;
}

/// Durable string key/value storage
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Reject names that would leave the directory
pub fn validate_file_name(name: &str) -> Result<(), StorageError> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}
