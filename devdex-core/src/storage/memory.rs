//! In-memory adapters, used by tests in place of the filesystem

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{validate_file_name, KeyValueStore, PackDirectory};
use crate::error::StorageError;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Pack directory held in a map, with switchable failure modes
#[derive(Debug, Default)]
pub struct MemoryPackDirectory {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    exists: AtomicBool,
    fail_listing: AtomicBool,
    fail_removal: AtomicBool,
}

impl MemoryPackDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file without going through the port
    pub fn insert(&self, name: &str, content: impl Into<Vec<u8>>) {
        self.exists.store(true, Ordering::SeqCst);
        lock(&self.files).insert(name.to_string(), content.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        lock(&self.files).contains_key(name)
    }

    pub fn file_names(&self) -> Vec<String> {
        lock(&self.files).keys().cloned().collect()
    }

    /// Whether `ensure` has been called (or a file seeded)
    pub fn exists(&self) -> bool {
        self.exists.load(Ordering::SeqCst)
    }

    /// Make `list` fail as if the directory were unreachable
    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    /// Make `remove` fail as if the file were read-only
    pub fn set_fail_removal(&self, fail: bool) {
        self.fail_removal.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl PackDirectory for MemoryPackDirectory {
    async fn ensure(&self) -> Result<(), StorageError> {
        self.exists.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("listing disabled".to_string()));
        }
        if !self.exists() {
            return Err(StorageError::NotFound("memory directory".to_string()));
        }
        Ok(self.file_names())
    }

    async fn read(&self, name: &str) -> Result<String, StorageError> {
        validate_file_name(name)?;
        let bytes = lock(&self.files)
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        String::from_utf8(bytes).map_err(|_| StorageError::NotText(name.to_string()))
    }

    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        validate_file_name(name)?;
        if !self.exists() {
            return Err(StorageError::NotFound("memory directory".to_string()));
        }
        lock(&self.files).insert(name.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError> {
        validate_file_name(from)?;
        validate_file_name(to)?;
        let mut files = lock(&self.files);
        let bytes = files
            .remove(from)
            .ok_or_else(|| StorageError::NotFound(from.to_string()))?;
        files.insert(to.to_string(), bytes);
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StorageError> {
        validate_file_name(name)?;
        if self.fail_removal.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("removal disabled".to_string()));
        }
        lock(&self.files)
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Key-value store held in a map
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(lock(&self.entries).get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        lock(&self.entries).remove(key);
        Ok(())
    }
}
