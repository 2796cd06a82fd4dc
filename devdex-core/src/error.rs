//! Error types for the DevDex core
//!
//! Public operations on the repository and the stores degrade to
//! best-effort values. These types carry the failure detail underneath
//! those values, for logging and for the `*_detailed` variants.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by a storage port (pack directory or key-value store)
#[derive(Error, Debug)]
pub enum StorageError {
    /// Underlying filesystem operation failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The named entry does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The name would escape the storage sandbox or is otherwise unusable
    #[error("Invalid storage name '{0}'")]
    InvalidName(String),

    /// Entry exists but is not valid UTF-8 text
    #[error("Entry '{0}' is not valid UTF-8")]
    NotText(String),

    /// The key-value backing document could not be decoded
    #[error("Key-value store is unreadable: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Backend is unreachable (used by in-memory fakes to simulate outages)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            let path = path.into();
            return StorageError::NotFound(path.display().to_string());
        }
        StorageError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures while downloading a pack into the overlay directory
#[derive(Error, Debug)]
pub enum InstallError {
    /// Server answered with something other than 200 OK
    #[error("Download failed: HTTP {status} for {url}")]
    Http { status: u16, url: String },

    /// Connection, timeout, or body transfer failure
    #[error("Transport error fetching {url}: {message}")]
    Transport { url: String, message: String },

    /// Downloaded bytes do not match the digest advertised by the index
    #[error("Digest verification failed!\nExpected: {expected}\nActual: {actual}")]
    DigestMismatch { expected: String, actual: String },

    /// Writing or committing the file failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures while resolving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("Could not determine a data directory for devdex")]
    NoDataDir,
}

/// Failures while fetching the remote pack index
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to fetch pack index: HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error(transparent)]
    Fetch(#[from] InstallError),

    #[error("Failed to parse pack index: {0}")]
    Parse(#[from] serde_json::Error),
}
