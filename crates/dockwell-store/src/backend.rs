#![forbid(unsafe_code)]

//! Storage backends: the key-value capability the store is built on.
//!
//! [`StorageBackend`] abstracts whatever the host offers for persistence —
//! browser local/session storage, a config directory, or an in-memory map —
//! so the controller logic is testable without a real browser backend and
//! portable to any persistence medium.
//!
//! # Failure Modes
//!
//! - [`FileStorage`] surfaces I/O problems as [`StorageError::Io`]; writes
//!   are temp-file-then-rename so a crash mid-write never leaves a
//!   half-written value behind.
//! - Quota-style failures ([`StorageError::QuotaExceeded`]) come from
//!   web-storage-like backends; the store above swallows and logs them.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Result alias for backend operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Failure modes of a storage backend.
#[derive(Debug)]
pub enum StorageError {
    /// Underlying I/O failure.
    Io(io::Error),
    /// The backend refused the write for capacity reasons.
    QuotaExceeded {
        /// The key that could not be written.
        key: String,
    },
    /// Backend-specific failure (disabled storage, security error).
    Backend(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "storage i/o error: {e}"),
            Self::QuotaExceeded { key } => write!(f, "storage quota exceeded writing {key:?}"),
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// A string key-value store with whole-value reads and writes.
///
/// All values are JSON documents; the backend treats them as opaque strings.
pub trait StorageBackend {
    /// Read the value for a key. Missing keys are `Ok(None)`, not errors.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value for a key, replacing any existing value.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a key. Removing a missing key is a no-op.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

/// In-memory backend: the default ephemeral store and the test double.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the backend holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File backend: one JSON file per key under a root directory.
///
/// Writes are atomic (write to a temp file, then rename) so readers never
/// observe a torn value.
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a file backend rooted at `root`, creating the directory if
    /// needed.
    pub fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The directory values are stored under.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are dotted namespaces; keep them readable on disk while
        // rejecting path traversal.
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{safe}.json"))
    }
}

impl StorageBackend for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
