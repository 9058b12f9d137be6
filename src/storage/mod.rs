//! Persistent key/value storage
//!
//! This module provides the local persistence used by every stateful slice
//! of the application state. It supports:
//! - In-memory store - default for tests and ephemeral sessions
//! - File store - a single JSON document on disk, written through on every change
//!
//! The backend is selected based on configuration. Values are stored as
//! JSON-encoded strings under a fixed set of keys (see [`keys`]).
//!
//! # Usage
//!
//! ```rust,ignore
//! use influencer_hub::storage::{create_store, PersistentStore};
//! use influencer_hub::config::StorageConfig;
//!
//! let store = PersistentStore::new(create_store(&StorageConfig::default())?);
//! store.set("app-theme", &Theme::Dark);
//! let theme: Theme = store.get("app-theme", Theme::Light);
//! ```

pub mod file;
pub mod memory;

use serde::{de::DeserializeOwned, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{StorageConfig, StorageDriver};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Keys of the persisted state slices
pub mod keys {
    pub const THEME: &str = "app-theme";
    pub const LANGUAGE: &str = "app-language";
    pub const BRAND_PREFERENCES: &str = "brand-preferences";
    pub const SAVED_INFLUENCERS: &str = "saved-influencers";
    pub const NOTIFICATIONS: &str = "app-notifications";
    pub const USER_PROFILE: &str = "user-profile";
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read store '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write store '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Corrupt store '{path}': {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Raw string key/value backend.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw string stored under `key`
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value
    fn write(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Delete `key`
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Create a store backend based on configuration
///
/// - `StorageDriver::Memory` - process-local map, lost on exit
/// - `StorageDriver::File` - JSON document at `config.path`
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, StorageError> {
    match config.driver {
        StorageDriver::Memory => {
            debug!("Using in-memory storage");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageDriver::File => {
            debug!("Using file storage at {}", config.path.display());
            Ok(Arc::new(FileStore::open(&config.path)?))
        }
    }
}

/// Typed JSON adapter over a [`KeyValueStore`].
///
/// Never fails: reads fall back to the caller's default and write errors
/// are logged and dropped.
#[derive(Clone)]
pub struct PersistentStore {
    backend: Arc<dyn KeyValueStore>,
}

impl PersistentStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Store backed by a fresh in-memory map
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Decode the value under `key`, or return `default` when it is absent
    /// or cannot be decoded.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                warn!("Failed to read '{}' from storage: {}", key, e);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Discarding undecodable value for '{}': {}", key, e);
                default
            }
        }
    }

    /// JSON-encode `value` and store it under `key`.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!("Failed to encode '{}' for storage: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.backend.write(key, encoded) {
            warn!("Failed to write '{}' to storage: {}", key, e);
        }
    }

    /// Delete `key`; errors are logged.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            warn!("Failed to remove '{}' from storage: {}", key, e);
        }
    }

    /// Raw string under `key`, for inspection
    pub fn raw(&self, key: &str) -> Option<String> {
        self.backend.read(key).ok().flatten()
    }
}

impl std::fmt::Debug for PersistentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentStore").finish_non_exhaustive()
    }
}
