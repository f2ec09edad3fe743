//! String-keyed persistence substrate.
//!
//! # Responsibility
//! - Define the minimal get/set/delete contract the entry store writes through.
//! - Provide an in-process and a SQLite-backed implementation.
//!
//! # Invariants
//! - `set` replaces the whole value; readers never observe a partial write.
//! - `get` of a missing key is `Ok(None)`, not an error.

use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};

mod sqlite;

pub use sqlite::{SqliteKvStore, KV_SCHEMA_VERSION};

pub type KvResult<T> = Result<T, KvError>;

/// Substrate transport failure.
#[derive(Debug)]
pub enum KvError {
    Sqlite(rusqlite::Error),
    /// The store file was written by a newer table layout.
    SchemaVersion { found: u32, supported: u32 },
    /// The `kv_entries` table exists but cannot hold key/value pairs.
    SchemaShape(String),
    /// Backend-specific failure reported by a host-provided store.
    Backend(String),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaVersion { found, supported } => write!(
                f,
                "key-value store layout version {found} is newer than supported {supported}"
            ),
            Self::SchemaShape(message) => write!(f, "key-value store layout mismatch: {message}"),
            Self::Backend(message) => write!(f, "key-value backend failure: {message}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaVersion { .. } | Self::SchemaShape(_) | Self::Backend(_) => None,
        }
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Key-value contract used by `EntryStore` implementations.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> KvResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> KvResult<()>;
    fn delete(&self, key: &str) -> KvResult<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        (**self).delete(key)
    }
}

/// Process-local store, used for previews and tests.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> KvResult<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}
