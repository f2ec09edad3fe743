//! Entry store contract and key-value backed implementation.
//!
//! # Responsibility
//! - List, append and remove travel entries as one ordered JSON record.
//! - Enforce the strict record schema at the deserialization boundary.
//!
//! # Invariants
//! - The list is stored newest-first under a single key (`ENTRIES_KEY`).
//! - Every mutation is read-full-list, mutate, write-full-list; the write is
//!   one `set`, so no partial list is ever observable.
//! - An unparseable payload is never overwritten implicitly.

use crate::kv::{KeyValueStore, KvError};
use crate::model::entry::{EntryId, EntryValidationError, TravelEntry};
use log::{error, info, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Substrate key holding the serialized entry list.
pub const ENTRIES_KEY: &str = "entries";

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage failure surfaced by entry store operations.
#[derive(Debug)]
pub enum StoreError {
    Validation(EntryValidationError),
    DuplicateId(EntryId),
    Kv(KvError),
    /// Stored payload is not a JSON array of records.
    CorruptData(String),
    Encode(serde_json::Error),
}

impl StoreError {
    /// Short message safe to show to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::DuplicateId(_) => "This entry cannot be saved.",
            Self::CorruptData(_) => "Saved entries could not be read.",
            Self::Kv(_) | Self::Encode(_) => "Could not access saved entries.",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateId(id) => write!(f, "entry id already stored: {id}"),
            Self::Kv(err) => write!(f, "{err}"),
            Self::CorruptData(message) => write!(f, "stored entry list is corrupt: {message}"),
            Self::Encode(err) => write!(f, "failed to encode entry list: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Kv(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::DuplicateId(_) | Self::CorruptData(_) => None,
        }
    }
}

impl From<EntryValidationError> for StoreError {
    fn from(value: EntryValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Kv(value)
    }
}

/// Durable mapping from entry id to entry record.
pub trait EntryStore {
    /// Lists entries newest-first; absence and corruption both yield empty.
    fn list(&self) -> Vec<TravelEntry>;
    /// Lists entries newest-first, reporting unreadable storage.
    fn try_list(&self) -> StoreResult<Vec<TravelEntry>>;
    /// Prepends one validated entry.
    fn append(&self, entry: &TravelEntry) -> StoreResult<()>;
    /// Removes every entry with `id`, preserving the order of the rest.
    fn remove(&self, id: &EntryId) -> StoreResult<()>;
}

impl<T: EntryStore + ?Sized> EntryStore for &T {
    fn list(&self) -> Vec<TravelEntry> {
        (**self).list()
    }

    fn try_list(&self) -> StoreResult<Vec<TravelEntry>> {
        (**self).try_list()
    }

    fn append(&self, entry: &TravelEntry) -> StoreResult<()> {
        (**self).append(entry)
    }

    fn remove(&self, id: &EntryId) -> StoreResult<()> {
        (**self).remove(id)
    }
}

/// Entry store persisting the whole list under `ENTRIES_KEY`.
pub struct KvEntryStore<S: KeyValueStore> {
    kv: S,
}

impl<S: KeyValueStore> KvEntryStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    /// Deletes the stored list, including a corrupt one.
    pub fn clear(&self) -> StoreResult<()> {
        self.kv.delete(ENTRIES_KEY)?;
        info!("event=entries_clear module=store status=ok");
        Ok(())
    }

    fn write_all(&self, entries: &[TravelEntry]) -> StoreResult<()> {
        let payload = serde_json::to_string(entries).map_err(StoreError::Encode)?;
        self.kv.set(ENTRIES_KEY, &payload)?;
        Ok(())
    }
}

impl<S: KeyValueStore> EntryStore for KvEntryStore<S> {
    fn list(&self) -> Vec<TravelEntry> {
        match self.try_list() {
            Ok(entries) => entries,
            Err(err) => {
                error!(
                    "event=entries_load module=store status=error fallback=empty error={err}"
                );
                Vec::new()
            }
        }
    }

    fn try_list(&self) -> StoreResult<Vec<TravelEntry>> {
        match self.kv.get(ENTRIES_KEY)? {
            Some(payload) => decode_entries(&payload),
            None => Ok(Vec::new()),
        }
    }

    fn append(&self, entry: &TravelEntry) -> StoreResult<()> {
        entry.validate()?;

        let mut entries = self.try_list()?;
        if entries.iter().any(|existing| existing.id == entry.id) {
            return Err(StoreError::DuplicateId(entry.id.clone()));
        }
        entries.insert(0, entry.clone());
        self.write_all(&entries)?;

        info!(
            "event=entry_append module=store status=ok count={} image_uri_len={} address_len={}",
            entries.len(),
            entry.image_uri.len(),
            entry.address.len()
        );
        Ok(())
    }

    fn remove(&self, id: &EntryId) -> StoreResult<()> {
        let mut entries = self.try_list()?;
        let before = entries.len();
        entries.retain(|entry| &entry.id != id);
        self.write_all(&entries)?;

        info!(
            "event=entry_remove module=store status=ok removed={} count={}",
            before - entries.len(),
            entries.len()
        );
        Ok(())
    }
}

/// Decodes the stored payload, dropping records that fail the schema.
///
/// Only a payload that is not a JSON array is an error. Later duplicates of
/// an id are dropped so the newest record wins.
fn decode_entries(payload: &str) -> StoreResult<Vec<TravelEntry>> {
    let records: Vec<Value> = serde_json::from_str(payload)
        .map_err(|err| StoreError::CorruptData(err.to_string()))?;

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    for (index, record) in records.into_iter().enumerate() {
        let entry = match serde_json::from_value::<TravelEntry>(record) {
            Ok(entry) => entry,
            Err(err) => {
                dropped += 1;
                warn!(
                    "event=entry_decode module=store status=dropped index={index} reason=schema error={err}"
                );
                continue;
            }
        };
        if let Err(err) = entry.validate() {
            dropped += 1;
            warn!(
                "event=entry_decode module=store status=dropped index={index} reason=invalid error={err}"
            );
            continue;
        }
        if !seen.insert(entry.id.clone()) {
            dropped += 1;
            warn!(
                "event=entry_decode module=store status=dropped index={index} reason=duplicate_id"
            );
            continue;
        }
        entries.push(entry);
    }

    if dropped > 0 {
        warn!(
            "event=entries_load module=store status=partial kept={} dropped={dropped}",
            entries.len()
        );
    }
    Ok(entries)
}
