//! Entry list view model.
//!
//! # Responsibility
//! - Hold the newest-first list shown on the home screen.
//! - Reload from the store whenever the view becomes visible.
//! - Apply removals optimistically before writing them through.
//!
//! # Invariants
//! - A failed removal keeps the local removal; the next `activate()`
//!   restores the last persisted list.

use crate::model::entry::{EntryId, TravelEntry};
use crate::repo::entry_store::{EntryStore, StoreResult};
use log::{info, warn};

pub struct EntryListView<S: EntryStore> {
    store: S,
    entries: Vec<TravelEntry>,
}

impl<S: EntryStore> EntryListView<S> {
    /// Creates an empty view; call `activate` to load.
    pub fn new(store: S) -> Self {
        Self {
            store,
            entries: Vec::new(),
        }
    }

    /// Navigation activation signal: re-reads the store.
    pub fn activate(&mut self) -> &[TravelEntry] {
        self.entries = self.store.list();
        info!(
            "event=entry_list_activate module=entry_list status=ok count={}",
            self.entries.len()
        );
        &self.entries
    }

    pub fn entries(&self) -> &[TravelEntry] {
        &self.entries
    }

    /// `true` renders the "No entries yet" placeholder.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes one entry locally, then from the store.
    ///
    /// # Errors
    /// Returns the storage failure; the local list is not rolled back.
    pub fn remove(&mut self, id: &EntryId) -> StoreResult<()> {
        self.entries.retain(|entry| &entry.id != id);
        self.store.remove(id).inspect_err(|err| {
            warn!("event=entry_list_remove module=entry_list status=error error={err}");
        })
    }
}
