//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose list/save/remove of travel entries to Dart via FRB.
//! - Hand the saved-entry notification back to the host for delivery.
//! - Translate core errors into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Save runs the same confirmed-save step as the capture workflow, so a
//!   partial capture is never persisted from this layer either.

use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use travel_diary_core::device::NotificationContent;
use travel_diary_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, save_confirmed,
    AddressState, CoreConfig, EntryId, EntryStore, KvEntryStore, NotificationGateway,
    NotificationOutbox, PendingCapture, SqliteKvStore, StoreError, TravelEntry,
};

static CONFIG: OnceLock<CoreConfig> = OnceLock::new();

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error`, case-insensitive.
/// - `log_dir`: absolute directory for rolling log files.
/// - Idempotent for identical arguments.
/// - Returns an empty string on success, the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Travel entry as rendered by the home list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryItem {
    pub id: String,
    pub image_uri: String,
    pub address: String,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryActionResponse {
    pub ok: bool,
    /// Affected entry id on success.
    pub entry_id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl EntryActionResponse {
    fn success(message: impl Into<String>, entry_id: String) -> Self {
        Self {
            ok: true,
            entry_id: Some(entry_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entry_id: None,
            message: message.into(),
        }
    }
}

/// Local notification the host must post after a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedNotification {
    pub title: String,
    pub body: String,
    pub sound: Option<String>,
}

/// Save response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySaveResponse {
    pub ok: bool,
    /// New entry id on success.
    pub entry_id: Option<String>,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
    /// Set on success only.
    pub notification: Option<SavedNotification>,
}

impl EntrySaveResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            entry_id: None,
            message: message.into(),
            notification: None,
        }
    }
}

/// Lists stored entries newest-first.
///
/// # FFI contract
/// - Never fails: an unreadable database or corrupt record yields `[]`.
#[flutter_rust_bridge::frb(sync)]
pub fn entries_list() -> Vec<EntryItem> {
    match with_entry_store(|store| Ok(store.list())) {
        Ok(entries) => entries.into_iter().map(to_entry_item).collect(),
        Err(err) => {
            warn!("event=ffi_entries_list module=ffi status=error error={err}");
            Vec::new()
        }
    }
}

/// Saves one confirmed capture as a new entry.
///
/// # FFI contract
/// - `address` must be the resolved, non-empty address the user confirmed.
/// - On success `notification` carries the "entry saved" notification.
///   The host must post it through its local notification plugin; Rust
///   never reaches the platform notifier directly.
/// - On failure nothing was stored and `notification` is `None`.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_save(image_uri: String, address: String) -> EntrySaveResponse {
    let pending = PendingCapture {
        image_uri: image_uri.trim().to_string(),
        address: AddressState::Resolved(address.trim().to_string()),
        error_message: None,
    };
    let outbox = NotificationOutbox::new();
    let gateway = NotificationGateway::new(&outbox, config().project_id.clone());

    match with_entry_store(|store| save_confirmed(store, &gateway, &pending)) {
        Ok(entry) => EntrySaveResponse {
            ok: true,
            entry_id: Some(entry.id.to_string()),
            message: "Entry saved.".to_string(),
            notification: outbox.take().into_iter().next().map(to_saved_notification),
        },
        Err(err) => EntrySaveResponse::failure(format!("entry_save failed: {err}")),
    }
}

/// Removes one entry by id; unknown ids succeed.
#[flutter_rust_bridge::frb(sync)]
pub fn entry_remove(id: String) -> EntryActionResponse {
    let entry_id = EntryId::from(id.trim());
    match with_entry_store(|store| store.remove(&entry_id)) {
        Ok(()) => EntryActionResponse::success("Entry removed.", entry_id.to_string()),
        Err(err) => EntryActionResponse::failure(format!("entry_remove failed: {err}")),
    }
}

fn config() -> &'static CoreConfig {
    CONFIG.get_or_init(CoreConfig::from_env)
}

fn resolve_db_path() -> PathBuf {
    config().db_path.clone()
}

fn with_entry_store<T>(
    f: impl FnOnce(&KvEntryStore<SqliteKvStore>) -> Result<T, StoreError>,
) -> Result<T, String> {
    let kv = SqliteKvStore::open(resolve_db_path())
        .map_err(|err| format!("diary DB open failed: {err}"))?;
    f(&KvEntryStore::new(kv)).map_err(|err| err.to_string())
}

fn to_saved_notification(content: NotificationContent) -> SavedNotification {
    SavedNotification {
        title: content.title,
        body: content.body,
        sound: content.sound,
    }
}

fn to_entry_item(entry: TravelEntry) -> EntryItem {
    EntryItem {
        id: entry.id.to_string(),
        image_uri: entry.image_uri,
        address: entry.address,
    }
}
