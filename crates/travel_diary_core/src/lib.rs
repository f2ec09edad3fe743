//! Core domain logic for the travel diary client.
//!
//! Captures a photo, resolves the device location to an address and keeps
//! the pairing as a journal entry. Device services (camera, geolocation,
//! notifications) are host-implemented traits from [`device`].

pub mod capture;
pub mod config;
pub mod device;
pub mod kv;
pub mod location;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod service;

pub use capture::{CaptureError, CaptureProvider, ImageRef};
pub use config::CoreConfig;
pub use kv::{
    KeyValueStore, KvError, KvResult, MemoryKvStore, SqliteKvStore, KV_SCHEMA_VERSION,
};
pub use location::{
    format_address, AddressResolver, LocationError, LocationProvider, ResolutionError,
};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::capture::{AddressState, Coordinates, PendingCapture};
pub use model::entry::{EntryId, EntryValidationError, TravelEntry};
pub use notify::{NotificationError, NotificationGateway, NotificationOutbox, Registration};
pub use repo::entry_store::{EntryStore, KvEntryStore, StoreError, StoreResult, ENTRIES_KEY};
pub use service::entry_list::EntryListView;
pub use service::entry_save::save_confirmed;
pub use service::entry_workflow::{EntryWorkflow, WorkflowAction, WorkflowError, WorkflowState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
