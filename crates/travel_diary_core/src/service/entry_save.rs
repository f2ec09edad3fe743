//! Confirmed save shared by the capture workflow and the FFI bridge.
//!
//! # Invariants
//! - Nothing is written unless the capture has an image and a resolved,
//!   non-empty address.
//! - The saved notification is attempted exactly once per successful append
//!   and never after a failed one.

use crate::device::NotificationService;
use crate::model::capture::PendingCapture;
use crate::model::entry::{EntryValidationError, TravelEntry};
use crate::notify::NotificationGateway;
use crate::repo::entry_store::{EntryStore, StoreResult};
use log::{info, warn};

/// Persists `pending` as a new entry, then posts the saved notification.
///
/// # Errors
/// - `StoreError::Validation` when the capture is not confirmable.
/// - Any store error from the append; the notifier is not touched.
pub fn save_confirmed<S, N>(
    store: &S,
    notifier: &NotificationGateway<N>,
    pending: &PendingCapture,
) -> StoreResult<TravelEntry>
where
    S: EntryStore,
    N: NotificationService,
{
    let address = pending
        .resolved_address()
        .ok_or(EntryValidationError::EmptyAddress)?;
    let entry = TravelEntry::new(pending.image_uri.as_str(), address)?;

    if let Err(err) = store.append(&entry) {
        warn!("event=entry_save module=service status=error error={err}");
        return Err(err);
    }
    info!("event=entry_save module=service status=ok entry_id={}", entry.id);

    notifier.notify_saved();
    Ok(entry)
}
