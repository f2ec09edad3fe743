//! Travel diary domain model.
//!
//! # Responsibility
//! - Define the persisted journal record (`TravelEntry`) and its identity.
//! - Define transient capture state that lives only inside a workflow.
//!
//! # Invariants
//! - A `TravelEntry` that passes `validate()` has non-empty id, image URI
//!   and address.
//! - `PendingCapture` is never serialized.

pub mod capture;
pub mod entry;
