//! Repository layer over the key-value substrate.
//!
//! # Responsibility
//! - Own the durable representation of the travel entry list.
//! - Keep serialization details out of workflow and view orchestration.
//!
//! # Invariants
//! - Write paths validate entries before touching the substrate.
//! - Read paths drop records that fail schema validation instead of
//!   trusting them.

pub mod entry_store;
