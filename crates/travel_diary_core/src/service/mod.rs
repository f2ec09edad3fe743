//! Use-case services for the capture screen and the entry list.
//!
//! # Responsibility
//! - Orchestrate device providers and the entry store into screen-level
//!   operations.
//! - Keep host/FFI layers free of sequencing rules.

pub mod entry_list;
pub mod entry_save;
pub mod entry_workflow;
