//! Flutter-facing bindings for the travel diary core.

pub mod api;
