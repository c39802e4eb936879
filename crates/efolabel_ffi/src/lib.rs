//! Flutter-facing bindings for the EFO label core.

pub mod api;
