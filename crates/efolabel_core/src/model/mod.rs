//! Domain model for label issuing.
//!
//! # Responsibility
//! - Define the label type registry, issued batches/labels, calibration data
//!   and the statistics view.
//!
//! # Invariants
//! - Codes are `<prefix>-<number>` and never reused once issued.
//! - Batches are immutable apart from the one-way `printed` transition.

pub mod batch;
pub mod coordinates;
pub mod label_type;
pub mod stats;
