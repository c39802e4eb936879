//! Derived statistics view.

use crate::model::label_type::LabelType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Counts derived from the batch store and the sequence counters.
///
/// `labels_by_type` only contains types with at least one issued label;
/// `last_numbers` only contains types whose counter was ever advanced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelStats {
    pub total_labels: u64,
    pub printed_labels: u64,
    pub pending_labels: u64,
    pub total_batches: u64,
    pub printed_batches: u64,
    pub labels_by_type: BTreeMap<LabelType, u64>,
    pub last_numbers: BTreeMap<LabelType, u64>,
}
