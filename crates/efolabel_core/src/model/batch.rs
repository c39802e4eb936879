//! Batch and label domain model.
//!
//! # Responsibility
//! - Define the immutable `LabelBatch` record produced by one generation event.
//! - Define the per-code `Label` record derived from a batch.
//! - Own the code format `<prefix>-<number padded to 6 digits>`.
//!
//! # Invariants
//! - `batch.codes.len() == batch.quantity`.
//! - Labels of a batch are exactly its codes, one each, sharing `created_at`.
//! - `printed` only moves from `false` to `true`.

use crate::model::label_type::LabelType;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum width of the numeric part of a code.
pub const CODE_NUMBER_WIDTH: usize = 6;

/// Smallest quantity one generation event may request.
pub const MIN_BATCH_QUANTITY: u32 = 1;
/// Largest quantity one generation event may request.
pub const MAX_BATCH_QUANTITY: u32 = 1000;

static CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z]+)-(\d{6,})$").expect("valid code regex"));

pub type BatchId = Uuid;
pub type LabelId = Uuid;

/// Persisted record of one generation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelBatch {
    pub id: BatchId,
    pub label_type: LabelType,
    pub quantity: u32,
    /// Ascending, contiguous codes assigned at creation.
    pub codes: Vec<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub created_by: Option<String>,
    pub printed: bool,
}

/// One issued code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    /// Globally unique, never reused.
    pub code: String,
    pub label_type: LabelType,
    pub batch_id: BatchId,
    /// Unix epoch milliseconds, equal to the owning batch's `created_at`.
    pub created_at: i64,
    pub printed: bool,
    pub printed_at: Option<i64>,
    pub printed_by: Option<String>,
}

impl LabelBatch {
    /// Builds an unprinted batch with a fresh id.
    ///
    /// Does not validate; callers go through `BatchService::create_batch`.
    pub fn new(
        label_type: LabelType,
        codes: Vec<String>,
        created_at: i64,
        created_by: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            label_type,
            quantity: codes.len() as u32,
            codes,
            created_at,
            created_by,
            printed: false,
        }
    }

    /// Derives one unprinted label per code, in code order.
    pub fn derive_labels(&self) -> Vec<Label> {
        self.codes
            .iter()
            .map(|code| Label {
                id: Uuid::new_v4(),
                code: code.clone(),
                label_type: self.label_type,
                batch_id: self.id,
                created_at: self.created_at,
                printed: false,
                printed_at: None,
                printed_by: None,
            })
            .collect()
    }
}

/// Formats one code, e.g. `("PC", 13)` -> `PC-000013`.
pub fn format_code(prefix: &str, number: u64) -> String {
    format!("{prefix}-{number:0width$}", width = CODE_NUMBER_WIDTH)
}

/// Splits a code into prefix and sequence number.
///
/// Returns `None` when the value does not match `<PREFIX>-<digits>` with at
/// least six digits.
pub fn parse_code(code: &str) -> Option<(&str, u64)> {
    let caps = CODE_RE.captures(code)?;
    let prefix = caps.get(1)?.as_str();
    let number = caps.get(2)?.as_str().parse::<u64>().ok()?;
    Some((prefix, number))
}

/// Returns whether `quantity` is inside the accepted batch range.
pub fn is_valid_quantity(quantity: u32) -> bool {
    (MIN_BATCH_QUANTITY..=MAX_BATCH_QUANTITY).contains(&quantity)
}
