//! Batch store use-case service.
//!
//! # Responsibility
//! - Build a batch and its labels from reserved codes and persist them.
//! - Apply the one-way printed transition.
//! - Expose ordered batch/label reads.
//!
//! # Invariants
//! - Codes must carry the type's prefix and their count must equal the
//!   requested quantity before anything is written.
//! - `mark_printed` on an already printed batch succeeds without changing
//!   any `printed_at`; it is the recovery path after a failed print update.

use crate::error::{LabelError, LabelResult};
use crate::model::batch::{is_valid_quantity, parse_code, BatchId, Label, LabelBatch};
use crate::model::label_type::LabelType;
use crate::repo::batch_repo::{BatchRepository, MarkPrintedOutcome};
use crate::service::{normalize_actor, now_epoch_ms};
use log::{error, info, warn};

/// A persisted batch together with the labels derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedBatch {
    pub batch: LabelBatch,
    /// One label per code, in code order.
    pub labels: Vec<Label>,
}

/// Batch store facade over repository implementations.
pub struct BatchService<R: BatchRepository> {
    repo: R,
}

impl<R: BatchRepository> BatchService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new batch for already reserved `codes`.
    ///
    /// # Errors
    /// - `UnknownLabelType`, `InvalidQuantity`, `InvalidInput` for caller
    ///   mistakes (count mismatch, foreign prefix, malformed code).
    /// - `DuplicateCode` when a code was already issued.
    /// - `Persistence` when the store rejects the write.
    pub fn create_batch(
        &self,
        label_type_id: &str,
        quantity: u32,
        codes: Vec<String>,
        created_by: Option<&str>,
    ) -> LabelResult<GeneratedBatch> {
        let label_type = label_type_id.parse::<LabelType>()?;
        validate_batch_input(label_type, quantity, &codes)?;

        let batch = LabelBatch::new(
            label_type,
            codes,
            now_epoch_ms(),
            normalize_actor(created_by),
        );
        let labels = batch.derive_labels();

        if let Err(err) = self.repo.insert_batch(&batch, &labels) {
            error!(
                "event=create_batch module=batch status=error label_type={} quantity={} error={}",
                label_type, quantity, err
            );
            return Err(err.into());
        }

        info!(
            "event=create_batch module=batch status=ok batch_id={} label_type={} quantity={}",
            batch.id, label_type, quantity
        );
        Ok(GeneratedBatch { batch, labels })
    }

    /// Marks a batch and all of its labels as printed.
    ///
    /// # Errors
    /// - `BatchNotFound` when no batch has this id.
    /// - `Persistence` when the update could not be committed; nothing is
    ///   applied in that case and the call can be repeated.
    pub fn mark_printed(
        &self,
        batch_id: BatchId,
        printed_by: Option<&str>,
    ) -> LabelResult<MarkPrintedOutcome> {
        let printed_by = normalize_actor(printed_by);
        let outcome = self
            .repo
            .mark_batch_printed(batch_id, now_epoch_ms(), printed_by.as_deref())
            .map_err(|err| {
                warn!(
                    "event=mark_printed module=batch status=error batch_id={} error={}",
                    batch_id, err
                );
                LabelError::from(err)
            })?;

        info!(
            "event=mark_printed module=batch status=ok batch_id={} outcome={}",
            batch_id,
            outcome.as_str()
        );
        Ok(outcome)
    }

    /// Parses a boundary batch id and marks it printed.
    pub fn mark_printed_str(
        &self,
        batch_id: &str,
        printed_by: Option<&str>,
    ) -> LabelResult<MarkPrintedOutcome> {
        self.mark_printed(parse_batch_id(batch_id)?, printed_by)
    }

    pub fn get_batch(&self, batch_id: BatchId) -> LabelResult<Option<LabelBatch>> {
        Ok(self.repo.get_batch(batch_id)?)
    }

    /// Labels of one batch in code order; `BatchNotFound` for unknown ids.
    pub fn labels_for_batch(&self, batch_id: BatchId) -> LabelResult<Vec<Label>> {
        if self.repo.get_batch(batch_id)?.is_none() {
            return Err(LabelError::BatchNotFound(batch_id));
        }
        Ok(self.repo.labels_for_batch(batch_id)?)
    }

    /// All batches, most recent first.
    pub fn list_batches(&self) -> LabelResult<Vec<LabelBatch>> {
        Ok(self.repo.list_batches()?)
    }

    /// All labels, most recent first.
    pub fn list_labels(&self) -> LabelResult<Vec<Label>> {
        Ok(self.repo.list_labels()?)
    }
}

/// Parses a batch id received from a caller.
///
/// Blank or non-uuid values are `InvalidInput`.
pub fn parse_batch_id(raw: &str) -> LabelResult<BatchId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LabelError::InvalidInput("batch id is required".to_string()));
    }
    BatchId::parse_str(trimmed).map_err(|_| {
        LabelError::InvalidInput(format!("batch id `{trimmed}` is not a valid uuid"))
    })
}

fn validate_batch_input(label_type: LabelType, quantity: u32, codes: &[String]) -> LabelResult<()> {
    if !is_valid_quantity(quantity) {
        return Err(LabelError::InvalidQuantity {
            requested: i64::from(quantity),
        });
    }
    if codes.len() != quantity as usize {
        return Err(LabelError::InvalidInput(format!(
            "expected {quantity} codes, got {}",
            codes.len()
        )));
    }

    let expected_prefix = label_type.prefix();
    for code in codes {
        match parse_code(code) {
            Some((prefix, _)) if prefix == expected_prefix => {}
            Some((prefix, _)) => {
                return Err(LabelError::InvalidInput(format!(
                    "code `{code}` has prefix `{prefix}`, expected `{expected_prefix}`"
                )));
            }
            None => {
                return Err(LabelError::InvalidInput(format!(
                    "code `{code}` is not of the form {expected_prefix}-NNNNNN"
                )));
            }
        }
    }
    Ok(())
}
