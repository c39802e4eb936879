//! Generate / mark-printed orchestration.
//!
//! # Responsibility
//! - Chain code reservation and batch persistence into one use-case.
//! - Report failures as explicit errors, never as partial successes.
//!
//! # Invariants
//! - Reservation always precedes persistence. When persistence fails the
//!   reserved block stays consumed and shows up as a numbering gap.

use crate::error::{LabelError, LabelResult};
use crate::model::batch::BatchId;
use crate::repo::batch_repo::{BatchRepository, MarkPrintedOutcome};
use crate::repo::sequence_repo::SequenceRepository;
use crate::service::allocator::SequenceAllocator;
use crate::service::batch_service::{BatchService, GeneratedBatch};
use log::error;

/// Use-case service for the generate and print flows.
pub struct LabelService<S: SequenceRepository, B: BatchRepository> {
    allocator: SequenceAllocator<S>,
    batches: BatchService<B>,
}

impl<S: SequenceRepository, B: BatchRepository> LabelService<S, B> {
    pub fn new(sequences: S, batches: B) -> Self {
        Self {
            allocator: SequenceAllocator::new(sequences),
            batches: BatchService::new(batches),
        }
    }

    pub fn allocator(&self) -> &SequenceAllocator<S> {
        &self.allocator
    }

    pub fn batches(&self) -> &BatchService<B> {
        &self.batches
    }

    /// Reserves `quantity` codes for `label_type_id` and persists them as a
    /// new batch.
    ///
    /// # Errors
    /// - `InvalidQuantity` / `UnknownLabelType` before anything is reserved.
    /// - `Persistence` when either step fails; if it was the batch write,
    ///   the reserved codes are lost and a retry reserves a fresh block.
    pub fn generate(
        &self,
        label_type_id: &str,
        quantity: u32,
        created_by: Option<&str>,
    ) -> LabelResult<GeneratedBatch> {
        let label_type_id = label_type_id.trim();
        if label_type_id.is_empty() {
            return Err(LabelError::InvalidInput(
                "label type is required".to_string(),
            ));
        }

        let reservation = self.allocator.reserve(label_type_id, quantity)?;
        let first = reservation.codes.first().cloned().unwrap_or_default();
        let last = reservation.codes.last().cloned().unwrap_or_default();

        self.batches
            .create_batch(label_type_id, quantity, reservation.codes, created_by)
            .map_err(|err| {
                error!(
                    "event=generate module=label status=error reservation=lost label_type={} first={} last={} error_kind={}",
                    label_type_id,
                    first,
                    last,
                    err.kind()
                );
                err
            })
    }

    /// Marks a generated batch as printed; see [`BatchService::mark_printed`].
    pub fn mark_printed(
        &self,
        batch_id: BatchId,
        printed_by: Option<&str>,
    ) -> LabelResult<MarkPrintedOutcome> {
        self.batches.mark_printed(batch_id, printed_by)
    }
}
