//! Statistics aggregator.
//!
//! # Invariants
//! - Read-only: computing statistics never mutates counters, batches or labels.
//! - One tally pass plus one counter read per call, cheap enough for polling.
//! - The tally and the counters are separate reads. The tally is taken first
//!   and counters only ever advance before labels are written, so
//!   `labels_by_type[t] <= last_numbers[t]` holds in every result. The
//!   difference covers reservations still in flight and lost ones.

use crate::error::LabelResult;
use crate::model::stats::LabelStats;
use crate::repo::batch_repo::BatchRepository;
use crate::repo::sequence_repo::SequenceRepository;
use log::warn;

/// Derived-view service over the batch store and the counters.
pub struct StatsService<S: SequenceRepository, B: BatchRepository> {
    sequences: S,
    batches: B,
}

impl<S: SequenceRepository, B: BatchRepository> StatsService<S, B> {
    pub fn new(sequences: S, batches: B) -> Self {
        Self { sequences, batches }
    }

    /// Recomputes statistics from the stores.
    pub fn compute(&self) -> LabelResult<LabelStats> {
        // Order matters: see the module invariants.
        let tally = self.batches.tally()?;
        let last_numbers = self.sequences.last_numbers()?;

        Ok(LabelStats {
            total_labels: tally.total_labels,
            printed_labels: tally.printed_labels,
            pending_labels: tally.total_labels.saturating_sub(tally.printed_labels),
            total_batches: tally.total_batches,
            printed_batches: tally.printed_batches,
            labels_by_type: tally.labels_by_type,
            last_numbers,
        })
    }

    /// Like [`StatsService::compute`], degrading any failure to `None`.
    pub fn snapshot(&self) -> Option<LabelStats> {
        match self.compute() {
            Ok(stats) => Some(stats),
            Err(err) => {
                warn!(
                    "event=stats module=stats status=degraded error_kind={} error={}",
                    err.kind(),
                    err
                );
                None
            }
        }
    }
}
