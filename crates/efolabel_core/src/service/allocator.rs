//! Sequence allocator.
//!
//! # Responsibility
//! - Reserve the next contiguous block of codes for a label type.
//! - Own every mutation of the per-type counters.
//!
//! # Invariants
//! - A reservation of `n` codes for a type whose counter is `k` yields the
//!   numbers `k+1 ..= k+n` and leaves the counter at `k+n`.
//! - The counter advance is durable before `reserve` returns. A block is
//!   consumed even if the caller later fails to persist it; lost blocks are
//!   never handed out again.

use crate::error::{LabelError, LabelResult};
use crate::model::batch::{format_code, is_valid_quantity};
use crate::model::label_type::LabelType;
use crate::repo::sequence_repo::SequenceRepository;
use crate::service::now_epoch_ms;
use log::{error, info};

/// One granted block of codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub label_type: LabelType,
    /// Counter value immediately before the reservation.
    pub previous_last: u64,
    /// Ascending codes `previous_last + 1 ..= previous_last + quantity`.
    pub codes: Vec<String>,
}

impl Reservation {
    pub fn quantity(&self) -> u32 {
        self.codes.len() as u32
    }

    /// Counter value after the reservation.
    pub fn last(&self) -> u64 {
        self.previous_last + self.codes.len() as u64
    }
}

/// Converts an untrusted boundary quantity into a checked batch size.
pub fn checked_quantity(requested: i64) -> LabelResult<u32> {
    u32::try_from(requested)
        .ok()
        .filter(|quantity| is_valid_quantity(*quantity))
        .ok_or(LabelError::InvalidQuantity { requested })
}

/// Use-case service owning the sequence counters.
pub struct SequenceAllocator<R: SequenceRepository> {
    repo: R,
}

impl<R: SequenceRepository> SequenceAllocator<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Reserves `quantity` codes for the type named `label_type_id`.
    ///
    /// # Errors
    /// - `UnknownLabelType` when the id is not in the registry.
    /// - `InvalidQuantity` when `quantity` is outside `1..=1000`.
    /// - `Persistence` when the counter could not be advanced.
    pub fn reserve(&self, label_type_id: &str, quantity: u32) -> LabelResult<Reservation> {
        let label_type = label_type_id.parse::<LabelType>()?;
        self.reserve_type(label_type, quantity)
    }

    /// Typed variant of [`SequenceAllocator::reserve`].
    pub fn reserve_type(&self, label_type: LabelType, quantity: u32) -> LabelResult<Reservation> {
        if !is_valid_quantity(quantity) {
            return Err(LabelError::InvalidQuantity {
                requested: i64::from(quantity),
            });
        }

        let previous_last = match self.repo.advance(label_type, quantity, now_epoch_ms()) {
            Ok(value) => value,
            Err(err) => {
                error!(
                    "event=reserve module=allocator status=error label_type={} quantity={} error={}",
                    label_type, quantity, err
                );
                return Err(err.into());
            }
        };

        let prefix = label_type.prefix();
        let codes: Vec<String> = (1..=u64::from(quantity))
            .map(|offset| format_code(prefix, previous_last + offset))
            .collect();

        info!(
            "event=reserve module=allocator status=ok label_type={} quantity={} first={} last={}",
            label_type,
            quantity,
            codes.first().map_or("", String::as_str),
            codes.last().map_or("", String::as_str)
        );

        Ok(Reservation {
            label_type,
            previous_last,
            codes,
        })
    }

    /// Current counter value for a type (0 when never issued).
    pub fn last_number(&self, label_type: LabelType) -> LabelResult<u64> {
        Ok(self.repo.last_number(label_type)?)
    }

    /// Code the next reservation for `label_type` would start with.
    ///
    /// Read-only; a concurrent reservation may claim it first.
    pub fn next_code_preview(&self, label_type: LabelType) -> LabelResult<String> {
        let last = self.repo.last_number(label_type)?;
        Ok(format_code(label_type.prefix(), last + 1))
    }
}
