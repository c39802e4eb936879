//! Sequence counter contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the last issued number per label type.
//! - Advance a counter as one indivisible read-modify-write.
//!
//! # Invariants
//! - Counters never decrease.
//! - `advance` is serialized per database: the read and the write happen
//!   inside one `BEGIN IMMEDIATE` transaction, so two connections can never
//!   observe the same prior value.

use crate::model::label_type::LabelType;
use crate::repo::{parse_label_type, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

/// Repository interface for per-type sequence counters.
pub trait SequenceRepository {
    /// Advances the counter of `label_type` by `quantity` and returns the
    /// value it held before the advance (0 when never issued).
    fn advance(&self, label_type: LabelType, quantity: u32, now_ms: i64) -> RepoResult<u64>;
    /// Returns the current counter value (0 when never issued).
    fn last_number(&self, label_type: LabelType) -> RepoResult<u64>;
    /// Returns every counter that was ever advanced.
    fn last_numbers(&self) -> RepoResult<BTreeMap<LabelType, u64>>;
}

impl<T: SequenceRepository + ?Sized> SequenceRepository for &T {
    fn advance(&self, label_type: LabelType, quantity: u32, now_ms: i64) -> RepoResult<u64> {
        (**self).advance(label_type, quantity, now_ms)
    }

    fn last_number(&self, label_type: LabelType) -> RepoResult<u64> {
        (**self).last_number(label_type)
    }

    fn last_numbers(&self) -> RepoResult<BTreeMap<LabelType, u64>> {
        (**self).last_numbers()
    }
}

/// SQLite-backed sequence counters.
pub struct SqliteSequenceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSequenceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SequenceRepository for SqliteSequenceRepository<'_> {
    fn advance(&self, label_type: LabelType, quantity: u32, now_ms: i64) -> RepoResult<u64> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let last = read_counter(&tx, label_type)?;
        let next = last
            .checked_add(u64::from(quantity))
            .filter(|value| i64::try_from(*value).is_ok())
            .ok_or(RepoError::CounterOverflow(label_type))?;

        tx.execute(
            "INSERT INTO sequence_counters (label_type, last_number, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (label_type) DO UPDATE SET
                last_number = excluded.last_number,
                updated_at = excluded.updated_at;",
            params![label_type.as_str(), next as i64, now_ms],
        )?;
        tx.commit()?;

        Ok(last)
    }

    fn last_number(&self, label_type: LabelType) -> RepoResult<u64> {
        read_counter(self.conn, label_type)
    }

    fn last_numbers(&self) -> RepoResult<BTreeMap<LabelType, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT label_type, last_number FROM sequence_counters;")?;
        let mut rows = stmt.query([])?;
        let mut counters = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let type_text: String = row.get("label_type")?;
            let label_type = parse_label_type(&type_text, "sequence_counters.label_type")?;
            let value: i64 = row.get("last_number")?;
            counters.insert(label_type, counter_from_db(value)?);
        }
        Ok(counters)
    }
}

fn read_counter(conn: &Connection, label_type: LabelType) -> RepoResult<u64> {
    let value: Option<i64> = conn
        .query_row(
            "SELECT last_number FROM sequence_counters WHERE label_type = ?1;",
            [label_type.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    value.map_or(Ok(0), counter_from_db)
}

fn counter_from_db(value: i64) -> RepoResult<u64> {
    u64::try_from(value).map_err(|_| {
        RepoError::InvalidData(format!(
            "negative counter `{value}` in sequence_counters.last_number"
        ))
    })
}
