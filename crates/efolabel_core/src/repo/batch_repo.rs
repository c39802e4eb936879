//! Batch/label repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist a batch together with its labels in one transaction.
//! - Apply the one-way printed transition to a batch and its labels.
//! - Provide list and tally reads for the use-case layer.
//!
//! # Invariants
//! - Readers never observe a batch without its labels, or labels without
//!   their batch.
//! - `mark_batch_printed` only touches labels still unprinted, so a label's
//!   `printed_at` is written once.
//! - Lists are ordered `created_at DESC`; equal timestamps keep insertion
//!   order.

use crate::model::batch::{BatchId, Label, LabelBatch};
use crate::model::label_type::LabelType;
use crate::repo::{bool_to_int, int_to_bool, parse_label_type, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

const BATCH_SELECT_SQL: &str = "SELECT
    id,
    label_type,
    quantity,
    codes,
    created_at,
    created_by,
    printed
FROM label_batches";

const LABEL_SELECT_SQL: &str = "SELECT
    id,
    code,
    label_type,
    batch_id,
    created_at,
    printed,
    printed_at,
    printed_by
FROM labels";

/// Result of applying the printed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkPrintedOutcome {
    /// The batch moved to printed; `labels` rows were updated with it.
    Marked { labels: usize },
    /// Batch and all labels were already printed; nothing changed.
    AlreadyPrinted,
    /// The batch was printed but `labels` rows lagged and were brought forward.
    Repaired { labels: usize },
}

impl MarkPrintedOutcome {
    pub(crate) fn from_parts(batch_was_printed: bool, labels_changed: usize) -> Self {
        match (batch_was_printed, labels_changed) {
            (false, labels) => Self::Marked { labels },
            (true, 0) => Self::AlreadyPrinted,
            (true, labels) => Self::Repaired { labels },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Marked { .. } => "marked",
            Self::AlreadyPrinted => "already_printed",
            Self::Repaired { .. } => "repaired",
        }
    }
}

/// Counts gathered in one pass over batches and labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTally {
    pub total_labels: u64,
    pub printed_labels: u64,
    pub total_batches: u64,
    pub printed_batches: u64,
    pub labels_by_type: BTreeMap<LabelType, u64>,
}

/// Repository interface for batches and their labels.
pub trait BatchRepository {
    /// Persists `batch` and `labels` atomically.
    ///
    /// Fails with `DuplicateCode` when any code was issued before.
    fn insert_batch(&self, batch: &LabelBatch, labels: &[Label]) -> RepoResult<()>;
    fn get_batch(&self, id: BatchId) -> RepoResult<Option<LabelBatch>>;
    fn list_batches(&self) -> RepoResult<Vec<LabelBatch>>;
    fn list_labels(&self) -> RepoResult<Vec<Label>>;
    /// Labels of one batch in code order.
    fn labels_for_batch(&self, id: BatchId) -> RepoResult<Vec<Label>>;
    /// Marks the batch and its unprinted labels as printed, atomically.
    ///
    /// Fails with `NotFound` when the batch does not exist.
    fn mark_batch_printed(
        &self,
        id: BatchId,
        printed_at: i64,
        printed_by: Option<&str>,
    ) -> RepoResult<MarkPrintedOutcome>;
    fn tally(&self) -> RepoResult<LabelTally>;
}

impl<T: BatchRepository + ?Sized> BatchRepository for &T {
    fn insert_batch(&self, batch: &LabelBatch, labels: &[Label]) -> RepoResult<()> {
        (**self).insert_batch(batch, labels)
    }

    fn get_batch(&self, id: BatchId) -> RepoResult<Option<LabelBatch>> {
        (**self).get_batch(id)
    }

    fn list_batches(&self) -> RepoResult<Vec<LabelBatch>> {
        (**self).list_batches()
    }

    fn list_labels(&self) -> RepoResult<Vec<Label>> {
        (**self).list_labels()
    }

    fn labels_for_batch(&self, id: BatchId) -> RepoResult<Vec<Label>> {
        (**self).labels_for_batch(id)
    }

    fn mark_batch_printed(
        &self,
        id: BatchId,
        printed_at: i64,
        printed_by: Option<&str>,
    ) -> RepoResult<MarkPrintedOutcome> {
        (**self).mark_batch_printed(id, printed_at, printed_by)
    }

    fn tally(&self) -> RepoResult<LabelTally> {
        (**self).tally()
    }
}

/// SQLite-backed batch repository.
pub struct SqliteBatchRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBatchRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BatchRepository for SqliteBatchRepository<'_> {
    fn insert_batch(&self, batch: &LabelBatch, labels: &[Label]) -> RepoResult<()> {
        let codes_json = serde_json::to_string(&batch.codes)?;
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        tx.execute(
            "INSERT INTO label_batches (
                id,
                label_type,
                quantity,
                codes,
                created_at,
                created_by,
                printed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                batch.id.to_string(),
                batch.label_type.as_str(),
                batch.quantity,
                codes_json,
                batch.created_at,
                batch.created_by.as_deref(),
                bool_to_int(batch.printed),
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO labels (
                    id,
                    code,
                    label_type,
                    batch_id,
                    created_at,
                    printed,
                    printed_at,
                    printed_by
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            )?;
            for label in labels {
                stmt.execute(params![
                    label.id.to_string(),
                    label.code.as_str(),
                    label.label_type.as_str(),
                    label.batch_id.to_string(),
                    label.created_at,
                    bool_to_int(label.printed),
                    label.printed_at,
                    label.printed_by.as_deref(),
                ])
                .map_err(|err| map_unique_violation(err, &label.code))?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn get_batch(&self, id: BatchId) -> RepoResult<Option<LabelBatch>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BATCH_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_batch_row(row)?));
        }
        Ok(None)
    }

    fn list_batches(&self) -> RepoResult<Vec<LabelBatch>> {
        let mut stmt = self.conn.prepare(&format!(
            "{BATCH_SELECT_SQL} ORDER BY created_at DESC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut batches = Vec::new();
        while let Some(row) = rows.next()? {
            batches.push(parse_batch_row(row)?);
        }
        Ok(batches)
    }

    fn list_labels(&self) -> RepoResult<Vec<Label>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LABEL_SELECT_SQL} ORDER BY created_at DESC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut labels = Vec::new();
        while let Some(row) = rows.next()? {
            labels.push(parse_label_row(row)?);
        }
        Ok(labels)
    }

    fn labels_for_batch(&self, id: BatchId) -> RepoResult<Vec<Label>> {
        let mut stmt = self.conn.prepare(&format!(
            "{LABEL_SELECT_SQL} WHERE batch_id = ?1 ORDER BY rowid ASC;"
        ))?;
        let mut rows = stmt.query([id.to_string()])?;
        let mut labels = Vec::new();
        while let Some(row) = rows.next()? {
            labels.push(parse_label_row(row)?);
        }
        Ok(labels)
    }

    fn mark_batch_printed(
        &self,
        id: BatchId,
        printed_at: i64,
        printed_by: Option<&str>,
    ) -> RepoResult<MarkPrintedOutcome> {
        let id_text = id.to_string();
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let printed: Option<i64> = tx
            .query_row(
                "SELECT printed FROM label_batches WHERE id = ?1;",
                [id_text.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(printed) = printed else {
            return Err(RepoError::NotFound(id));
        };
        let batch_was_printed = int_to_bool(printed, "label_batches.printed")?;

        if !batch_was_printed {
            tx.execute(
                "UPDATE label_batches SET printed = 1 WHERE id = ?1;",
                [id_text.as_str()],
            )?;
        }
        let labels_changed = tx.execute(
            "UPDATE labels
             SET
                printed = 1,
                printed_at = ?2,
                printed_by = ?3
             WHERE batch_id = ?1
               AND printed = 0;",
            params![id_text.as_str(), printed_at, printed_by],
        )?;

        tx.commit()?;
        Ok(MarkPrintedOutcome::from_parts(
            batch_was_printed,
            labels_changed,
        ))
    }

    fn tally(&self) -> RepoResult<LabelTally> {
        // Deferred read transaction: all three reads see one snapshot.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;

        let (total_labels, printed_labels): (i64, i64) = tx.query_row(
            "SELECT COUNT(*), COALESCE(SUM(printed), 0) FROM labels;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let (total_batches, printed_batches): (i64, i64) = tx.query_row(
            "SELECT COUNT(*), COALESCE(SUM(printed), 0) FROM label_batches;",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut labels_by_type = BTreeMap::new();
        {
            let mut stmt =
                tx.prepare("SELECT label_type, COUNT(*) FROM labels GROUP BY label_type;")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let type_text: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                labels_by_type.insert(
                    parse_label_type(&type_text, "labels.label_type")?,
                    count_from_db(count)?,
                );
            }
        }
        tx.commit()?;

        Ok(LabelTally {
            total_labels: count_from_db(total_labels)?,
            printed_labels: count_from_db(printed_labels)?,
            total_batches: count_from_db(total_batches)?,
            printed_batches: count_from_db(printed_batches)?,
            labels_by_type,
        })
    }
}

fn parse_batch_row(row: &Row<'_>) -> RepoResult<LabelBatch> {
    let id_text: String = row.get("id")?;
    let type_text: String = row.get("label_type")?;
    let codes_text: String = row.get("codes")?;
    let codes: Vec<String> = serde_json::from_str(&codes_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid codes array in label_batches.codes: {err}"))
    })?;
    let quantity: u32 = row.get("quantity")?;
    if codes.len() != quantity as usize {
        return Err(RepoError::InvalidData(format!(
            "batch `{id_text}` holds {} codes but quantity {quantity}",
            codes.len()
        )));
    }

    Ok(LabelBatch {
        id: parse_uuid(&id_text, "label_batches.id")?,
        label_type: parse_label_type(&type_text, "label_batches.label_type")?,
        quantity,
        codes,
        created_at: row.get("created_at")?,
        created_by: row.get("created_by")?,
        printed: int_to_bool(row.get("printed")?, "label_batches.printed")?,
    })
}

fn parse_label_row(row: &Row<'_>) -> RepoResult<Label> {
    let id_text: String = row.get("id")?;
    let type_text: String = row.get("label_type")?;
    let batch_text: String = row.get("batch_id")?;

    Ok(Label {
        id: parse_uuid(&id_text, "labels.id")?,
        code: row.get("code")?,
        label_type: parse_label_type(&type_text, "labels.label_type")?,
        batch_id: parse_uuid(&batch_text, "labels.batch_id")?,
        created_at: row.get("created_at")?,
        printed: int_to_bool(row.get("printed")?, "labels.printed")?,
        printed_at: row.get("printed_at")?,
        printed_by: row.get("printed_by")?,
    })
}

fn map_unique_violation(err: rusqlite::Error, code: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateCode(code.to_string())
        }
        _ => err.into(),
    }
}

fn count_from_db(value: i64) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative aggregate count `{value}`")))
}
