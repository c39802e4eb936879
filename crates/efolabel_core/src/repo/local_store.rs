//! Single-file key-value store adapter.
//!
//! # Responsibility
//! - Keep counters, batches, labels and coordinates in one JSON document.
//! - Implement every repository contract with the same semantics as the
//!   SQLite adapter, for offline single-machine use.
//!
//! # Invariants
//! - Every mutation is applied to a copy, written to a temporary file in the
//!   target directory and atomically renamed over the document. Memory is
//!   only updated after the rename succeeds, so a failed write leaves both
//!   the file and the in-memory view untouched.
//! - All operations serialize on one process-local mutex. Cross-process
//!   coordination is not provided.

use crate::model::batch::{BatchId, Label, LabelBatch};
use crate::model::coordinates::LabelCoordinates;
use crate::model::label_type::LabelType;
use crate::repo::batch_repo::{BatchRepository, LabelTally, MarkPrintedOutcome};
use crate::repo::coordinate_repo::{CoordinateRecord, CoordinateRepository};
use crate::repo::sequence_repo::SequenceRepository;
use crate::repo::{RepoError, RepoResult};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// On-disk document layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    last_numbers: BTreeMap<LabelType, u64>,
    /// Insertion order.
    #[serde(default)]
    batches: Vec<LabelBatch>,
    /// Insertion order.
    #[serde(default)]
    labels: Vec<Label>,
    #[serde(default)]
    coordinates: BTreeMap<LabelType, CoordinateRecord>,
}

impl StoreDocument {
    /// Rejects documents the write path could never have produced.
    fn validate(&self) -> RepoResult<()> {
        for batch in &self.batches {
            if batch.codes.len() != batch.quantity as usize {
                return Err(RepoError::InvalidData(format!(
                    "batch `{}` holds {} codes but quantity {}",
                    batch.id,
                    batch.codes.len(),
                    batch.quantity
                )));
            }
        }

        let mut issued = HashSet::new();
        for label in &self.labels {
            if !issued.insert(label.code.as_str()) {
                return Err(RepoError::InvalidData(format!(
                    "label code `{}` stored twice",
                    label.code
                )));
            }
        }
        Ok(())
    }
}

/// JSON-document store implementing all repository contracts.
pub struct LocalStore {
    path: Option<PathBuf>,
    document: Mutex<StoreDocument>,
}

impl LocalStore {
    /// Opens (or lazily creates) the document at `path`.
    ///
    /// A missing file is an empty store; the file is created on first write.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        let path = path.as_ref().to_path_buf();
        let document = match std::fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => StoreDocument::default(),
            Ok(bytes) => {
                let document: StoreDocument = serde_json::from_slice(&bytes)?;
                document.validate()?;
                document
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreDocument::default(),
            Err(err) => return Err(err.into()),
        };
        info!(
            "event=store_open module=local_store status=ok path={} batches={} labels={}",
            path.display(),
            document.batches.len(),
            document.labels.len()
        );

        Ok(Self {
            path: Some(path),
            document: Mutex::new(document),
        })
    }

    /// Creates a store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            document: Mutex::new(StoreDocument::default()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, StoreDocument> {
        // The document is only replaced after a successful write, so a
        // poisoned guard still holds a consistent view.
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read<T>(&self, f: impl FnOnce(&StoreDocument) -> RepoResult<T>) -> RepoResult<T> {
        let guard = self.lock();
        f(&guard)
    }

    fn mutate<T>(&self, f: impl FnOnce(&mut StoreDocument) -> RepoResult<T>) -> RepoResult<T> {
        let mut guard = self.lock();
        let mut draft = guard.clone();
        let value = f(&mut draft)?;
        if let Some(path) = self.path.as_deref() {
            write_document(path, &draft)?;
        }
        *guard = draft;
        Ok(value)
    }
}

fn write_document(path: &Path, document: &StoreDocument) -> RepoResult<()> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => dir.to_path_buf(),
        None => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)?;

    let bytes = serde_json::to_vec_pretty(document)?;
    let mut file = tempfile::NamedTempFile::new_in(&dir)?;
    file.write_all(&bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| RepoError::Io(err.error))?;

    debug!(
        "event=store_write module=local_store status=ok bytes={}",
        bytes.len()
    );
    Ok(())
}

impl SequenceRepository for LocalStore {
    fn advance(&self, label_type: LabelType, quantity: u32, _now_ms: i64) -> RepoResult<u64> {
        self.mutate(|doc| {
            let last = doc.last_numbers.get(&label_type).copied().unwrap_or(0);
            let next = last
                .checked_add(u64::from(quantity))
                .ok_or(RepoError::CounterOverflow(label_type))?;
            doc.last_numbers.insert(label_type, next);
            Ok(last)
        })
    }

    fn last_number(&self, label_type: LabelType) -> RepoResult<u64> {
        self.read(|doc| Ok(doc.last_numbers.get(&label_type).copied().unwrap_or(0)))
    }

    fn last_numbers(&self) -> RepoResult<BTreeMap<LabelType, u64>> {
        self.read(|doc| Ok(doc.last_numbers.clone()))
    }
}

impl BatchRepository for LocalStore {
    fn insert_batch(&self, batch: &LabelBatch, labels: &[Label]) -> RepoResult<()> {
        self.mutate(|doc| {
            let mut issued: HashSet<&str> =
                doc.labels.iter().map(|label| label.code.as_str()).collect();
            for label in labels {
                if !issued.insert(label.code.as_str()) {
                    return Err(RepoError::DuplicateCode(label.code.clone()));
                }
            }
            if doc.batches.iter().any(|existing| existing.id == batch.id) {
                return Err(RepoError::InvalidData(format!(
                    "batch id `{}` already exists",
                    batch.id
                )));
            }

            doc.batches.push(batch.clone());
            doc.labels.extend(labels.iter().cloned());
            Ok(())
        })
    }

    fn get_batch(&self, id: BatchId) -> RepoResult<Option<LabelBatch>> {
        self.read(|doc| Ok(doc.batches.iter().find(|batch| batch.id == id).cloned()))
    }

    fn list_batches(&self) -> RepoResult<Vec<LabelBatch>> {
        self.read(|doc| {
            let mut batches = doc.batches.clone();
            // Stable sort keeps insertion order for equal timestamps.
            batches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(batches)
        })
    }

    fn list_labels(&self) -> RepoResult<Vec<Label>> {
        self.read(|doc| {
            let mut labels = doc.labels.clone();
            labels.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(labels)
        })
    }

    fn labels_for_batch(&self, id: BatchId) -> RepoResult<Vec<Label>> {
        self.read(|doc| {
            Ok(doc
                .labels
                .iter()
                .filter(|label| label.batch_id == id)
                .cloned()
                .collect())
        })
    }

    fn mark_batch_printed(
        &self,
        id: BatchId,
        printed_at: i64,
        printed_by: Option<&str>,
    ) -> RepoResult<MarkPrintedOutcome> {
        let batch_was_printed = self.read(|doc| {
            doc.batches
                .iter()
                .find(|batch| batch.id == id)
                .map(|batch| batch.printed)
                .ok_or(RepoError::NotFound(id))
        })?;
        let lagging = self.read(|doc| {
            Ok(doc
                .labels
                .iter()
                .any(|label| label.batch_id == id && !label.printed))
        })?;
        if batch_was_printed && !lagging {
            return Ok(MarkPrintedOutcome::AlreadyPrinted);
        }

        self.mutate(|doc| {
            let batch = doc
                .batches
                .iter_mut()
                .find(|batch| batch.id == id)
                .ok_or(RepoError::NotFound(id))?;
            let batch_was_printed = batch.printed;
            batch.printed = true;

            let mut labels_changed = 0;
            for label in doc
                .labels
                .iter_mut()
                .filter(|label| label.batch_id == id && !label.printed)
            {
                label.printed = true;
                label.printed_at = Some(printed_at);
                label.printed_by = printed_by.map(str::to_string);
                labels_changed += 1;
            }

            Ok(MarkPrintedOutcome::from_parts(
                batch_was_printed,
                labels_changed,
            ))
        })
    }

    fn tally(&self) -> RepoResult<LabelTally> {
        self.read(|doc| {
            let mut tally = LabelTally {
                total_batches: doc.batches.len() as u64,
                printed_batches: doc.batches.iter().filter(|b| b.printed).count() as u64,
                ..LabelTally::default()
            };
            for label in &doc.labels {
                tally.total_labels += 1;
                if label.printed {
                    tally.printed_labels += 1;
                }
                *tally.labels_by_type.entry(label.label_type).or_insert(0) += 1;
            }
            Ok(tally)
        })
    }
}

impl CoordinateRepository for LocalStore {
    fn get_coordinates(&self, label_type: LabelType) -> RepoResult<Option<CoordinateRecord>> {
        self.read(|doc| Ok(doc.coordinates.get(&label_type).cloned()))
    }

    fn put_coordinates(
        &self,
        coordinates: &LabelCoordinates,
        updated_at: i64,
        updated_by: Option<&str>,
    ) -> RepoResult<()> {
        coordinates.validate()?;
        self.mutate(|doc| {
            doc.coordinates.insert(
                coordinates.label_type,
                CoordinateRecord {
                    coordinates: coordinates.clone(),
                    updated_at,
                    updated_by: updated_by.map(str::to_string),
                },
            );
            Ok(())
        })
    }

    fn put_all_coordinates(
        &self,
        records: &[LabelCoordinates],
        updated_at: i64,
        updated_by: Option<&str>,
    ) -> RepoResult<()> {
        for coordinates in records {
            coordinates.validate()?;
        }
        self.mutate(|doc| {
            for coordinates in records {
                doc.coordinates.insert(
                    coordinates.label_type,
                    CoordinateRecord {
                        coordinates: coordinates.clone(),
                        updated_at,
                        updated_by: updated_by.map(str::to_string),
                    },
                );
            }
            Ok(())
        })
    }

    fn list_coordinates(&self) -> RepoResult<Vec<CoordinateRecord>> {
        self.read(|doc| Ok(doc.coordinates.values().cloned().collect()))
    }
}
