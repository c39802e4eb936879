//! Storage port and its adapters.
//!
//! # Responsibility
//! - Define the persistence contracts for sequence counters, batches/labels
//!   and calibration coordinates.
//! - Provide two conforming adapters: SQLite tables (`Sqlite*Repository`)
//!   and a single JSON blob file (`LocalStore`).
//!
//! # Invariants
//! - Every multi-record write is all-or-nothing in both adapters.
//! - Repository APIs return semantic errors (`NotFound`, `DuplicateCode`) in
//!   addition to transport errors.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::batch::BatchId;
use crate::model::coordinates::CoordinatesValidationError;
use crate::model::label_type::LabelType;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod batch_repo;
pub mod coordinate_repo;
pub mod local_store;
pub mod sequence_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by every adapter.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Io(std::io::Error),
    Serialization(serde_json::Error),
    /// No batch with this id exists.
    NotFound(BatchId),
    /// The code was already issued to another label.
    DuplicateCode(String),
    InvalidCoordinates(CoordinatesValidationError),
    /// Advancing the counter would exceed the storable range.
    CounterOverflow(LabelType),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "local store i/o failed: {err}"),
            Self::Serialization(err) => write!(f, "local store encoding failed: {err}"),
            Self::NotFound(id) => write!(f, "batch not found: {id}"),
            Self::DuplicateCode(code) => write!(f, "code already issued: {code}"),
            Self::InvalidCoordinates(err) => write!(f, "{err}"),
            Self::CounterOverflow(label_type) => {
                write!(f, "sequence counter overflow for `{label_type}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidCoordinates(err) => Some(err),
            Self::NotFound(_)
            | Self::DuplicateCode(_)
            | Self::CounterOverflow(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<CoordinatesValidationError> for RepoError {
    fn from(value: CoordinatesValidationError) -> Self {
        Self::InvalidCoordinates(value)
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn parse_label_type(value: &str, column: &str) -> RepoResult<LabelType> {
    value
        .parse::<LabelType>()
        .map_err(|_| RepoError::InvalidData(format!("unknown label type `{value}` in {column}")))
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
