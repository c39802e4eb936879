//! Use-case error taxonomy.
//!
//! # Responsibility
//! - Give every service failure a distinguishable kind for callers.
//! - Keep repository transport details reachable through `source()`.
//!
//! # Invariants
//! - Only `ErrorKind::PersistenceError` is retryable.
//! - Errors are never swallowed by the service layer.

use crate::model::batch::{BatchId, MAX_BATCH_QUANTITY, MIN_BATCH_QUANTITY};
use crate::model::coordinates::CoordinatesValidationError;
use crate::model::label_type::UnknownLabelType;
use crate::repo::RepoError;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LabelResult<T> = Result<T, LabelError>;

/// Coarse error kind exposed at the system boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    UnknownLabelType,
    BatchNotFound,
    PersistenceError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::UnknownLabelType => "UnknownLabelType",
            Self::BatchNotFound => "BatchNotFound",
            Self::PersistenceError => "PersistenceError",
        }
    }

    /// Whether re-running the whole operation may succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::PersistenceError)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-level error for label issuing use-cases.
#[derive(Debug)]
pub enum LabelError {
    /// Missing or malformed caller input.
    InvalidInput(String),
    /// Quantity outside `1..=1000`.
    InvalidQuantity { requested: i64 },
    UnknownLabelType(String),
    BatchNotFound(BatchId),
    /// A code handed to the batch store was already issued.
    DuplicateCode(String),
    InvalidCoordinates(CoordinatesValidationError),
    Persistence(RepoError),
}

impl LabelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_)
            | Self::InvalidQuantity { .. }
            | Self::DuplicateCode(_)
            | Self::InvalidCoordinates(_) => ErrorKind::InvalidInput,
            Self::UnknownLabelType(_) => ErrorKind::UnknownLabelType,
            Self::BatchNotFound(_) => ErrorKind::BatchNotFound,
            Self::Persistence(_) => ErrorKind::PersistenceError,
        }
    }
}

impl Display for LabelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::InvalidQuantity { requested } => write!(
                f,
                "quantity must be between {MIN_BATCH_QUANTITY} and {MAX_BATCH_QUANTITY}, got {requested}"
            ),
            Self::UnknownLabelType(value) => write!(f, "unknown label type: `{value}`"),
            Self::BatchNotFound(id) => write!(f, "batch not found: {id}"),
            Self::DuplicateCode(code) => write!(f, "code already issued: {code}"),
            Self::InvalidCoordinates(err) => write!(f, "invalid coordinates: {err}"),
            Self::Persistence(err) => write!(f, "persistence failed: {err}"),
        }
    }
}

impl Error for LabelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCoordinates(err) => Some(err),
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for LabelError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::BatchNotFound(id),
            RepoError::DuplicateCode(code) => Self::DuplicateCode(code),
            RepoError::InvalidCoordinates(err) => Self::InvalidCoordinates(err),
            other => Self::Persistence(other),
        }
    }
}

impl From<UnknownLabelType> for LabelError {
    fn from(value: UnknownLabelType) -> Self {
        Self::UnknownLabelType(value.0)
    }
}

impl From<CoordinatesValidationError> for LabelError {
    fn from(value: CoordinatesValidationError) -> Self {
        Self::InvalidCoordinates(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, LabelError};
    use crate::repo::RepoError;
    use uuid::Uuid;

    #[test]
    fn repo_errors_map_to_semantic_kinds() {
        let id = Uuid::new_v4();
        assert_eq!(
            LabelError::from(RepoError::NotFound(id)).kind(),
            ErrorKind::BatchNotFound
        );
        assert_eq!(
            LabelError::from(RepoError::DuplicateCode("PC-000001".into())).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            LabelError::from(RepoError::InvalidData("x".into())).kind(),
            ErrorKind::PersistenceError
        );
    }

    #[test]
    fn only_persistence_is_retryable() {
        assert!(ErrorKind::PersistenceError.is_retryable());
        assert!(!ErrorKind::InvalidInput.is_retryable());
        assert!(!ErrorKind::BatchNotFound.is_retryable());
    }

    #[test]
    fn quantity_message_names_bounds() {
        let err = LabelError::InvalidQuantity { requested: 1001 };
        assert!(err.to_string().contains("between 1 and 1000"));
    }
}
