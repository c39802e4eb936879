//! Core domain logic for EFO label issuing.
//! Owns label-type registry, code allocation, batch/print state, statistics
//! and calibration; adapters (FFI, CLI) only translate.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;

pub use config::{StoreBackend, StoreConfig};
pub use error::{ErrorKind, LabelError, LabelResult};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status};
pub use model::batch::{format_code, parse_code, BatchId, Label, LabelBatch, LabelId};
pub use model::coordinates::{default_coordinates, Anchor, AnchorPoint, LabelCoordinates};
pub use model::label_type::{label_type_config, LabelType, LabelTypeConfig};
pub use model::stats::LabelStats;
pub use render::{
    document_file_name, document_file_name_today, layout_document, DocumentRenderer, LabelDocument,
    RenderRequest,
};
pub use repo::batch_repo::{BatchRepository, MarkPrintedOutcome, SqliteBatchRepository};
pub use repo::coordinate_repo::{CoordinateRepository, SqliteCoordinateRepository};
pub use repo::local_store::LocalStore;
pub use repo::sequence_repo::{SequenceRepository, SqliteSequenceRepository};
pub use repo::{RepoError, RepoResult};
pub use service::allocator::{checked_quantity, Reservation, SequenceAllocator};
pub use service::batch_service::{parse_batch_id, BatchService, GeneratedBatch};
pub use service::coordinate_service::{CoordinateService, CoordinateSource};
pub use service::label_service::LabelService;
pub use service::stats_service::StatsService;

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
