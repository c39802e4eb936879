//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose label issuing use-cases to Dart via FRB as flat envelopes.
//! - Resolve the store once per process and open it per call.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every failing envelope carries `ok=false`, a stable `error_kind` and a
//!   human-readable `message`.

use efolabel_core::db::open_db;
use efolabel_core::{
    checked_quantity, core_version as core_version_inner, document_file_name_today,
    init_logging as init_logging_inner, layout_document, parse_batch_id, ping as ping_inner,
    Anchor, AnchorPoint, BatchRepository, BatchService, CoordinateRepository, CoordinateService,
    CoordinateSource, LabelBatch, LabelCoordinates, LabelDocument, LabelError, LabelResult,
    LabelService, LabelStats, LabelType, LocalStore, RenderRequest, RepoError,
    SequenceRepository, SqliteBatchRepository, SqliteCoordinateRepository,
    SqliteSequenceRepository, StatsService, StoreBackend, StoreConfig,
};
use log::warn;
use std::sync::OnceLock;

static STORE_CONFIG: OnceLock<StoreConfig> = OnceLock::new();
static LOCAL_STORE: OnceLock<LocalStore> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`; conflicting calls fail.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Pins the store used by every later call.
///
/// - `backend`: `sqlite` or `local`.
/// - `path`: database/document file; blank uses the backend default.
///
/// Without this call the store comes from `EFOLABEL_STORE` /
/// `EFOLABEL_DB_PATH`. Returns empty string on success; re-pinning a
/// different store fails.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_store(backend: String, path: String) -> String {
    let requested = match backend.parse::<StoreBackend>() {
        Ok(backend) => StoreConfig::new(backend, Some(path.as_str())),
        Err(err) => return err.to_string(),
    };
    let active = STORE_CONFIG.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "store already configured as {} at `{}`",
            active.backend,
            active.path.display()
        )
    }
}

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTypeItem {
    /// External identifier, e.g. `PatchCord Duplex`.
    pub id: String,
    pub display_name: String,
    pub code_prefix: String,
    pub template_ref: String,
    pub description: String,
}

/// Persisted batch projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchItem {
    pub batch_id: String,
    pub label_type: String,
    pub quantity: u32,
    pub codes: Vec<String>,
    pub created_at_ms: i64,
    pub created_by: Option<String>,
    pub printed: bool,
}

/// Envelope for single-batch results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    pub batch: Option<BatchItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchListResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    /// Newest first.
    pub items: Vec<BatchItem>,
}

/// Envelope for state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    /// Machine-readable outcome (`marked|already_printed|repaired|saved`).
    pub outcome: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeCount {
    pub label_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsItem {
    pub total_labels: u64,
    pub printed_labels: u64,
    pub pending_labels: u64,
    pub total_batches: u64,
    pub printed_batches: u64,
    /// Only types with at least one label.
    pub labels_by_type: Vec<TypeCount>,
    /// Last issued number per type that ever issued.
    pub last_numbers: Vec<TypeCount>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    pub stats: Option<StatsItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnchorItem {
    /// `ILA1|ILA2|RLA1|RLA2`.
    pub anchor: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatesItem {
    pub label_type: String,
    /// Set anchors only.
    pub anchors: Vec<AnchorItem>,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatesResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    pub coordinates: Option<CoordinatesItem>,
    /// True when nothing was stored and built-in defaults were returned.
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacementItem {
    pub anchor: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageItem {
    pub code: String,
    pub placements: Vec<PlacementItem>,
}

/// Drawing-ready layout for a Dart-side PDF renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutResponse {
    pub ok: bool,
    pub error_kind: Option<String>,
    pub message: String,
    pub template_ref: Option<String>,
    pub file_name: Option<String>,
    pub page_width_pt: f64,
    pub page_height_pt: f64,
    pub pages: Vec<PageItem>,
}

/// Lists the compiled-in label types in registry order.
#[flutter_rust_bridge::frb(sync)]
pub fn label_types() -> Vec<LabelTypeItem> {
    LabelType::ALL
        .iter()
        .map(|label_type| {
            let config = label_type.config();
            LabelTypeItem {
                id: config.id.to_string(),
                display_name: config.display_name.to_string(),
                code_prefix: config.code_prefix.to_string(),
                template_ref: config.template_ref.to_string(),
                description: config.description.to_string(),
            }
        })
        .collect()
}

/// Reserves `quantity` codes and persists them as a new batch.
///
/// # FFI contract
/// - `quantity` outside `1..=1000` fails with `InvalidInput` before any
///   number is consumed.
/// - A `PersistenceError` after reservation leaves a numbering gap.
#[flutter_rust_bridge::frb(sync)]
pub fn generate_labels(
    label_type: String,
    quantity: i64,
    created_by: Option<String>,
) -> BatchResponse {
    let result = checked_quantity(quantity).and_then(|quantity| {
        with_stores(|stores| {
            LabelService::new(stores.sequences, stores.batches).generate(
                &label_type,
                quantity,
                created_by.as_deref(),
            )
        })
    });
    match result {
        Ok(generated) => BatchResponse {
            ok: true,
            error_kind: None,
            message: format!(
                "Generated {} label(s) {}..{}.",
                generated.batch.quantity,
                generated.batch.codes.first().map_or("", String::as_str),
                generated.batch.codes.last().map_or("", String::as_str)
            ),
            batch: Some(to_batch_item(generated.batch)),
        },
        Err(err) => BatchResponse {
            ok: false,
            error_kind: Some(err.kind().to_string()),
            message: failure_message("generate_labels", &err),
            batch: None,
        },
    }
}

/// Marks a batch and all of its labels as printed (idempotent).
#[flutter_rust_bridge::frb(sync)]
pub fn mark_batch_printed(batch_id: String, printed_by: Option<String>) -> ActionResponse {
    let result = with_stores(|stores| {
        BatchService::new(stores.batches).mark_printed_str(&batch_id, printed_by.as_deref())
    });
    match result {
        Ok(outcome) => ActionResponse::success("Batch marked as printed.", outcome.as_str()),
        Err(err) => ActionResponse::failure("mark_batch_printed", &err),
    }
}

/// Current statistics.
#[flutter_rust_bridge::frb(sync)]
pub fn label_statistics() -> StatsResponse {
    match with_stores(|stores| StatsService::new(stores.sequences, stores.batches).compute()) {
        Ok(stats) => StatsResponse {
            ok: true,
            error_kind: None,
            message: format!("{} label(s) issued.", stats.total_labels),
            stats: Some(to_stats_item(stats)),
        },
        Err(err) => StatsResponse {
            ok: false,
            error_kind: Some(err.kind().to_string()),
            message: failure_message("label_statistics", &err),
            stats: None,
        },
    }
}

/// All batches, newest first.
#[flutter_rust_bridge::frb(sync)]
pub fn list_batches() -> BatchListResponse {
    match with_stores(|stores| BatchService::new(stores.batches).list_batches()) {
        Ok(batches) => BatchListResponse {
            ok: true,
            error_kind: None,
            message: format!("{} batch(es).", batches.len()),
            items: batches.into_iter().map(to_batch_item).collect(),
        },
        Err(err) => BatchListResponse {
            ok: false,
            error_kind: Some(err.kind().to_string()),
            message: failure_message("list_batches", &err),
            items: Vec::new(),
        },
    }
}

/// Effective calibration for a type, falling back to built-in defaults.
#[flutter_rust_bridge::frb(sync)]
pub fn get_coordinates(label_type: String) -> CoordinatesResponse {
    let result = parse_label_type(&label_type).and_then(|label_type| {
        with_stores(|stores| CoordinateService::new(stores.coordinates).resolve(label_type))
    });
    match result {
        Ok((coordinates, source)) => CoordinatesResponse {
            ok: true,
            error_kind: None,
            message: match source {
                CoordinateSource::Stored => "Stored coordinates.".to_string(),
                CoordinateSource::BuiltInDefault => "Default coordinates.".to_string(),
            },
            coordinates: Some(to_coordinates_item(&coordinates)),
            is_default: source == CoordinateSource::BuiltInDefault,
        },
        Err(err) => CoordinatesResponse {
            ok: false,
            error_kind: Some(err.kind().to_string()),
            message: failure_message("get_coordinates", &err),
            coordinates: None,
            is_default: false,
        },
    }
}

/// Replaces the stored calibration for `coordinates.label_type`.
#[flutter_rust_bridge::frb(sync)]
pub fn save_coordinates(coordinates: CoordinatesItem, updated_by: Option<String>) -> ActionResponse {
    let result = from_coordinates_item(&coordinates).and_then(|coordinates| {
        with_stores(|stores| {
            CoordinateService::new(stores.coordinates).put(&coordinates, updated_by.as_deref())
        })
    });
    match result {
        Ok(()) => ActionResponse::success("Coordinates saved.", "saved"),
        Err(err) => ActionResponse::failure("save_coordinates", &err),
    }
}

/// Replaces the stored calibration of several types in one write.
///
/// Nothing is saved unless every item converts and validates.
#[flutter_rust_bridge::frb(sync)]
pub fn save_all_coordinates(
    items: Vec<CoordinatesItem>,
    updated_by: Option<String>,
) -> ActionResponse {
    let result = items
        .iter()
        .map(from_coordinates_item)
        .collect::<LabelResult<Vec<_>>>()
        .and_then(|records| {
            with_stores(|stores| {
                CoordinateService::new(stores.coordinates).put_all(&records, updated_by.as_deref())
            })
        });
    match result {
        Ok(()) => ActionResponse::success(
            format!("{} coordinate records saved.", items.len()),
            "saved",
        ),
        Err(err) => ActionResponse::failure("save_all_coordinates", &err),
    }
}

/// Page layout for a stored batch using its type's effective calibration.
#[flutter_rust_bridge::frb(sync)]
pub fn layout_labels(batch_id: String) -> LayoutResponse {
    let result = parse_batch_id(&batch_id).and_then(|id| {
        with_stores(|stores| {
            let batch = BatchService::new(stores.batches)
                .get_batch(id)?
                .ok_or(LabelError::BatchNotFound(id))?;
            let (coordinates, _) =
                CoordinateService::new(stores.coordinates).resolve(batch.label_type)?;
            Ok(layout_document(&RenderRequest {
                label_type: batch.label_type,
                codes: &batch.codes,
                coordinates: &coordinates,
                template_ref: batch.label_type.config().template_ref,
            }))
        })
    });
    match result {
        Ok(document) => to_layout_response(document),
        Err(err) => LayoutResponse {
            ok: false,
            error_kind: Some(err.kind().to_string()),
            message: failure_message("layout_labels", &err),
            template_ref: None,
            file_name: None,
            page_width_pt: 0.0,
            page_height_pt: 0.0,
            pages: Vec::new(),
        },
    }
}

impl ActionResponse {
    fn success(message: impl Into<String>, outcome: &str) -> Self {
        Self {
            ok: true,
            error_kind: None,
            message: message.into(),
            outcome: Some(outcome.to_string()),
        }
    }

    fn failure(operation: &str, err: &LabelError) -> Self {
        Self {
            ok: false,
            error_kind: Some(err.kind().to_string()),
            message: failure_message(operation, err),
            outcome: None,
        }
    }
}

/// Repositories of the configured store for one call.
struct Stores<'a> {
    sequences: &'a dyn SequenceRepository,
    batches: &'a dyn BatchRepository,
    coordinates: &'a dyn CoordinateRepository,
}

fn store_config() -> LabelResult<&'static StoreConfig> {
    if let Some(config) = STORE_CONFIG.get() {
        return Ok(config);
    }
    let resolved = StoreConfig::from_env()?;
    Ok(STORE_CONFIG.get_or_init(|| resolved))
}

fn local_store(config: &StoreConfig) -> LabelResult<&'static LocalStore> {
    if let Some(store) = LOCAL_STORE.get() {
        return Ok(store);
    }
    let opened = LocalStore::open(&config.path)?;
    Ok(LOCAL_STORE.get_or_init(|| opened))
}

fn with_stores<T>(f: impl FnOnce(Stores<'_>) -> LabelResult<T>) -> LabelResult<T> {
    let config = store_config()?;
    match config.backend {
        StoreBackend::Sqlite => {
            let conn = open_db(&config.path).map_err(RepoError::from)?;
            let sequences = SqliteSequenceRepository::new(&conn);
            let batches = SqliteBatchRepository::new(&conn);
            let coordinates = SqliteCoordinateRepository::new(&conn);
            f(Stores {
                sequences: &sequences,
                batches: &batches,
                coordinates: &coordinates,
            })
        }
        StoreBackend::LocalFile => {
            let store = local_store(config)?;
            f(Stores {
                sequences: store,
                batches: store,
                coordinates: store,
            })
        }
    }
}

fn failure_message(operation: &str, err: &LabelError) -> String {
    warn!(
        "event=ffi_call module=ffi status=error op={} error_kind={}",
        operation,
        err.kind()
    );
    format!("{operation} failed: {err}")
}

fn parse_label_type(raw: &str) -> LabelResult<LabelType> {
    Ok(raw.trim().parse::<LabelType>()?)
}

fn to_batch_item(batch: LabelBatch) -> BatchItem {
    BatchItem {
        batch_id: batch.id.to_string(),
        label_type: batch.label_type.to_string(),
        quantity: batch.quantity,
        codes: batch.codes,
        created_at_ms: batch.created_at,
        created_by: batch.created_by,
        printed: batch.printed,
    }
}

fn to_stats_item(stats: LabelStats) -> StatsItem {
    let counts = |map: std::collections::BTreeMap<LabelType, u64>| {
        map.into_iter()
            .map(|(label_type, count)| TypeCount {
                label_type: label_type.to_string(),
                count,
            })
            .collect()
    };
    StatsItem {
        total_labels: stats.total_labels,
        printed_labels: stats.printed_labels,
        pending_labels: stats.pending_labels,
        total_batches: stats.total_batches,
        printed_batches: stats.printed_batches,
        labels_by_type: counts(stats.labels_by_type),
        last_numbers: counts(stats.last_numbers),
    }
}

fn to_coordinates_item(coordinates: &LabelCoordinates) -> CoordinatesItem {
    CoordinatesItem {
        label_type: coordinates.label_type.to_string(),
        anchors: coordinates
            .defined_anchors()
            .into_iter()
            .map(|(anchor, point)| AnchorItem {
                anchor: anchor.to_string(),
                x: point.x,
                y: point.y,
            })
            .collect(),
        font_size: coordinates.font_size,
    }
}

fn from_coordinates_item(item: &CoordinatesItem) -> LabelResult<LabelCoordinates> {
    let mut coordinates = LabelCoordinates::empty(parse_label_type(&item.label_type)?, item.font_size);
    for anchor_item in &item.anchors {
        let anchor = Anchor::parse(&anchor_item.anchor).ok_or_else(|| {
            LabelError::InvalidInput(format!("unknown anchor `{}`", anchor_item.anchor))
        })?;
        if coordinates.anchor(anchor).is_some() {
            return Err(LabelError::InvalidInput(format!(
                "anchor {anchor} given more than once"
            )));
        }
        coordinates.set_anchor(anchor, Some(AnchorPoint::new(anchor_item.x, anchor_item.y)));
    }
    Ok(coordinates)
}

fn to_layout_response(document: LabelDocument) -> LayoutResponse {
    let file_name = document_file_name_today(document.label_type.prefix(), document.pages.len());
    LayoutResponse {
        ok: true,
        error_kind: None,
        message: format!("{} page(s).", document.pages.len()),
        template_ref: Some(document.template_ref),
        file_name: Some(file_name),
        page_width_pt: document.page_size.width,
        page_height_pt: document.page_size.height,
        pages: document
            .pages
            .into_iter()
            .map(|page| PageItem {
                code: page.code,
                placements: page
                    .placements
                    .into_iter()
                    .map(|placement| PlacementItem {
                        anchor: placement.anchor.to_string(),
                        x: placement.x,
                        y: placement.y,
                        font_size: placement.font_size,
                        text: placement.text,
                    })
                    .collect(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        configure_store, core_version, from_coordinates_item, generate_labels, get_coordinates,
        init_logging, label_statistics, label_types, layout_labels, list_batches,
        mark_batch_printed, ping, save_all_coordinates, save_coordinates, AnchorItem,
        CoordinatesItem,
    };
    use std::sync::Once;

    /// Pins every test in this process to one throwaway JSON store.
    fn use_test_store() {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let dir = tempfile::tempdir().unwrap().keep();
            let path = dir.join("ffi_store.json");
            let error = configure_store("local".to_string(), path.display().to_string());
            assert!(error.is_empty(), "{error}");
        });
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_bad_input() {
        assert!(!init_logging("info".to_string(), String::new()).is_empty());
        assert!(!init_logging("verbose".to_string(), "/tmp/efolabel-logs".to_string()).is_empty());
    }

    #[test]
    fn label_types_lists_the_registry() {
        let types = label_types();
        assert_eq!(types.len(), 10);
        assert_eq!(types[0].id, "PatchCord");
        assert_eq!(types[0].code_prefix, "PC");
        assert_eq!(types[9].id, "Bobina");
    }

    #[test]
    fn reconfiguring_a_different_store_is_rejected() {
        use_test_store();
        let error = configure_store("sqlite".to_string(), "/tmp/other.sqlite3".to_string());
        assert!(error.contains("already configured"));
        assert!(!configure_store("oracle".to_string(), String::new()).is_empty());
    }

    #[test]
    fn generate_then_print_round_trip() {
        use_test_store();
        let generated = generate_labels("PatchCord Duplex COENTEL".to_string(), 3, None);
        assert!(generated.ok, "{}", generated.message);
        let batch = generated.batch.unwrap();
        assert_eq!(batch.codes.len(), 3);
        assert!(batch.codes.iter().all(|code| code.starts_with("PCDC-")));

        let first = mark_batch_printed(batch.batch_id.clone(), Some("op".to_string()));
        assert!(first.ok, "{}", first.message);
        assert_eq!(first.outcome.as_deref(), Some("marked"));

        let second = mark_batch_printed(batch.batch_id.clone(), None);
        assert_eq!(second.outcome.as_deref(), Some("already_printed"));

        let listed = list_batches();
        assert!(listed.ok);
        let stored = listed
            .items
            .iter()
            .find(|item| item.batch_id == batch.batch_id)
            .unwrap();
        assert!(stored.printed);

        let stats = label_statistics().stats.unwrap();
        let pcdc = stats
            .labels_by_type
            .iter()
            .find(|count| count.label_type == "PatchCord Duplex COENTEL")
            .unwrap();
        assert!(pcdc.count >= 3);
    }

    #[test]
    fn generate_reports_error_kinds() {
        use_test_store();
        let bad_quantity = generate_labels("Bobina".to_string(), 0, None);
        assert!(!bad_quantity.ok);
        assert_eq!(bad_quantity.error_kind.as_deref(), Some("InvalidInput"));

        let too_many = generate_labels("Bobina".to_string(), 1001, None);
        assert_eq!(too_many.error_kind.as_deref(), Some("InvalidInput"));

        let unknown = generate_labels("Conector".to_string(), 1, None);
        assert_eq!(unknown.error_kind.as_deref(), Some("UnknownLabelType"));
    }

    #[test]
    fn mark_printed_reports_missing_and_malformed_ids() {
        use_test_store();
        let missing = mark_batch_printed(uuid::Uuid::new_v4().to_string(), None);
        assert_eq!(missing.error_kind.as_deref(), Some("BatchNotFound"));

        let malformed = mark_batch_printed("batch-1".to_string(), None);
        assert_eq!(malformed.error_kind.as_deref(), Some("InvalidInput"));
    }

    #[test]
    fn coordinates_save_and_layout_use_them() {
        use_test_store();
        let saved = save_coordinates(
            CoordinatesItem {
                label_type: "Pigtail COENTEL".to_string(),
                anchors: vec![AnchorItem {
                    anchor: "ila1".to_string(),
                    x: 30.0,
                    y: 40.0,
                }],
                font_size: 11.0,
            },
            None,
        );
        assert!(saved.ok, "{}", saved.message);

        let fetched = get_coordinates("Pigtail COENTEL".to_string());
        assert!(!fetched.is_default);
        assert_eq!(fetched.coordinates.unwrap().anchors.len(), 1);

        let batch = generate_labels("Pigtail COENTEL".to_string(), 2, None)
            .batch
            .unwrap();
        let layout = layout_labels(batch.batch_id);
        assert!(layout.ok, "{}", layout.message);
        assert_eq!(layout.pages.len(), 2);
        assert_eq!(layout.pages[0].placements.len(), 1);
        assert_eq!(layout.pages[0].placements[0].font_size, 11.0);
        assert!(layout.file_name.unwrap().starts_with("EFO_PTC_2_etiquetas_"));
    }

    #[test]
    fn bulk_coordinate_save_is_all_or_nothing() {
        use_test_store();
        let item = |label_type: &str, x: f64| CoordinatesItem {
            label_type: label_type.to_string(),
            anchors: vec![AnchorItem {
                anchor: "rla1".to_string(),
                x,
                y: 20.0,
            }],
            font_size: 9.0,
        };

        let rejected = save_all_coordinates(
            vec![item("Pigtail RIMPORT", 150.0), item("PatchCord Duplex", 900.0)],
            None,
        );
        assert!(!rejected.ok);
        assert_eq!(rejected.error_kind.as_deref(), Some("InvalidInput"));
        assert!(get_coordinates("Pigtail RIMPORT".to_string()).is_default);

        let saved = save_all_coordinates(
            vec![item("Pigtail RIMPORT", 150.0), item("PatchCord Duplex", 160.0)],
            Some("calibrador".to_string()),
        );
        assert!(saved.ok, "{}", saved.message);
        assert!(!get_coordinates("Pigtail RIMPORT".to_string()).is_default);
        assert!(!get_coordinates("PatchCord Duplex".to_string()).is_default);
    }

    #[test]
    fn untouched_types_report_default_coordinates() {
        use_test_store();
        let response = get_coordinates("PatchCord RIMPORT".to_string());
        assert!(response.ok);
        assert!(response.is_default);
        assert_eq!(response.coordinates.unwrap().anchors.len(), 4);

        let unknown = get_coordinates("Cable".to_string());
        assert_eq!(unknown.error_kind.as_deref(), Some("UnknownLabelType"));
    }

    #[test]
    fn coordinate_items_reject_unknown_or_repeated_anchors() {
        let mut item = CoordinatesItem {
            label_type: "Bobina".to_string(),
            anchors: vec![AnchorItem {
                anchor: "XLA9".to_string(),
                x: 1.0,
                y: 1.0,
            }],
            font_size: 8.0,
        };
        assert!(from_coordinates_item(&item).is_err());

        item.anchors = vec![
            AnchorItem {
                anchor: "ILA1".to_string(),
                x: 1.0,
                y: 1.0,
            },
            AnchorItem {
                anchor: "ila1".to_string(),
                x: 2.0,
                y: 2.0,
            },
        ];
        assert!(from_coordinates_item(&item).is_err());
    }
}
