use efolabel_core::db::open_db_in_memory;
use efolabel_core::{
    BatchRepository, BatchService, ErrorKind, LabelBatch, LabelError, LabelService, LabelType,
    LocalStore, MarkPrintedOutcome, SequenceRepository, SqliteBatchRepository,
    SqliteSequenceRepository,
};
use rusqlite::Connection;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

fn service(conn: &Connection) -> LabelService<SqliteSequenceRepository<'_>, SqliteBatchRepository<'_>> {
    LabelService::new(
        SqliteSequenceRepository::new(conn),
        SqliteBatchRepository::new(conn),
    )
}

#[test]
fn generate_persists_batch_and_labels() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let generated = service
        .generate("PatchCord RIMPORT", 3, Some(" planta-1 "))
        .unwrap();
    let batch = &generated.batch;
    assert_eq!(batch.label_type, LabelType::PatchCordRimport);
    assert_eq!(batch.quantity, 3);
    assert_eq!(batch.codes, vec!["PCR-000001", "PCR-000002", "PCR-000003"]);
    assert_eq!(batch.created_by.as_deref(), Some("planta-1"));
    assert!(!batch.printed);

    let stored = service.batches().get_batch(batch.id).unwrap().unwrap();
    assert_eq!(&stored, batch);

    let labels = service.batches().labels_for_batch(batch.id).unwrap();
    assert_eq!(labels, generated.labels);
    assert!(labels
        .iter()
        .all(|label| label.batch_id == batch.id && !label.printed && label.printed_at.is_none()));
    assert_eq!(
        labels.iter().map(|l| l.code.as_str()).collect::<Vec<_>>(),
        vec!["PCR-000001", "PCR-000002", "PCR-000003"]
    );
}

#[test]
fn mark_printed_is_idempotent_and_keeps_first_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let batch_id = service.generate("Bobina", 2, None).unwrap().batch.id;

    let first = service.mark_printed(batch_id, Some("operador")).unwrap();
    assert_eq!(first, MarkPrintedOutcome::Marked { labels: 2 });
    let after_first = service.batches().labels_for_batch(batch_id).unwrap();

    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = service.mark_printed(batch_id, Some("otro")).unwrap();
    assert_eq!(second, MarkPrintedOutcome::AlreadyPrinted);

    let after_second = service.batches().labels_for_batch(batch_id).unwrap();
    assert_eq!(after_first, after_second);
    assert!(after_second.iter().all(|label| label.printed
        && label.printed_at.is_some()
        && label.printed_by.as_deref() == Some("operador")));
    assert!(service.batches().get_batch(batch_id).unwrap().unwrap().printed);
}

#[test]
fn mark_printed_repairs_labels_left_behind() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let batch_id = service.generate("Pigtail", 3, None).unwrap().batch.id;

    conn.execute(
        "UPDATE label_batches SET printed = 1 WHERE id = ?1;",
        [batch_id.to_string()],
    )
    .unwrap();

    let outcome = service.mark_printed(batch_id, None).unwrap();
    assert_eq!(outcome, MarkPrintedOutcome::Repaired { labels: 3 });
    assert!(service
        .batches()
        .labels_for_batch(batch_id)
        .unwrap()
        .iter()
        .all(|label| label.printed));
}

#[test]
fn unknown_batches_are_reported() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    service.generate("PatchCord", 1, None).unwrap();

    let missing = Uuid::new_v4();
    let err = service.mark_printed(missing, None).unwrap_err();
    assert!(matches!(err, LabelError::BatchNotFound(id) if id == missing));
    assert_eq!(err.kind(), ErrorKind::BatchNotFound);

    let err = service.batches().labels_for_batch(missing).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BatchNotFound);

    let listed = service.batches().list_labels().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].printed);
}

#[test]
fn malformed_batch_ids_are_invalid_input() {
    let conn = open_db_in_memory().unwrap();
    let batches = BatchService::new(SqliteBatchRepository::new(&conn));

    for raw in ["", "   ", "not-a-uuid"] {
        let err = batches.mark_printed_str(raw, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "input `{raw}`");
    }
}

#[test]
fn reissuing_a_code_is_rejected_atomically() {
    let conn = open_db_in_memory().unwrap();
    let batches = BatchService::new(SqliteBatchRepository::new(&conn));

    batches
        .create_batch("PatchCord", 2, vec!["PC-000001".into(), "PC-000002".into()], None)
        .unwrap();
    let err = batches
        .create_batch("PatchCord", 2, vec!["PC-000003".into(), "PC-000002".into()], None)
        .unwrap_err();
    assert!(matches!(err, LabelError::DuplicateCode(ref code) if code == "PC-000002"));

    assert_eq!(batches.list_batches().unwrap().len(), 1);
    assert_eq!(batches.list_labels().unwrap().len(), 2);
}

#[test]
fn create_batch_validates_codes_against_type_and_quantity() {
    let conn = open_db_in_memory().unwrap();
    let batches = BatchService::new(SqliteBatchRepository::new(&conn));

    let count_mismatch = batches
        .create_batch("PatchCord", 2, vec!["PC-000001".into()], None)
        .unwrap_err();
    assert_eq!(count_mismatch.kind(), ErrorKind::InvalidInput);

    let foreign_prefix = batches
        .create_batch("Pigtail", 1, vec!["PC-000001".into()], None)
        .unwrap_err();
    assert_eq!(foreign_prefix.kind(), ErrorKind::InvalidInput);

    let unknown = batches
        .create_batch("Conector", 1, vec!["CN-000001".into()], None)
        .unwrap_err();
    assert_eq!(unknown.kind(), ErrorKind::UnknownLabelType);

    assert!(batches.list_batches().unwrap().is_empty());
}

#[test]
fn listings_are_newest_first_with_ties_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBatchRepository::new(&conn);

    let older = LabelBatch::new(LabelType::Pigtail, vec!["PT-000001".into()], 1_000, None);
    let tie_a = LabelBatch::new(LabelType::Pigtail, vec!["PT-000002".into()], 2_000, None);
    let tie_b = LabelBatch::new(LabelType::Bobina, vec!["BB-000001".into()], 2_000, None);
    for batch in [&older, &tie_a, &tie_b] {
        repo.insert_batch(batch, &batch.derive_labels()).unwrap();
    }

    let ids: Vec<_> = repo.list_batches().unwrap().into_iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![tie_a.id, tie_b.id, older.id]);

    let codes: Vec<_> = repo
        .list_labels()
        .unwrap()
        .into_iter()
        .map(|label| label.code)
        .collect();
    assert_eq!(codes, vec!["PT-000002", "BB-000001", "PT-000001"]);
}

fn generate_for_every_type<S, B>(service: &LabelService<S, B>)
where
    S: SequenceRepository,
    B: BatchRepository,
{
    for label_type in LabelType::ALL {
        for quantity in [1, 7, 1000] {
            service.generate(label_type.as_str(), quantity, None).unwrap();
        }
    }
}

fn assert_codes_unique_and_counters_match<S, B>(service: &LabelService<S, B>)
where
    S: SequenceRepository,
    B: BatchRepository,
{
    let labels = service.batches().list_labels().unwrap();
    assert_eq!(labels.len(), LabelType::ALL.len() * 1008);
    let distinct: HashSet<&str> = labels.iter().map(|label| label.code.as_str()).collect();
    assert_eq!(distinct.len(), labels.len());

    let mut issued: BTreeMap<LabelType, u64> = BTreeMap::new();
    for batch in service.batches().list_batches().unwrap() {
        *issued.entry(batch.label_type).or_insert(0) += u64::from(batch.quantity);
    }
    for label_type in LabelType::ALL {
        assert_eq!(
            issued.get(&label_type).copied().unwrap_or(0),
            service.allocator().last_number(label_type).unwrap(),
            "{label_type}"
        );
    }
}

#[test]
fn codes_stay_unique_across_types_and_batches_in_sqlite() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    generate_for_every_type(&service);
    assert_codes_unique_and_counters_match(&service);
}

#[test]
fn codes_stay_unique_across_types_and_batches_in_local_store() {
    let store = LocalStore::in_memory();
    let service = LabelService::new(&store, &store);

    generate_for_every_type(&service);
    assert_codes_unique_and_counters_match(&service);
}
