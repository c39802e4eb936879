use efolabel_core::db::open_db_in_memory;
use efolabel_core::{
    LabelService, LabelStats, LabelType, SqliteBatchRepository, SqliteSequenceRepository,
    StatsService,
};
use rusqlite::Connection;

fn stats(conn: &Connection) -> LabelStats {
    StatsService::new(
        SqliteSequenceRepository::new(conn),
        SqliteBatchRepository::new(conn),
    )
    .compute()
    .unwrap()
}

#[test]
fn empty_store_has_zeroed_statistics() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(stats(&conn), LabelStats::default());
}

#[test]
fn printing_a_batch_moves_labels_from_pending_to_printed() {
    let conn = open_db_in_memory().unwrap();
    let service = LabelService::new(
        SqliteSequenceRepository::new(&conn),
        SqliteBatchRepository::new(&conn),
    );

    let batch = service.generate("PatchCord", 3, None).unwrap().batch;
    let before = stats(&conn);
    assert_eq!(before.total_labels, 3);
    assert_eq!(before.printed_labels, 0);
    assert_eq!(before.pending_labels, 3);

    service.mark_printed(batch.id, None).unwrap();
    let after = stats(&conn);
    assert_eq!(after.total_labels, 3);
    assert_eq!(after.printed_labels, 3);
    assert_eq!(after.pending_labels, 0);
    assert_eq!(after.total_batches, 1);
    assert_eq!(after.printed_batches, 1);
}

#[test]
fn per_type_counts_only_list_types_with_labels() {
    let conn = open_db_in_memory().unwrap();
    let service = LabelService::new(
        SqliteSequenceRepository::new(&conn),
        SqliteBatchRepository::new(&conn),
    );

    service.generate("Bobina", 2, None).unwrap();
    service.generate("Bobina", 1, None).unwrap();
    service.generate("Pigtail RIMPORT", 4, None).unwrap();

    let stats = stats(&conn);
    assert_eq!(stats.labels_by_type.len(), 2);
    assert_eq!(stats.labels_by_type[&LabelType::Bobina], 3);
    assert_eq!(stats.labels_by_type[&LabelType::PigtailRimport], 4);
    assert!(!stats.labels_by_type.contains_key(&LabelType::PatchCord));
    assert_eq!(stats.last_numbers[&LabelType::Bobina], 3);
    assert_eq!(stats.total_batches, 3);
    assert_eq!(stats.pending_labels, 7);
}

#[test]
fn computing_statistics_does_not_write() {
    let conn = open_db_in_memory().unwrap();
    let service = LabelService::new(
        SqliteSequenceRepository::new(&conn),
        SqliteBatchRepository::new(&conn),
    );
    service.generate("Pigtail", 5, None).unwrap();

    let first = stats(&conn);
    let second = stats(&conn);
    assert_eq!(first, second);

    let next = service.generate("Pigtail", 1, None).unwrap();
    assert_eq!(next.batch.codes, vec!["PT-000006"]);
}
