use efolabel_core::db::{open_db, open_db_in_memory};
use efolabel_core::{
    ErrorKind, LabelError, LabelType, LocalStore, SequenceAllocator, SequenceRepository,
    SqliteSequenceRepository,
};
use std::collections::HashSet;
use std::sync::Arc;

#[test]
fn first_reservations_start_at_one_and_continue() {
    let conn = open_db_in_memory().unwrap();
    let allocator = SequenceAllocator::new(SqliteSequenceRepository::new(&conn));

    let first = allocator.reserve("PatchCord", 3).unwrap();
    assert_eq!(first.codes, vec!["PC-000001", "PC-000002", "PC-000003"]);
    assert_eq!(first.previous_last, 0);
    assert_eq!(first.last(), 3);

    let second = allocator.reserve("PatchCord", 2).unwrap();
    assert_eq!(second.codes, vec!["PC-000004", "PC-000005"]);
    assert_eq!(allocator.last_number(LabelType::PatchCord).unwrap(), 5);
}

#[test]
fn counters_are_independent_per_type() {
    let conn = open_db_in_memory().unwrap();
    let allocator = SequenceAllocator::new(SqliteSequenceRepository::new(&conn));

    allocator.reserve("PatchCord", 4).unwrap();
    let duplex = allocator.reserve("PatchCord Duplex", 1).unwrap();
    assert_eq!(duplex.codes, vec!["PCD-000001"]);

    let repo = SqliteSequenceRepository::new(&conn);
    let numbers = repo.last_numbers().unwrap();
    assert_eq!(numbers.len(), 2);
    assert_eq!(numbers[&LabelType::PatchCord], 4);
    assert_eq!(numbers[&LabelType::PatchCordDuplex], 1);
}

#[test]
fn quantity_bounds_are_enforced_without_consuming_numbers() {
    let conn = open_db_in_memory().unwrap();
    let allocator = SequenceAllocator::new(SqliteSequenceRepository::new(&conn));

    for quantity in [0, 1001] {
        let err = allocator.reserve("Pigtail", quantity).unwrap_err();
        assert!(matches!(err, LabelError::InvalidQuantity { .. }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
    assert_eq!(allocator.last_number(LabelType::Pigtail).unwrap(), 0);

    assert_eq!(allocator.reserve("Pigtail", 1).unwrap().codes, vec!["PT-000001"]);
    let full = allocator.reserve("Pigtail", 1000).unwrap();
    assert_eq!(full.quantity(), 1000);
    assert_eq!(full.codes.first().unwrap(), "PT-000002");
    assert_eq!(full.codes.last().unwrap(), "PT-001001");
}

#[test]
fn unknown_type_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let allocator = SequenceAllocator::new(SqliteSequenceRepository::new(&conn));

    let err = allocator.reserve("Fusion", 5).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownLabelType);
    assert!(SqliteSequenceRepository::new(&conn)
        .last_numbers()
        .unwrap()
        .is_empty());
}

#[test]
fn codes_widen_past_six_digits() {
    let store = LocalStore::in_memory();
    store.advance(LabelType::Bobina, 999_999, 0).unwrap();
    let allocator = SequenceAllocator::new(&store);

    let reservation = allocator.reserve_type(LabelType::Bobina, 2).unwrap();
    assert_eq!(reservation.codes, vec!["BB-1000000", "BB-1000001"]);
    assert_eq!(
        allocator.next_code_preview(LabelType::Bobina).unwrap(),
        "BB-1000002"
    );
}

#[test]
fn concurrent_sqlite_reservations_never_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concurrent.sqlite3");
    drop(open_db(&path).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let path = path.clone();
            std::thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let allocator = SequenceAllocator::new(SqliteSequenceRepository::new(&conn));
                (0..10)
                    .flat_map(|_| allocator.reserve("Pigtail COENTEL", 5).unwrap().codes)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        for code in handle.join().unwrap() {
            assert!(seen.insert(code), "code issued twice");
        }
    }
    assert_eq!(seen.len(), 200);

    let conn = open_db(&path).unwrap();
    let allocator = SequenceAllocator::new(SqliteSequenceRepository::new(&conn));
    assert_eq!(allocator.last_number(LabelType::PigtailCoentel).unwrap(), 200);
    assert!(seen.contains("PTC-000001") && seen.contains("PTC-000200"));
}

#[test]
fn concurrent_local_store_reservations_never_overlap() {
    let store = Arc::new(LocalStore::in_memory());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                let allocator = SequenceAllocator::new(store.as_ref());
                (0..25)
                    .flat_map(|_| allocator.reserve("Bobina", 2).unwrap().codes)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        seen.extend(handle.join().unwrap());
    }
    assert_eq!(seen.len(), 200);
    assert_eq!(store.last_number(LabelType::Bobina).unwrap(), 200);
}
