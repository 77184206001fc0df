//! Recovery, first-run seeding, corrupt data and session scoping.

use super::*;
use library_storage::{KeyValueStorage, StorageKeys};

fn key(collection: &str) -> String {
    StorageKeys::namespaced(collection, OWNER)
}

#[tokio::test]
async fn first_run_seeds_from_import_and_persists() {
    let storage = Arc::new(MemoryStorage::new());
    let importer = StaticImportSource::new(vec![imported("csv-1", "A"), imported("csv-2", "B")]);

    let engine = open_with(storage.clone(), importer).await;

    assert_eq!(engine.snapshot().students().len(), 2);
    assert!(engine.sink().is_empty(), "recovery must not emit");
    assert!(storage.has(&key(StorageKeys::STUDENTS)).unwrap());
    assert!(storage.has(&key(StorageKeys::SEATS)).unwrap());
}

#[tokio::test]
async fn reopen_restores_without_reimporting() {
    let storage = Arc::new(MemoryStorage::new());
    let importer = StaticImportSource::new(vec![imported("csv-1", "A")]);

    {
        let engine = open_with(storage.clone(), importer.clone()).await;
        let b = engine.add_student(new_student("B")).unwrap();
        engine.assign_seat(3, &b.id).unwrap();
        engine.add_transaction(payment(&b, 700)).unwrap();
    }

    let engine = open_with(
        storage,
        StaticImportSource::new(vec![imported("csv-1", "A"), imported("csv-9", "Z")]),
    )
    .await;
    let snapshot = engine.snapshot();

    assert_eq!(snapshot.students().len(), 2);
    assert!(snapshot.seat(3).unwrap().is_occupied);
    assert_eq!(snapshot.transactions().len(), 1);
    assert_eq!(snapshot.activity().len(), 3);
    assert_eq!(snapshot.notifications().len(), 1);
    assert!(engine.sink().is_empty());
}

#[tokio::test]
async fn corrupt_students_fall_back_to_seeding() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(&key(StorageKeys::STUDENTS), "{oops").unwrap();

    let engine = open_with(
        storage,
        StaticImportSource::new(vec![imported("csv-1", "A")]),
    )
    .await;

    assert_eq!(engine.snapshot().students().len(), 1);
    assert!(engine.last_error().is_none());
}

#[tokio::test]
async fn incomplete_seat_list_is_reseeded() {
    let storage = Arc::new(MemoryStorage::new());
    storage.set(&key(StorageKeys::STUDENTS), "[]").unwrap();
    storage
        .set(
            &key(StorageKeys::SEATS),
            r#"[{"number":1,"isOccupied":false},{"number":2,"isOccupied":false}]"#,
        )
        .unwrap();

    let engine = open_with(storage.clone(), StaticImportSource::empty()).await;

    assert_eq!(engine.snapshot().seats().len(), 102);
    let saved = storage.get(&key(StorageKeys::SEATS)).unwrap().unwrap();
    let saved: Vec<crate::types::Seat> = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved.len(), 102);
}

#[tokio::test]
async fn dangling_links_are_repaired_on_open() {
    let storage = Arc::new(MemoryStorage::new());
    let mut seated = imported("s-1", "A");
    seated.seat_number = Some(4);
    storage
        .set(
            &key(StorageKeys::STUDENTS),
            &serde_json::to_string(&vec![seated]).unwrap(),
        )
        .unwrap();

    // Seat 9 claims a student that no longer exists; seat 4 is not marked.
    let mut seats = crate::store::fresh_seats();
    seats[8].is_occupied = true;
    seats[8].student_id = Some(StudentId::from("gone"));
    seats[8].student_name = Some("Gone".to_string());
    storage
        .set(&key(StorageKeys::SEATS), &serde_json::to_string(&seats).unwrap())
        .unwrap();

    let engine = open_with(storage, StaticImportSource::empty()).await;
    let snapshot = engine.snapshot();

    assert!(!snapshot.seat(9).unwrap().is_occupied);
    assert_eq!(
        snapshot.seat(4).unwrap().student_id,
        Some(StudentId::from("s-1"))
    );
    assert_seat_links(&engine);
    assert!(engine.sink().is_empty());
}

#[tokio::test]
async fn anonymous_session_skips_persistence() {
    let storage = Arc::new(MemoryStorage::new());
    let engine = LibraryEngine::open(
        storage.clone(),
        Arc::new(StaticSession::anonymous()),
        Arc::new(StaticImportSource::empty()),
        RecordingSink::new(),
    )
    .await;

    let a = engine.add_student(new_student("A")).unwrap();
    engine.assign_seat(1, &a.id).unwrap();

    assert_eq!(engine.snapshot().students().len(), 1);
    assert!(storage.is_empty());
}

#[tokio::test]
async fn sessions_do_not_share_data() {
    let storage = Arc::new(MemoryStorage::new());
    let engine = open_with(storage.clone(), StaticImportSource::empty()).await;
    engine.add_student(new_student("A")).unwrap();

    let other = LibraryEngine::open(
        storage,
        Arc::new(StaticSession::signed_in("someone-else")),
        Arc::new(StaticImportSource::empty()),
        RecordingSink::new(),
    )
    .await;

    assert!(other.snapshot().students().is_empty());
}

#[tokio::test]
async fn failed_first_import_starts_empty_and_retries_next_open() {
    let storage = Arc::new(MemoryStorage::new());

    let engine = open_with(storage.clone(), FailingImportSource).await;
    assert!(engine.snapshot().students().is_empty());
    assert_eq!(engine.snapshot().seats().len(), 102);
    assert!(engine
        .last_error()
        .unwrap()
        .contains("Failed to fetch student data"));
    assert!(!engine.is_loading());
    assert!(!storage.has(&key(StorageKeys::STUDENTS)).unwrap());

    let engine = open_with(
        storage,
        StaticImportSource::new(vec![imported("csv-1", "A")]),
    )
    .await;
    assert_eq!(engine.snapshot().students().len(), 1);
}
