//! Failing collaborators never fail a mutation.

use super::*;

#[tokio::test]
async fn rejected_side_effects_do_not_fail_writes() {
    let engine = LibraryEngine::open(
        Arc::new(MemoryStorage::new()),
        Arc::new(StaticSession::signed_in(OWNER)),
        Arc::new(StaticImportSource::empty()),
        FailingSink,
    )
    .await;

    let a = engine.add_student(new_student("A")).unwrap();
    assert!(engine.assign_seat(2, &a.id).unwrap());
    let recorded = engine.add_transaction(payment(&a, 500)).unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(recorded.receipt_number, "RCP001");
    assert_eq!(snapshot.student(&a.id).unwrap().total_fees_paid, 500);
    assert_eq!(snapshot.notifications().len(), 1);
    assert!(snapshot.seat(2).unwrap().is_occupied);
}

#[tokio::test]
async fn null_sink_engine_works() {
    let engine = LibraryEngine::in_memory(crate::side_effect::NullSink).await;
    let a = engine.add_student(new_student("A")).unwrap();
    assert!(engine.delete_student(&a.id).unwrap());
}
