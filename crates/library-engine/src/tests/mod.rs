//! Integration tests for the library engine.
//!
//! - `seating.rs`       - Seat/student link, assign and release
//! - `students.rs`      - Registration, updates, deletion
//! - `payments.rs`      - Fee transactions and receipts
//! - `activity.rs`      - Activity log capacity and ordering
//! - `notifications.rs` - Notification log and dispatch requests
//! - `persistence.rs`   - Recovery, seeding, corrupt data, sessions
//! - `import.rs`        - Import refresh and the loading state
//! - `failures.rs`      - Failing sinks and import sources

mod failures;
mod notifications;
mod payments;
mod persistence;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use library_storage::{MemoryStorage, StaticSession};

use crate::import::{ImportError, ImportSource, StaticImportSource};
use crate::reader::LibraryReader;
use crate::side_effect::{RecordingSink, SideEffect, SideEffectError, SideEffectSink};
use crate::types::{
    NewStudent, NewTransaction, PaymentMode, Student, StudentId, StudentStatus,
};
use crate::writer::LibraryWriter;
use crate::LibraryEngine;

pub(crate) const OWNER: &str = "owner";

pub(crate) fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn new_student(name: &str) -> NewStudent {
    NewStudent {
        name: name.to_string(),
        mobile: "9000000001".to_string(),
        email: None,
        parent_name: "Parent".to_string(),
        parent_mobile: "9000000002".to_string(),
        address: None,
        vehicle_number: None,
        photo: None,
        registration_date: day(2025, 1, 1),
        fee_expiry_date: day(2025, 1, 31),
        status: StudentStatus::Active,
    }
}

/// A candidate as an import source would produce it.
pub(crate) fn imported(id: &str, name: &str) -> Student {
    Student {
        id: StudentId::from(id),
        name: name.to_string(),
        mobile: "9111111111".to_string(),
        email: None,
        parent_name: "Not Provided".to_string(),
        parent_mobile: "9111111111".to_string(),
        address: None,
        vehicle_number: None,
        photo: None,
        seat_number: None,
        registration_date: day(2025, 1, 1),
        fee_expiry_date: day(2025, 1, 31),
        last_fee_payment: None,
        status: StudentStatus::Active,
        payment_mode: None,
        total_fees_paid: 0,
    }
}

pub(crate) fn payment(student: &Student, amount: u64) -> NewTransaction {
    NewTransaction {
        student_id: student.id.clone(),
        student_name: student.name.clone(),
        amount,
        payment_mode: PaymentMode::Offline,
        payment_method: "Cash".to_string(),
        transaction_date: day(2025, 2, 1),
        expiry_date: day(2025, 3, 1),
    }
}

/// Opens an engine for [`OWNER`] over `storage`.
pub(crate) async fn open_with<I>(storage: Arc<MemoryStorage>, importer: I) -> LibraryEngine<RecordingSink>
where
    I: ImportSource + 'static,
{
    LibraryEngine::open(
        storage,
        Arc::new(StaticSession::signed_in(OWNER)),
        Arc::new(importer),
        RecordingSink::new(),
    )
    .await
}

pub(crate) async fn fresh_engine() -> LibraryEngine<RecordingSink> {
    open_with(Arc::new(MemoryStorage::new()), StaticImportSource::empty()).await
}

/// Panics unless every seat and student point at each other.
pub(crate) fn assert_seat_links<S: SideEffectSink>(engine: &LibraryEngine<S>) {
    assert!(
        engine.snapshot().seat_links_consistent(),
        "seat/student links diverged"
    );
}

/// Import source that always fails.
pub(crate) struct FailingImportSource;

#[async_trait]
impl ImportSource for FailingImportSource {
    async fn fetch_students(&self) -> Result<Vec<Student>, ImportError> {
        Err(ImportError::Fetch("HTTP error! status: 503".to_string()))
    }
}

/// Sink that rejects everything.
#[derive(Default)]
pub(crate) struct FailingSink;

impl SideEffectSink for FailingSink {
    fn emit(&self, _effect: SideEffect) -> Result<(), SideEffectError> {
        Err(SideEffectError::Closed)
    }
}

/// Basic workflow test demonstrating core functionality.
#[tokio::test]
async fn basic_workflow() {
    let engine = fresh_engine().await;
    assert!(engine.sink().is_empty());

    let student = engine.add_student(new_student("A")).unwrap();
    assert!(engine.assign_seat(5, &student.id).unwrap());
    engine.add_transaction(payment(&student, 500)).unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.students().len(), 1);
    assert_eq!(snapshot.transactions()[0].receipt_number, "RCP001");
    assert_eq!(snapshot.activity().len(), 3);
    assert_seat_links(&engine);

    let effects = engine.sink().effects();
    assert!(matches!(effects[0], SideEffect::StudentAdded { .. }));
    assert!(matches!(effects[1], SideEffect::SeatAssigned { seat_number: 5, .. }));
    assert!(matches!(effects[2], SideEffect::PaymentRecorded { .. }));
    assert!(matches!(effects[3], SideEffect::NotificationRequested { .. }));
}
