//! Fee transactions.

use super::*;
use crate::types::{ActivityKind, NotificationKind};

#[tokio::test]
async fn first_payment_scenario() {
    let engine = fresh_engine().await;
    let a = engine.add_student(new_student("A")).unwrap();

    let recorded = engine.add_transaction(payment(&a, 500)).unwrap();

    assert_eq!(recorded.receipt_number, "RCP001");
    let student = engine.student(&a.id).unwrap();
    assert_eq!(student.total_fees_paid, 500);
    assert_eq!(student.fee_expiry_date, day(2025, 3, 1));
    assert_eq!(student.last_fee_payment, Some(day(2025, 2, 1)));
    assert_eq!(student.payment_mode, Some(PaymentMode::Offline));

    let snapshot = engine.snapshot();
    let entry = &snapshot.activity()[0];
    assert_eq!(entry.kind, ActivityKind::Payment);
    assert_eq!(entry.message, "Fee payment of ₹500 received from A");
}

#[tokio::test]
async fn receipts_are_sequential_and_unique() {
    let engine = fresh_engine().await;
    let a = engine.add_student(new_student("A")).unwrap();

    let receipts: Vec<String> = (0..12)
        .map(|_| engine.add_transaction(payment(&a, 100)).unwrap().receipt_number)
        .collect();

    assert_eq!(receipts[0], "RCP001");
    assert_eq!(receipts[11], "RCP012");
    let unique: std::collections::HashSet<_> = receipts.iter().collect();
    assert_eq!(unique.len(), receipts.len());
    assert!(receipts.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn totals_accumulate() {
    let engine = fresh_engine().await;
    let a = engine.add_student(new_student("A")).unwrap();

    for amount in [0, 500, 1200, 1] {
        let before = engine.student(&a.id).unwrap().total_fees_paid;
        engine.add_transaction(payment(&a, amount)).unwrap();
        assert_eq!(engine.student(&a.id).unwrap().total_fees_paid, before + amount);
    }
    assert_eq!(engine.student(&a.id).unwrap().total_fees_paid, 1701);
}

#[tokio::test]
async fn totals_saturate_instead_of_wrapping() {
    let engine = fresh_engine().await;
    let a = engine.add_student(new_student("A")).unwrap();

    engine.add_transaction(payment(&a, u64::MAX - 1)).unwrap();
    engine.add_transaction(payment(&a, 10)).unwrap();

    assert_eq!(engine.student(&a.id).unwrap().total_fees_paid, u64::MAX);
}

#[tokio::test]
async fn payment_queues_fee_confirmation() {
    let engine = fresh_engine().await;
    let a = engine.add_student(new_student("A")).unwrap();

    let recorded = engine.add_transaction(payment(&a, 500)).unwrap();

    let snapshot = engine.snapshot();
    let logged = &snapshot.notifications()[0];
    assert_eq!(logged.kind, NotificationKind::FeeConfirmation);
    assert_eq!(logged.mobile, "9000000001");
    assert!(logged.message.contains("₹500"));
    assert!(logged.message.contains("1/3/2025"));

    let effects = engine.sink().effects();
    assert!(effects.contains(&SideEffect::PaymentRecorded {
        transaction_id: recorded.id.clone(),
        student_id: a.id.clone(),
        receipt_number: "RCP001".to_string(),
    }));
    assert!(effects.iter().any(|e| matches!(
        e,
        SideEffect::NotificationRequested { kind: NotificationKind::FeeConfirmation, .. }
    )));
    // The confirmation is not an activity of its own.
    assert_eq!(snapshot.activity().len(), 2);
}

#[tokio::test]
async fn payment_for_unknown_student_is_still_recorded() {
    let engine = fresh_engine().await;
    let ghost = imported("ghost", "Ghost");

    let recorded = engine.add_transaction(payment(&ghost, 250)).unwrap();

    let snapshot = engine.snapshot();
    assert_eq!(recorded.receipt_number, "RCP001");
    assert_eq!(snapshot.transactions().len(), 1);
    assert!(snapshot.students().is_empty());
    assert!(snapshot.notifications().is_empty());
    assert_eq!(snapshot.activity()[0].message, "Fee payment of ₹250 received from Ghost");
}

#[tokio::test]
async fn transaction_keeps_name_at_time_of_payment() {
    let engine = fresh_engine().await;
    let a = engine.add_student(new_student("A")).unwrap();
    engine.add_transaction(payment(&a, 500)).unwrap();

    engine
        .update_student(
            &a.id,
            crate::types::StudentUpdate {
                name: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(engine.snapshot().transactions()[0].student_name, "A");
}
