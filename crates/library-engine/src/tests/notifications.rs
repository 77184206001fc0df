//! Notification log and dispatch requests.

use super::*;
use crate::types::{ActivityKind, DispatchMethod, NotificationKind};
use crate::NOTIFICATION_LOG_CAPACITY;

#[tokio::test]
async fn send_logs_and_requests_delivery() {
    let engine = fresh_engine().await;
    let a = engine.add_student(new_student("A")).unwrap();
    engine.sink().clear();

    let entry = engine
        .send_notification(&a.id, NotificationKind::Goodbye, None)
        .unwrap()
        .unwrap();

    assert_eq!(entry.student_id, a.id);
    assert_eq!(entry.method, DispatchMethod::WhatsappRedirect);
    assert!(entry.message.starts_with("Dear A, thank you"));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.notifications()[0], entry);
    assert_eq!(snapshot.activity()[0].kind, ActivityKind::Reminder);
    assert_eq!(snapshot.activity()[0].message, "Goodbye message sent to A");

    assert_eq!(
        engine.sink().effects(),
        vec![SideEffect::NotificationRequested {
            notification_id: entry.id.clone(),
            student_id: a.id.clone(),
            mobile: "9000000001".to_string(),
            message: entry.message.clone(),
            kind: NotificationKind::Goodbye,
        }]
    );
}

#[tokio::test]
async fn send_to_unknown_student_is_a_noop() {
    let engine = fresh_engine().await;

    let entry = engine
        .send_notification(&StudentId::from("missing"), NotificationKind::Welcome, None)
        .unwrap();

    assert!(entry.is_none());
    assert!(engine.snapshot().notifications().is_empty());
    assert!(engine.sink().is_empty());
}

#[tokio::test]
async fn custom_template_replaces_name() {
    let engine = fresh_engine().await;
    let a = engine.add_student(new_student("Asha")).unwrap();

    let entry = engine
        .send_notification(
            &a.id,
            NotificationKind::Custom,
            Some("Hi {name}, the library is closed tomorrow. See you, {name}!"),
        )
        .unwrap()
        .unwrap();

    assert_eq!(
        entry.message,
        "Hi Asha, the library is closed tomorrow. See you, Asha!"
    );
}

#[tokio::test]
async fn bulk_skips_unknown_ids_and_logs_one_summary() {
    let engine = fresh_engine().await;
    let a = engine.add_student(new_student("A")).unwrap();
    let b = engine.add_student(new_student("B")).unwrap();
    let activity_before = engine.snapshot().activity().len();

    let sent = engine
        .send_bulk_notification(
            &[a.id.clone(), StudentId::from("missing"), b.id.clone()],
            NotificationKind::FeeReminder,
            None,
        )
        .unwrap();

    assert_eq!(sent, 2);
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.notifications().len(), 2);
    assert_eq!(snapshot.notifications()[0].student_name, "B");
    assert_eq!(snapshot.activity().len(), activity_before + 1);
    assert_eq!(
        snapshot.activity()[0].message,
        "Fee reminder message sent to 2 student(s)"
    );
}

#[tokio::test]
async fn bulk_template_overrides_any_kind() {
    let engine = fresh_engine().await;
    let a = engine.add_student(new_student("Asha")).unwrap();
    let b = engine.add_student(new_student("Ravi")).unwrap();

    let sent = engine
        .send_bulk_notification(
            &[a.id.clone(), b.id.clone()],
            NotificationKind::FeeReminder,
            Some("Library closed tomorrow, {name}."),
        )
        .unwrap();

    assert_eq!(sent, 2);
    let snapshot = engine.snapshot();
    assert_eq!(
        snapshot.notifications()[0].message,
        "Library closed tomorrow, Ravi."
    );
    assert_eq!(
        snapshot.notifications()[1].message,
        "Library closed tomorrow, Asha."
    );
    assert_eq!(snapshot.notifications()[0].kind, NotificationKind::FeeReminder);
}

#[tokio::test]
async fn bulk_blank_template_falls_back_to_kind() {
    let engine = fresh_engine().await;
    let a = engine.add_student(new_student("Asha")).unwrap();

    engine
        .send_bulk_notification(&[a.id.clone()], NotificationKind::Goodbye, Some("  "))
        .unwrap();

    let snapshot = engine.snapshot();
    let message = &snapshot.notifications()[0].message;
    assert!(message.starts_with("Dear Asha, thank you"));
}

#[tokio::test]
async fn bulk_with_no_known_students_changes_nothing() {
    let engine = fresh_engine().await;
    let before = engine.snapshot();

    let sent = engine
        .send_bulk_notification(&[StudentId::from("x")], NotificationKind::Welcome, None)
        .unwrap();

    assert_eq!(sent, 0);
    assert_eq!(engine.snapshot(), before);
}

#[tokio::test]
async fn notification_log_is_capped() {
    let engine = fresh_engine().await;
    let a = engine.add_student(new_student("A")).unwrap();
    let ids = vec![a.id.clone(); NOTIFICATION_LOG_CAPACITY + 10];

    engine
        .send_bulk_notification(&ids, NotificationKind::Custom, None)
        .unwrap();

    assert_eq!(
        engine.snapshot().notifications().len(),
        NOTIFICATION_LOG_CAPACITY
    );
}
