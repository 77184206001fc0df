//! Bridges engine side-effects into the outbox.

use crate::{OutboundMessage, OutboxError, OutboxHandle};
use library_engine::{SideEffect, SideEffectError, SideEffectSink};
use tracing::debug;

/// Queues `NotificationRequested` effects; logs the rest.
#[derive(Clone)]
pub struct OutboxSink {
    handle: OutboxHandle,
}

impl OutboxSink {
    pub fn new(handle: OutboxHandle) -> Self {
        Self { handle }
    }
}

impl SideEffectSink for OutboxSink {
    fn emit(&self, effect: SideEffect) -> Result<(), SideEffectError> {
        match effect {
            SideEffect::NotificationRequested {
                notification_id,
                student_id,
                mobile,
                message,
                kind,
            } => self
                .handle
                .enqueue(OutboundMessage {
                    notification_id,
                    student_id,
                    mobile,
                    message,
                    kind,
                })
                .map_err(|e| match e {
                    OutboxError::Closed => SideEffectError::Closed,
                    other => SideEffectError::Rejected(other.to_string()),
                }),
            other => {
                debug!(effect = ?other, "Side-effect observed");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LinkSender, OutboxQueue, RecordingOpener, SenderConfig};
    use library_engine::{
        LibraryEngine, LibraryWriter, NewStudent, NotificationKind, StudentId, StudentStatus,
    };
    use std::sync::Arc;

    fn fast_sender(opener: Arc<RecordingOpener>) -> LinkSender {
        LinkSender::new(
            SenderConfig {
                initial_retry_delay_ms: 1,
                max_retry_delay_ms: 1,
                dispatch_interval_ms: 0,
                ..Default::default()
            },
            opener,
        )
    }

    #[tokio::test]
    async fn test_only_notifications_are_queued() {
        let opener = Arc::new(RecordingOpener::new());
        let queue = OutboxQueue::spawn(fast_sender(opener.clone()));
        let sink = OutboxSink::new(queue.handle());

        sink.emit(SideEffect::StudentsImported { count: 2 }).unwrap();
        sink.emit(SideEffect::NotificationRequested {
            notification_id: "n-1".to_string(),
            student_id: StudentId::from("s-1"),
            mobile: "9000000001".to_string(),
            message: "Hi".to_string(),
            kind: NotificationKind::Welcome,
        })
        .unwrap();

        let status = queue.shutdown().await;
        assert_eq!(status.delivered, 1);
        assert_eq!(
            opener.opened(),
            vec!["https://wa.me/919000000001?text=Hi".to_string()]
        );
    }

    #[tokio::test]
    async fn test_closed_queue_maps_to_closed_sink() {
        let queue = OutboxQueue::spawn(fast_sender(Arc::new(RecordingOpener::new())));
        let sink = OutboxSink::new(queue.handle());
        queue.shutdown().await;

        let result = sink.emit(SideEffect::NotificationRequested {
            notification_id: "n-1".to_string(),
            student_id: StudentId::from("s-1"),
            mobile: "9000000001".to_string(),
            message: "Hi".to_string(),
            kind: NotificationKind::Welcome,
        });
        assert!(matches!(result, Err(SideEffectError::Closed)));
    }

    #[tokio::test]
    async fn test_payment_opens_fee_confirmation() {
        let opener = Arc::new(RecordingOpener::new());
        let queue = OutboxQueue::spawn(fast_sender(opener.clone()));
        let engine = LibraryEngine::in_memory(OutboxSink::new(queue.handle())).await;

        let day = chrono::NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let student = engine
            .add_student(NewStudent {
                name: "Asha".to_string(),
                mobile: "9876543210".to_string(),
                email: None,
                parent_name: "Ravi".to_string(),
                parent_mobile: "9876543211".to_string(),
                address: None,
                vehicle_number: None,
                photo: None,
                registration_date: day,
                fee_expiry_date: day,
                status: StudentStatus::Active,
            })
            .unwrap();
        engine
            .add_transaction(library_engine::NewTransaction {
                student_id: student.id.clone(),
                student_name: student.name.clone(),
                amount: 500,
                payment_mode: library_engine::PaymentMode::Online,
                payment_method: "UPI".to_string(),
                transaction_date: day,
                expiry_date: day,
            })
            .unwrap();

        drop(engine);
        let status = queue.shutdown().await;
        assert_eq!(status.delivered, 1);
        assert!(opener.opened()[0].starts_with("https://wa.me/919876543210?text=Dear%20Asha"));
    }
}
