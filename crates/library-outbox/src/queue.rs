//! Outbox queue: a worker that delivers messages in order.

use crate::{LinkSender, OutboxError, OutboxResult};
use library_engine::{NotificationKind, StudentId};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A message waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub notification_id: String,
    pub student_id: StudentId,
    pub mobile: String,
    pub message: String,
    pub kind: NotificationKind,
}

/// Counters for an outbox queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStatus {
    /// Accepted but not yet attempted.
    pub pending: usize,
    /// Opened successfully.
    pub delivered: usize,
    /// Given up on.
    pub failed: usize,
}

enum Command {
    Deliver(OutboundMessage),
    Shutdown,
}

/// Cheap handle for enqueueing. Never blocks.
#[derive(Clone)]
pub struct OutboxHandle {
    tx: mpsc::UnboundedSender<Command>,
    status: Arc<Mutex<QueueStatus>>,
}

impl OutboxHandle {
    /// Queue a message for delivery.
    pub fn enqueue(&self, message: OutboundMessage) -> OutboxResult<()> {
        let notification_id = message.notification_id.clone();
        self.status.lock().expect("lock poisoned").pending += 1;
        if self.tx.send(Command::Deliver(message)).is_err() {
            self.status.lock().expect("lock poisoned").pending -= 1;
            return Err(OutboxError::Closed);
        }
        debug!(notification_id = %notification_id, "Enqueued notification");
        Ok(())
    }

    /// Current counters.
    pub fn status(&self) -> QueueStatus {
        self.status.lock().expect("lock poisoned").clone()
    }
}

/// Owns the delivery worker.
pub struct OutboxQueue {
    handle: OutboxHandle,
    worker: JoinHandle<()>,
}

impl OutboxQueue {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(sender: LinkSender) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let status = Arc::new(Mutex::new(QueueStatus::default()));
        let worker = tokio::spawn(run(sender, rx, status.clone()));

        Self {
            handle: OutboxHandle { tx, status },
            worker,
        }
    }

    pub fn handle(&self) -> OutboxHandle {
        self.handle.clone()
    }

    pub fn status(&self) -> QueueStatus {
        self.handle.status()
    }

    /// Deliver everything queued so far, then stop the worker.
    ///
    /// Messages enqueued afterwards are rejected with [`OutboxError::Closed`].
    pub async fn shutdown(self) -> QueueStatus {
        if self.handle.tx.send(Command::Shutdown).is_ok() {
            if let Err(e) = self.worker.await {
                warn!(error = %e, "Outbox worker ended abnormally");
            }
        }
        self.handle.status()
    }
}

async fn run(
    sender: LinkSender,
    mut rx: mpsc::UnboundedReceiver<Command>,
    status: Arc<Mutex<QueueStatus>>,
) {
    let interval = Duration::from_millis(sender.config().dispatch_interval_ms);
    let mut first = true;

    while let Some(command) = rx.recv().await {
        let message = match command {
            Command::Deliver(message) => message,
            Command::Shutdown => break,
        };

        if !first && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        first = false;

        let result = sender.send(&message).await;

        let mut counters = status.lock().expect("lock poisoned");
        counters.pending = counters.pending.saturating_sub(1);
        match result {
            Ok(()) => counters.delivered += 1,
            Err(e) => {
                warn!(
                    notification_id = %message.notification_id,
                    error = %e,
                    "Notification dropped"
                );
                counters.failed += 1;
            }
        }
    }

    rx.close();
    info!("Outbox worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecordingOpener, SenderConfig};
    use std::time::Instant;

    fn message(id: &str, mobile: &str) -> OutboundMessage {
        OutboundMessage {
            notification_id: id.to_string(),
            student_id: StudentId::from("s-1"),
            mobile: mobile.to_string(),
            message: format!("msg {id}"),
            kind: NotificationKind::FeeReminder,
        }
    }

    fn config(dispatch_interval_ms: u64) -> SenderConfig {
        SenderConfig {
            initial_retry_delay_ms: 1,
            max_retry_delay_ms: 2,
            max_retries: 2,
            dispatch_interval_ms,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_delivers_in_order() {
        let opener = Arc::new(RecordingOpener::new());
        let queue = OutboxQueue::spawn(LinkSender::new(config(0), opener.clone()));
        let handle = queue.handle();

        handle.enqueue(message("a", "9000000001")).unwrap();
        handle.enqueue(message("b", "9000000002")).unwrap();
        handle.enqueue(message("c", "9000000003")).unwrap();

        let status = queue.shutdown().await;
        assert_eq!(
            status,
            QueueStatus {
                pending: 0,
                delivered: 3,
                failed: 0
            }
        );

        let opened = opener.opened();
        assert!(opened[0].contains("919000000001"));
        assert!(opened[1].contains("919000000002"));
        assert!(opened[2].contains("919000000003"));
    }

    #[tokio::test]
    async fn test_failures_are_counted_not_fatal() {
        let opener = Arc::new(RecordingOpener::new());
        let queue = OutboxQueue::spawn(LinkSender::new(config(0), opener.clone()));
        let handle = queue.handle();

        handle.enqueue(message("bad", "")).unwrap();
        handle.enqueue(message("good", "9000000001")).unwrap();

        let status = queue.shutdown().await;
        assert_eq!(status.failed, 1);
        assert_eq!(status.delivered, 1);
        assert_eq!(opener.opened().len(), 1);
    }

    #[tokio::test]
    async fn test_items_are_spaced_by_interval() {
        let opener = Arc::new(RecordingOpener::new());
        let queue = OutboxQueue::spawn(LinkSender::new(config(30), opener.clone()));
        let handle = queue.handle();

        let started = Instant::now();
        for id in ["a", "b", "c"] {
            handle.enqueue(message(id, "9000000001")).unwrap();
        }
        queue.shutdown().await;

        assert!(started.elapsed() >= Duration::from_millis(60));
        assert_eq!(opener.opened().len(), 3);
    }

    #[tokio::test]
    async fn test_enqueue_after_shutdown_is_rejected() {
        let opener = Arc::new(RecordingOpener::new());
        let queue = OutboxQueue::spawn(LinkSender::new(config(0), opener));
        let handle = queue.handle();

        queue.shutdown().await;

        assert!(matches!(
            handle.enqueue(message("late", "9000000001")),
            Err(OutboxError::Closed)
        ));
        assert_eq!(handle.status().pending, 0);
    }
}
