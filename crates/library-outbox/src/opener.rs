//! The client-side "open" step of a delivery.

use crate::{OutboxError, OutboxResult};
use std::sync::Mutex;
use tracing::info;

/// Hands a deep link to whatever should open it.
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &str) -> OutboxResult<()>;
}

/// Opens links with the operating system's default handler.
#[derive(Debug, Default)]
pub struct SystemOpener;

impl LinkOpener for SystemOpener {
    fn open(&self, url: &str) -> OutboxResult<()> {
        open::that(url).map_err(|e| OutboxError::Open(e.to_string()))?;
        info!(url = %url, "Opened notification link");
        Ok(())
    }
}

/// Records links instead of opening them.
///
/// Can be told to fail a number of attempts first.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
    failures_left: Mutex<u32>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the first `count` attempts.
    pub fn failing(count: u32) -> Self {
        Self {
            opened: Mutex::new(Vec::new()),
            failures_left: Mutex::new(count),
        }
    }

    /// Links opened so far, in order.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("lock poisoned").clone()
    }
}

impl LinkOpener for RecordingOpener {
    fn open(&self, url: &str) -> OutboxResult<()> {
        let mut failures_left = self.failures_left.lock().expect("lock poisoned");
        if *failures_left > 0 {
            *failures_left -= 1;
            return Err(OutboxError::Open("no handler available".to_string()));
        }
        self.opened
            .lock()
            .expect("lock poisoned")
            .push(url.to_string());
        Ok(())
    }
}
