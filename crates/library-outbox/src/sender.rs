//! Single-message delivery with retry.

use crate::link::whatsapp_link;
use crate::{LinkOpener, OutboundMessage, OutboxError, OutboxResult};
use library_config_and_utils::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Sender configuration.
#[derive(Debug, Clone)]
pub struct SenderConfig {
    /// Prefixed to bare 10-digit numbers.
    pub country_code: String,
    /// Initial retry delay in milliseconds.
    pub initial_retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds.
    pub max_retry_delay_ms: u64,
    /// Maximum attempts per message.
    pub max_retries: u32,
    /// Gap between two consecutive deliveries in milliseconds.
    pub dispatch_interval_ms: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            country_code: library_config_and_utils::DEFAULT_COUNTRY_CODE.to_string(),
            initial_retry_delay_ms: 500,
            max_retry_delay_ms: 8000,
            max_retries: library_config_and_utils::DEFAULT_MAX_DISPATCH_RETRIES,
            dispatch_interval_ms: library_config_and_utils::DEFAULT_DISPATCH_INTERVAL_MS,
        }
    }
}

impl From<&Config> for SenderConfig {
    fn from(config: &Config) -> Self {
        Self {
            country_code: config.country_code.clone(),
            max_retries: config.max_dispatch_retries.max(1),
            dispatch_interval_ms: config.dispatch_interval_ms,
            ..Default::default()
        }
    }
}

/// Delivers one message by opening its deep link.
#[derive(Clone)]
pub struct LinkSender {
    config: SenderConfig,
    opener: Arc<dyn LinkOpener>,
}

impl LinkSender {
    pub fn new(config: SenderConfig, opener: Arc<dyn LinkOpener>) -> Self {
        Self { config, opener }
    }

    pub fn config(&self) -> &SenderConfig {
        &self.config
    }

    /// Send a message with retry logic.
    ///
    /// An unusable number fails at once; open failures are retried with
    /// exponential backoff until `max_retries` attempts have been made.
    pub async fn send(&self, message: &OutboundMessage) -> OutboxResult<()> {
        let link = whatsapp_link(&message.mobile, &message.message, &self.config.country_code)?;
        let mut attempt = 0;
        let mut delay = self.config.initial_retry_delay_ms;

        loop {
            attempt += 1;
            debug!(notification_id = %message.notification_id, attempt, "Opening link");

            match self.opener.open(&link) {
                Ok(()) => {
                    info!(
                        notification_id = %message.notification_id,
                        student_id = %message.student_id,
                        "Notification dispatched"
                    );
                    return Ok(());
                }
                Err(e) => {
                    if attempt >= self.config.max_retries {
                        error!(
                            notification_id = %message.notification_id,
                            attempt = attempt,
                            error = %e,
                            "Max retries exceeded"
                        );
                        return Err(OutboxError::MaxRetriesExceeded(
                            message.notification_id.clone(),
                        ));
                    }

                    warn!(
                        notification_id = %message.notification_id,
                        attempt = attempt,
                        delay_ms = delay,
                        error = %e,
                        "Dispatch failed, retrying"
                    );

                    tokio::time::sleep(Duration::from_millis(delay)).await;

                    // Exponential backoff with cap
                    delay = std::cmp::min(delay * 2, self.config.max_retry_delay_ms);
                }
            }
        }
    }
}
