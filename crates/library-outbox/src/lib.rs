//! Outbound notification delivery for Library Desk.
//!
//! This crate provides:
//! - `whatsapp_link`: deep-link formatting for a mobile number and message
//! - `LinkOpener`: the client-side "open" step (system handler or recorder)
//! - `LinkSender`: a single delivery with retry and exponential backoff
//! - `OutboxQueue`: a tokio worker that delivers in order with a fixed gap
//! - `OutboxSink`: bridges engine side-effects into the queue

mod error;
mod link;
mod opener;
mod queue;
mod sender;
mod sink;

pub use error::{OutboxError, OutboxResult};
pub use link::{format_number, whatsapp_link};
pub use opener::{LinkOpener, RecordingOpener, SystemOpener};
pub use queue::{OutboundMessage, OutboxHandle, OutboxQueue, QueueStatus};
pub use sender::{LinkSender, SenderConfig};
pub use sink::OutboxSink;
