//! # Library engine
//!
//! Keeps students, seats and fee transactions mutually consistent, derives
//! dashboard views, and emits side-effects.
//!
//! ## Non-negotiable Principles
//!
//! - **The entity store is the only canonical state** - Every write replaces whole collections
//! - **Seat and student always point at each other** - One routine each for occupy and vacate
//! - **Every mutation leaves an activity entry** - Capped at 50, newest first
//! - **Side-effects reflect committed reality** - Emitted after commit and save
//! - **Recovery emits nothing** - Open = load, seed, reconcile
//!
//! ## Architecture
//!
//! ```text
//! WRITE:
//!   draft → commit → persist → side-effect
//!
//! READ:
//!   snapshot → derived view
//!
//! OPEN:
//!   storage (or import source) → reconcile → serve
//! ```
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use library_engine::{
//!     LibraryEngine, LibraryReader, LibraryWriter, NewStudent, RecordingSink, StudentStatus,
//! };
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let engine = LibraryEngine::in_memory(RecordingSink::new()).await;
//!
//! let day = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
//! let student = engine
//!     .add_student(NewStudent {
//!         name: "A".to_string(),
//!         mobile: "9000000001".to_string(),
//!         email: None,
//!         parent_name: "P".to_string(),
//!         parent_mobile: "9000000002".to_string(),
//!         address: None,
//!         vehicle_number: None,
//!         photo: None,
//!         registration_date: day,
//!         fee_expiry_date: day,
//!         status: StudentStatus::Active,
//!     })
//!     .unwrap();
//!
//! assert!(engine.assign_seat(5, &student.id).unwrap());
//! assert_eq!(engine.dashboard_stats(day).occupied_seats, 1);
//! assert_eq!(engine.sink().len(), 2); // StudentAdded + SeatAssigned
//! # });
//! ```
//!
//! ## Crate Structure
//!
//! - [`engine`] - The engine (brain)
//! - [`reader`] - Read-side trait
//! - [`writer`] - Write-side trait
//! - [`side_effect`] - Side-effect contracts
//! - [`types`] - Core types
//! - [`store`] - The entity store
//! - [`views`] - Dashboard stats and reports
//! - [`notification`] - Message templates
//! - [`import`] - Import source contract

mod draft;
pub mod engine;
pub mod import;
pub mod notification;
mod persistence;
pub mod reader;
pub mod side_effect;
pub mod store;
pub mod types;
pub mod views;
pub mod writer;

#[cfg(test)]
mod tests;

pub use engine::LibraryEngine;
pub use import::{ImportError, ImportSource, StaticImportSource};
pub use reader::LibraryReader;
pub use side_effect::{NullSink, RecordingSink, SideEffect, SideEffectError, SideEffectSink};
pub use store::EntityStore;
pub use types::{
    ActivityKind, ActivityLogEntry, DispatchMethod, FeeTransaction, NewStudent, NewTransaction,
    NotificationKind, NotificationLogEntry, PaymentMode, Seat, Student, StudentId, StudentStatus,
    StudentUpdate, ACTIVITY_LOG_CAPACITY, NOTIFICATION_LOG_CAPACITY, SEAT_COUNT,
};
pub use views::{ActivityView, DashboardStats};
pub use writer::LibraryWriter;

use thiserror::Error;

/// Errors that can occur in the library engine.
///
/// Unknown ids and seats are not errors; writes report them as no-ops.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// A write was attempted while an import is pending.
    #[error("Library data is loading, try again once the import finishes")]
    Loading,

    /// The import source failed.
    #[error(transparent)]
    Import(#[from] ImportError),
}

/// Result type for library operations.
pub type LibraryResult<T> = Result<T, LibraryError>;
