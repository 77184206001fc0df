//! Write-side trait for the library engine.
//!
//! Writes are where reality happens.
//!
//! # Design Principles
//!
//! - Every write computes the next snapshot, then commits it in one step
//! - The committed snapshot is persisted before side-effects are emitted
//! - Invalid references are silent no-ops (`Ok(false)` / `Ok(None)`)
//! - Writes fail only while an import is pending

use crate::types::{
    FeeTransaction, NewStudent, NewTransaction, NotificationKind, NotificationLogEntry, Student,
    StudentId, StudentUpdate,
};
use crate::LibraryResult;

/// A writer for library data.
///
/// All write operations follow the strict order:
/// 1. Compute and commit the next snapshot (with its activity entries)
/// 2. Persist the changed collections
/// 3. Emit side-effects
pub trait LibraryWriter {
    // ========================================================================
    // Students
    // ========================================================================

    /// Registers a student under a fresh id.
    fn add_student(&self, student: NewStudent) -> LibraryResult<Student>;

    /// Merges `update` over an existing student.
    ///
    /// Returns the updated record, or `None` if the id is unknown.
    fn update_student(&self, id: &StudentId, update: StudentUpdate)
        -> LibraryResult<Option<Student>>;

    /// Removes a student, releasing any seat they hold first.
    ///
    /// Returns true if the student existed.
    fn delete_student(&self, id: &StudentId) -> LibraryResult<bool>;

    // ========================================================================
    // Seats
    // ========================================================================

    /// Seats a student.
    ///
    /// Any seat the student already holds and any prior occupant of the
    /// target are released first. Returns false if either side is unknown.
    fn assign_seat(&self, seat_number: u16, student_id: &StudentId) -> LibraryResult<bool>;

    /// Vacates a seat. Returns false if it was not occupied.
    fn release_seat(&self, seat_number: u16) -> LibraryResult<bool>;

    // ========================================================================
    // Fees
    // ========================================================================

    /// Records a payment and applies it to the student.
    ///
    /// A fee confirmation is queued for the student when they exist.
    fn add_transaction(&self, transaction: NewTransaction) -> LibraryResult<FeeTransaction>;

    // ========================================================================
    // Notifications
    // ========================================================================

    /// Queues a message for one student.
    ///
    /// Returns the log entry, or `None` if the student is unknown.
    fn send_notification(
        &self,
        student_id: &StudentId,
        kind: NotificationKind,
        template: Option<&str>,
    ) -> LibraryResult<Option<NotificationLogEntry>>;

    /// Queues a message for each known student in `student_ids`.
    ///
    /// A non-blank `template` is sent instead of the kind's text, whatever
    /// the kind.
    ///
    /// Returns how many students were notified.
    fn send_bulk_notification(
        &self,
        student_ids: &[StudentId],
        kind: NotificationKind,
        template: Option<&str>,
    ) -> LibraryResult<usize>;
}
