//! Read-side trait for the library engine.
//!
//! Reads are pure and derived.
//!
//! # Design Principles
//!
//! - Reads never touch storage (except on recovery)
//! - Reads never emit side-effects
//! - Aggregates are recomputed from the current snapshot on every call

use crate::store::EntityStore;
use crate::types::{Student, StudentId};
use crate::views::{self, ActivityView, DashboardStats};
use chrono::NaiveDate;

/// A reader for library data.
pub trait LibraryReader {
    /// Returns a copy of the current snapshot.
    fn snapshot(&self) -> EntityStore;

    /// Looks up a single student.
    fn student(&self, id: &StudentId) -> Option<Student>;

    /// True while an import is pending. Writes are refused meanwhile.
    fn is_loading(&self) -> bool;

    /// Message of the most recent load or import failure.
    fn last_error(&self) -> Option<String>;

    /// Dashboard aggregates as of `today`.
    fn dashboard_stats(&self, today: NaiveDate) -> DashboardStats {
        views::dashboard_stats(&self.snapshot(), today)
    }

    /// Newest activity first, at most `limit` entries.
    fn recent_activity(&self, limit: usize) -> Vec<ActivityView> {
        views::recent_activity(self.snapshot().activity(), limit)
    }
}
