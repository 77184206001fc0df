//! Storage key constants.

/// Base storage keys for the library collections.
///
/// Every key is namespaced per session with [`StorageKeys::namespaced`]
/// before it reaches a backend.
pub struct StorageKeys;

impl StorageKeys {
    /// Students (JSON array)
    pub const STUDENTS: &'static str = "library_students";

    /// Seats (JSON array of exactly 102 entries)
    pub const SEATS: &'static str = "library_seats";

    /// Fee transactions (JSON array, insertion order)
    pub const TRANSACTIONS: &'static str = "library_transactions";

    /// Activity log (JSON array, most recent first)
    pub const ACTIVITY: &'static str = "library_activity";

    /// Notification log (JSON array, most recent first)
    pub const NOTIFICATIONS: &'static str = "library_notifications";

    /// All collection keys, in load order.
    pub const ALL: [&'static str; 5] = [
        Self::STUDENTS,
        Self::SEATS,
        Self::TRANSACTIONS,
        Self::ACTIVITY,
        Self::NOTIFICATIONS,
    ];

    /// Scope a base key to a session: `library_students_<session>`.
    pub fn namespaced(key: &str, session_id: &str) -> String {
        format!("{}_{}", key, session_id)
    }
}
