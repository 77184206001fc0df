//! Persistence adapter: moves collections between the entity store and the
//! key-value backend.
//!
//! Each collection is stored independently as JSON under a session-namespaced
//! key. Nothing here is fatal: a missing session skips the write, and a read
//! that fails or does not parse counts as absent.

use crate::store::EntityStore;
use library_storage::{KeyValueStorage, SessionProvider, StorageKeys};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Which collections a commit touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changed {
    pub students: bool,
    pub seats: bool,
    pub transactions: bool,
    pub activity: bool,
    pub notifications: bool,
}

impl Changed {
    pub fn all() -> Self {
        Self {
            students: true,
            seats: true,
            transactions: true,
            activity: true,
            notifications: true,
        }
    }

    pub fn any(&self) -> bool {
        self.students || self.seats || self.transactions || self.activity || self.notifications
    }
}

/// Collections as read from storage; `None` means absent or unreadable.
#[derive(Debug, Default)]
pub struct LoadedSnapshot {
    pub students: Option<Vec<crate::types::Student>>,
    pub seats: Option<Vec<crate::types::Seat>>,
    pub transactions: Option<Vec<crate::types::FeeTransaction>>,
    pub activity: Option<Vec<crate::types::ActivityLogEntry>>,
    pub notifications: Option<Vec<crate::types::NotificationLogEntry>>,
}

pub struct Persistence {
    storage: Arc<dyn KeyValueStorage>,
    session: Arc<dyn SessionProvider>,
}

impl Persistence {
    pub fn new(storage: Arc<dyn KeyValueStorage>, session: Arc<dyn SessionProvider>) -> Self {
        Self { storage, session }
    }

    /// Returns true if a session is available to namespace keys.
    pub fn has_session(&self) -> bool {
        self.session.current_session_id().is_some()
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let scoped = self.session.scoped_key(key)?;
        let raw = match self.storage.get(&scoped) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %scoped, error = %e, "Failed to read collection, treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %scoped, error = %e, "Corrupt collection, treating as absent");
                None
            }
        }
    }

    fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let Some(scoped) = self.session.scoped_key(key) else {
            debug!(key = %key, "No session, skipping save");
            return;
        };
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %scoped, error = %e, "Failed to serialize collection");
                return;
            }
        };
        if let Err(e) = self.storage.set(&scoped, &json) {
            warn!(key = %scoped, error = %e, "Failed to save collection");
        }
    }

    /// Reads every collection for the current session.
    pub fn load_snapshot(&self) -> LoadedSnapshot {
        LoadedSnapshot {
            students: self.load(StorageKeys::STUDENTS),
            seats: self.load(StorageKeys::SEATS),
            transactions: self.load(StorageKeys::TRANSACTIONS),
            activity: self.load(StorageKeys::ACTIVITY),
            notifications: self.load(StorageKeys::NOTIFICATIONS),
        }
    }

    /// Writes the collections flagged in `changed`.
    pub fn save_changed(&self, store: &EntityStore, changed: Changed) {
        if changed.students {
            self.save(StorageKeys::STUDENTS, store.students());
        }
        if changed.seats {
            self.save(StorageKeys::SEATS, store.seats());
        }
        if changed.transactions {
            self.save(StorageKeys::TRANSACTIONS, store.transactions());
        }
        if changed.activity {
            self.save(StorageKeys::ACTIVITY, store.activity());
        }
        if changed.notifications {
            self.save(StorageKeys::NOTIFICATIONS, store.notifications());
        }
    }
}
