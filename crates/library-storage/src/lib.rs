//! Durable key-value storage for Library Desk.
//!
//! This crate provides:
//! - [`KeyValueStorage`]: the backend trait
//! - [`FileStorage`]: one file per key under the data directory
//! - [`MemoryStorage`]: process-local map, for tests and throwaway sessions
//! - [`SessionProvider`]: the active session identity used to namespace keys

mod file;
mod keys;
mod memory;
mod session;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use session::{SessionProvider, StaticSession};
pub use traits::KeyValueStorage;

use library_config_and_utils::Paths;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create the default file-backed storage under the data directory.
pub fn create_storage(paths: &Paths) -> StorageResult<Box<dyn KeyValueStorage>> {
    let storage = FileStorage::open(paths.data_dir())?;
    Ok(Box::new(storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_storage_uses_data_dir() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let storage = create_storage(&paths).unwrap();
        storage.set("library_seats_owner-1", "[]").unwrap();

        assert!(paths.data_dir().is_dir());
        assert_eq!(
            storage.get("library_seats_owner-1").unwrap(),
            Some("[]".to_string())
        );
    }

    #[test]
    fn test_storage_keys_constants() {
        for key in StorageKeys::ALL {
            assert!(!key.is_empty());
        }

        let unique: std::collections::HashSet<_> = StorageKeys::ALL.iter().collect();
        assert_eq!(unique.len(), StorageKeys::ALL.len(), "Storage keys must be unique");
    }

    #[test]
    fn test_namespaced_keys_differ_per_session() {
        let a = StorageKeys::namespaced(StorageKeys::STUDENTS, "owner-a");
        let b = StorageKeys::namespaced(StorageKeys::STUDENTS, "owner-b");

        assert_eq!(a, "library_students_owner-a");
        assert_ne!(a, b);
    }
}
