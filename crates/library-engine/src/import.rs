//! Import contract.
//!
//! The engine only consumes the output shape; fetching and normalising rows
//! lives in a separate adapter crate.

use crate::types::Student;
use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by an import source.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to fetch student data: {0}")]
    Fetch(String),

    #[error("Failed to parse student data: {0}")]
    Parse(String),
}

/// Produces candidate students from an external source.
///
/// Candidates carry synthesized ids, `status = active` and a zero fee total.
/// A reachable source with no valid rows yields an empty list, not an error.
#[async_trait]
pub trait ImportSource: Send + Sync {
    async fn fetch_students(&self) -> Result<Vec<Student>, ImportError>;
}

/// A fixed list of candidates.
#[derive(Debug, Clone, Default)]
pub struct StaticImportSource {
    students: Vec<Student>,
}

impl StaticImportSource {
    pub fn new(students: Vec<Student>) -> Self {
        Self { students }
    }

    /// A source that never yields anything.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImportSource for StaticImportSource {
    async fn fetch_students(&self) -> Result<Vec<Student>, ImportError> {
        Ok(self.students.clone())
    }
}
