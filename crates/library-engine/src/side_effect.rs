//! Side-effect contracts for the library engine.
//!
//! Side-effects are emitted after a mutation has been committed to the entity
//! store and handed to persistence. They represent observable consequences of
//! state changes.
//!
//! # Design Principles
//!
//! - The engine emits side-effects
//! - The sink decides what they mean
//! - A failing sink never fails the mutation
//! - Recovery emits nothing

use crate::types::{NotificationKind, StudentId};
use thiserror::Error;

/// A side-effect emitted by the engine after committing a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    /// A student was registered.
    StudentAdded { student_id: StudentId },
    /// A student's fields changed.
    StudentUpdated { student_id: StudentId },
    /// A student was removed.
    StudentDeleted { student_id: StudentId },
    /// A seat became occupied.
    SeatAssigned {
        seat_number: u16,
        student_id: StudentId,
    },
    /// A seat became vacant.
    SeatReleased {
        seat_number: u16,
        student_id: Option<StudentId>,
    },
    /// A fee payment was recorded.
    PaymentRecorded {
        transaction_id: String,
        student_id: StudentId,
        receipt_number: String,
    },
    /// A message should be delivered to a student.
    NotificationRequested {
        notification_id: String,
        student_id: StudentId,
        mobile: String,
        message: String,
        kind: NotificationKind,
    },
    /// New students were appended from the import source.
    StudentsImported { count: usize },
}

/// Error reported by a sink that could not accept a side-effect.
#[derive(Debug, Error)]
pub enum SideEffectError {
    #[error("Side-effect sink closed")]
    Closed,

    #[error("Side-effect rejected: {0}")]
    Rejected(String),
}

/// A sink that receives side-effects from the engine.
///
/// Implementations decide how to handle side-effects (e.g., queue outbound
/// messages, log events).
pub trait SideEffectSink: Send + Sync {
    /// Emit a side-effect.
    ///
    /// Errors are logged by the engine and otherwise ignored.
    fn emit(&self, effect: SideEffect) -> Result<(), SideEffectError>;
}

impl<T: SideEffectSink + ?Sized> SideEffectSink for std::sync::Arc<T> {
    fn emit(&self, effect: SideEffect) -> Result<(), SideEffectError> {
        (**self).emit(effect)
    }
}

/// A no-op sink that discards all side-effects.
#[derive(Debug, Default)]
pub struct NullSink;

impl SideEffectSink for NullSink {
    fn emit(&self, _effect: SideEffect) -> Result<(), SideEffectError> {
        Ok(())
    }
}

/// A sink that records all side-effects for testing.
#[derive(Debug, Default)]
pub struct RecordingSink {
    effects: std::sync::Mutex<Vec<SideEffect>>,
}

impl RecordingSink {
    /// Creates a new recording sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded side-effects.
    pub fn effects(&self) -> Vec<SideEffect> {
        self.effects.lock().expect("lock poisoned").clone()
    }

    /// Clears all recorded side-effects.
    pub fn clear(&self) {
        self.effects.lock().expect("lock poisoned").clear();
    }

    /// Returns the number of recorded side-effects.
    pub fn len(&self) -> usize {
        self.effects.lock().expect("lock poisoned").len()
    }

    /// Returns true if no side-effects have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SideEffectSink for RecordingSink {
    fn emit(&self, effect: SideEffect) -> Result<(), SideEffectError> {
        self.effects.lock().expect("lock poisoned").push(effect);
        Ok(())
    }
}
