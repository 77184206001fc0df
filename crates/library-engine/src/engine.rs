//! The library engine: keeps students, seats and fees mutually consistent.
//!
//! # Write Path (strict order)
//!
//! 1. Refuse if an import is pending
//! 2. Compute the next snapshot on a draft and commit it
//! 3. Persist the changed collections
//! 4. Emit side-effects
//!
//! Side-effects always observe committed state; a failing sink is logged and
//! ignored.
//!
//! # Recovery (silent)
//!
//! On open:
//! 1. Load every collection for the session
//! 2. Seed students from the import source if none were ever saved
//! 3. Reseed seats if the saved list is not the full seat universe
//! 4. Rebuild seat occupancy from student seat numbers
//!
//! Recovery emits NO side-effects.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{Local, NaiveDate};
use library_storage::{KeyValueStorage, MemoryStorage, SessionProvider, StaticSession};
use tracing::{debug, error, info, warn};

use crate::draft::Draft;
use crate::import::{ImportSource, StaticImportSource};
use crate::notification;
use crate::persistence::{Changed, Persistence};
use crate::reader::LibraryReader;
use crate::side_effect::{SideEffect, SideEffectSink};
use crate::store::{fresh_seats, is_seat_universe, reconcile_seat_links, EntityStore};
use crate::types::{
    receipt_number, ActivityKind, FeeTransaction, NewStudent, NewTransaction, NotificationKind,
    NotificationLogEntry, Student, StudentId, StudentUpdate, ACTIVITY_LOG_CAPACITY,
    NOTIFICATION_LOG_CAPACITY,
};
use crate::writer::LibraryWriter;
use crate::{LibraryError, LibraryResult};

/// Session id used by [`LibraryEngine::in_memory`].
const IN_MEMORY_SESSION: &str = "local";

/// The library engine.
///
/// Coordinates the entity store, persistence, and side-effects.
pub struct LibraryEngine<S: SideEffectSink> {
    persistence: Persistence,
    importer: Arc<dyn ImportSource>,
    sink: Arc<S>,
    store: RwLock<EntityStore>,
    loading: AtomicBool,
    last_error: RwLock<Option<String>>,
}

/// Holds the loading flag for the duration of an import.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: SideEffectSink> LibraryEngine<S> {
    /// Opens the engine for the current session.
    ///
    /// This performs recovery: collections are loaded from storage, seeded
    /// where absent, and reconciled. No side-effects are emitted.
    pub async fn open(
        storage: Arc<dyn KeyValueStorage>,
        session: Arc<dyn SessionProvider>,
        importer: Arc<dyn ImportSource>,
        sink: S,
    ) -> Self {
        let engine = Self {
            persistence: Persistence::new(storage, session),
            importer,
            sink: Arc::new(sink),
            store: RwLock::new(EntityStore::fresh()),
            loading: AtomicBool::new(false),
            last_error: RwLock::new(None),
        };

        engine.recover().await;
        engine
    }

    /// Creates an engine over in-memory storage with an empty import source.
    ///
    /// Useful for testing.
    pub async fn in_memory(sink: S) -> Self {
        Self::open(
            Arc::new(MemoryStorage::new()),
            Arc::new(StaticSession::signed_in(IN_MEMORY_SESSION)),
            Arc::new(StaticImportSource::empty()),
            sink,
        )
        .await
    }

    /// Returns a reference to the side-effect sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    async fn recover(&self) {
        let _guard = LoadingGuard::acquire(&self.loading);
        info!("library: starting recovery");
        if !self.persistence.has_session() {
            debug!("library: no session, changes will not be saved");
        }

        let loaded = self.persistence.load_snapshot();
        let mut changed = Changed::default();

        let mut students = match loaded.students {
            Some(students) => students,
            None => match self.importer.fetch_students().await {
                Ok(fetched) => {
                    info!(count = fetched.len(), "library: seeded students from import source");
                    changed.students = true;
                    dedupe_by_id(fetched)
                }
                Err(e) => {
                    error!(error = %e, "library: initial import failed, starting empty");
                    self.set_last_error(Some(e.to_string()));
                    Vec::new()
                }
            },
        };

        let mut seats = match loaded.seats {
            Some(seats) if is_seat_universe(&seats) => seats,
            Some(seats) => {
                warn!(count = seats.len(), "library: saved seats are not the seat universe, reseeding");
                changed.seats = true;
                fresh_seats()
            }
            None => {
                changed.seats = true;
                fresh_seats()
            }
        };

        let repaired = reconcile_seat_links(&mut students, &mut seats);
        if repaired > 0 {
            warn!(repaired, "library: repaired seat/student links");
            changed.students = true;
            changed.seats = true;
        }

        let mut activity = loaded.activity.unwrap_or_default();
        activity.truncate(ACTIVITY_LOG_CAPACITY);
        let mut notifications = loaded.notifications.unwrap_or_default();
        notifications.truncate(NOTIFICATION_LOG_CAPACITY);

        let mut store = EntityStore::default();
        store.replace_students(students);
        store.replace_seats(seats);
        store.replace_transactions(loaded.transactions.unwrap_or_default());
        store.replace_activity(activity);
        store.replace_notifications(notifications);

        if changed.any() {
            self.persistence.save_changed(&store, changed);
        }

        info!(
            students = store.students().len(),
            transactions = store.transactions().len(),
            "library: recovery complete"
        );
        *self.store.write().expect("lock poisoned") = store;
    }

    /// Runs `op` against a draft, commits, persists, then emits.
    fn mutate<T>(&self, op: impl FnOnce(&mut Draft) -> T) -> LibraryResult<T> {
        if self.loading.load(Ordering::Acquire) {
            return Err(LibraryError::Loading);
        }

        let (result, effects) = {
            let mut store = self.store.write().expect("lock poisoned");
            let mut draft = Draft::from_store(&store);
            let result = op(&mut draft);
            let (changed, effects) = draft.commit(&mut store);
            if changed.any() {
                self.persistence.save_changed(&store, changed);
            }
            (result, effects)
        };

        self.emit_all(effects);
        Ok(result)
    }

    fn emit_all(&self, effects: Vec<SideEffect>) {
        for effect in effects {
            if let Err(e) = self.sink.emit(effect) {
                warn!(error = %e, "library: side-effect sink failed");
            }
        }
    }

    fn set_last_error(&self, message: Option<String>) {
        *self.last_error.write().expect("lock poisoned") = message;
    }

    /// Appends students from the import source whose ids are not yet known.
    ///
    /// Returns how many were added. On failure the store is left untouched
    /// and the error is also kept as [`LibraryReader::last_error`].
    pub async fn refresh_from_import_source(&self) -> LibraryResult<usize> {
        let _guard = LoadingGuard::acquire(&self.loading).ok_or(LibraryError::Loading)?;
        self.set_last_error(None);
        info!("library: refreshing students from import source");

        let fetched = match self.importer.fetch_students().await {
            Ok(fetched) => fetched,
            Err(e) => {
                error!(error = %e, "library: import failed");
                self.set_last_error(Some(e.to_string()));
                return Err(e.into());
            }
        };

        let (count, effects) = {
            let mut store = self.store.write().expect("lock poisoned");
            let mut draft = Draft::from_store(&store);

            let mut known: HashSet<StudentId> =
                draft.students.iter().map(|s| s.id.clone()).collect();
            let added: Vec<Student> = fetched
                .into_iter()
                .filter(|s| known.insert(s.id.clone()))
                .map(|mut s| {
                    s.seat_number = None;
                    s
                })
                .collect();
            let count = added.len();

            let message = if count > 0 {
                draft.students.extend(added);
                draft.changed.students = true;
                format!("Refreshed data: {count} new student(s) added from import source")
            } else {
                "Refreshed data: No new students found".to_string()
            };
            draft.record_activity(ActivityKind::Registration, message, None);
            draft.emit(SideEffect::StudentsImported { count });

            let (changed, effects) = draft.commit(&mut store);
            self.persistence.save_changed(&store, changed);
            (count, effects)
        };

        info!(count, "library: import refresh complete");
        self.emit_all(effects);
        Ok(count)
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }
}

fn dedupe_by_id(students: Vec<Student>) -> Vec<Student> {
    let mut seen = HashSet::new();
    students
        .into_iter()
        .filter(|s| seen.insert(s.id.clone()))
        .collect()
}

impl<S: SideEffectSink> LibraryReader for LibraryEngine<S> {
    fn snapshot(&self) -> EntityStore {
        self.store.read().expect("lock poisoned").clone()
    }

    fn student(&self, id: &StudentId) -> Option<Student> {
        self.store
            .read()
            .expect("lock poisoned")
            .student(id)
            .cloned()
    }

    fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.read().expect("lock poisoned").clone()
    }
}

impl<S: SideEffectSink> LibraryWriter for LibraryEngine<S> {
    fn add_student(&self, student: NewStudent) -> LibraryResult<Student> {
        self.mutate(|draft| {
            let student = student.into_student(StudentId::new());
            draft.students.push(student.clone());
            draft.changed.students = true;
            draft.record_activity(
                ActivityKind::Registration,
                format!("New student {} registered successfully", student.name),
                Some(student.name.clone()),
            );
            draft.emit(SideEffect::StudentAdded {
                student_id: student.id.clone(),
            });
            debug!(student_id = %student.id, "library: student added");
            student
        })
    }

    fn update_student(
        &self,
        id: &StudentId,
        update: StudentUpdate,
    ) -> LibraryResult<Option<Student>> {
        self.mutate(|draft| {
            let prior = draft.student(id)?.clone();
            let student = draft.student_mut(id)?;
            update.apply(student);
            let updated = student.clone();

            if updated.name != prior.name {
                draft.refresh_seat_name(id);
            }
            if updated.status != prior.status {
                draft.record_activity(
                    ActivityKind::Registration,
                    format!("Student {} status changed to {}", prior.name, updated.status),
                    Some(prior.name.clone()),
                );
            }
            draft.emit(SideEffect::StudentUpdated {
                student_id: id.clone(),
            });
            Some(updated)
        })
    }

    fn delete_student(&self, id: &StudentId) -> LibraryResult<bool> {
        self.mutate(|draft| {
            let Some(student) = draft.student(id).cloned() else {
                return false;
            };
            if let Some(seat) = student.seat_number {
                draft.vacate_seat(seat);
            }

            draft.students.retain(|s| &s.id != id);
            draft.changed.students = true;
            draft.record_activity(
                ActivityKind::Registration,
                format!("Student {} removed from system", student.name),
                Some(student.name.clone()),
            );
            draft.emit(SideEffect::StudentDeleted {
                student_id: id.clone(),
            });
            debug!(student_id = %id, "library: student deleted");
            true
        })
    }

    fn assign_seat(&self, seat_number: u16, student_id: &StudentId) -> LibraryResult<bool> {
        let today = Self::today();
        self.mutate(|draft| draft.occupy_seat(seat_number, student_id, today))
    }

    fn release_seat(&self, seat_number: u16) -> LibraryResult<bool> {
        self.mutate(|draft| draft.vacate_seat(seat_number))
    }

    fn add_transaction(&self, transaction: NewTransaction) -> LibraryResult<FeeTransaction> {
        self.mutate(|draft| {
            let recorded = FeeTransaction {
                id: uuid::Uuid::new_v4().to_string(),
                receipt_number: receipt_number(draft.transactions.len() + 1),
                student_id: transaction.student_id,
                student_name: transaction.student_name,
                amount: transaction.amount,
                payment_mode: transaction.payment_mode,
                payment_method: transaction.payment_method,
                transaction_date: transaction.transaction_date,
                expiry_date: transaction.expiry_date,
            };
            draft.transactions.push(recorded.clone());
            draft.changed.transactions = true;

            let payer = draft.student_mut(&recorded.student_id).map(|student| {
                student.fee_expiry_date = recorded.expiry_date;
                student.last_fee_payment = Some(recorded.transaction_date);
                student.payment_mode = Some(recorded.payment_mode);
                student.total_fees_paid = student.total_fees_paid.saturating_add(recorded.amount);
                student.clone()
            });

            draft.record_activity(
                ActivityKind::Payment,
                format!(
                    "Fee payment of ₹{} received from {}",
                    recorded.amount, recorded.student_name
                ),
                Some(recorded.student_name.clone()),
            );
            draft.emit(SideEffect::PaymentRecorded {
                transaction_id: recorded.id.clone(),
                student_id: recorded.student_id.clone(),
                receipt_number: recorded.receipt_number.clone(),
            });

            if let Some(student) = payer {
                let message = notification::fee_confirmation(
                    &student.name,
                    recorded.amount,
                    recorded.expiry_date,
                );
                draft.record_notification(&student, NotificationKind::FeeConfirmation, message);
            }

            info!(
                receipt = %recorded.receipt_number,
                student_id = %recorded.student_id,
                amount = recorded.amount,
                "library: payment recorded"
            );
            recorded
        })
    }

    fn send_notification(
        &self,
        student_id: &StudentId,
        kind: NotificationKind,
        template: Option<&str>,
    ) -> LibraryResult<Option<NotificationLogEntry>> {
        self.mutate(|draft| {
            let student = draft.student(student_id)?.clone();
            let message = notification::render(kind, &student, template);
            let entry = draft.record_notification(&student, kind, message);
            draft.record_activity(
                ActivityKind::Reminder,
                format!("{} message sent to {}", kind.label(), student.name),
                Some(student.name.clone()),
            );
            Some(entry)
        })
    }

    fn send_bulk_notification(
        &self,
        student_ids: &[StudentId],
        kind: NotificationKind,
        template: Option<&str>,
    ) -> LibraryResult<usize> {
        self.mutate(|draft| {
            let recipients: Vec<Student> = student_ids
                .iter()
                .filter_map(|id| draft.student(id).cloned())
                .collect();
            for student in &recipients {
                let message = notification::render_bulk(kind, student, template);
                draft.record_notification(student, kind, message);
            }
            if !recipients.is_empty() {
                draft.record_activity(
                    ActivityKind::Reminder,
                    format!(
                        "{} message sent to {} student(s)",
                        kind.label(),
                        recipients.len()
                    ),
                    None,
                );
            }
            recipients.len()
        })
    }
}
