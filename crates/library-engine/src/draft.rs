//! Working copy of the entity store for a single mutation.
//!
//! A mutation clones the collections it needs, edits them here, and the
//! engine commits the result in one replacement. Seat assignment and release
//! share one routine each so both paths keep the seat/student link in sync.

use crate::persistence::Changed;
use crate::side_effect::SideEffect;
use crate::store::EntityStore;
use crate::types::{
    ActivityKind, ActivityLogEntry, FeeTransaction, NotificationKind, NotificationLogEntry, Seat,
    Student, StudentId, ACTIVITY_LOG_CAPACITY, NOTIFICATION_LOG_CAPACITY,
};
use chrono::{NaiveDate, Utc};

pub(crate) struct Draft {
    pub students: Vec<Student>,
    pub seats: Vec<Seat>,
    pub transactions: Vec<FeeTransaction>,
    pub activity: Vec<ActivityLogEntry>,
    pub notifications: Vec<NotificationLogEntry>,
    pub changed: Changed,
    pub effects: Vec<SideEffect>,
}

impl Draft {
    pub fn from_store(store: &EntityStore) -> Self {
        Self {
            students: store.students().to_vec(),
            seats: store.seats().to_vec(),
            transactions: store.transactions().to_vec(),
            activity: store.activity().to_vec(),
            notifications: store.notifications().to_vec(),
            changed: Changed::default(),
            effects: Vec::new(),
        }
    }

    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|s| &s.id == id)
    }

    pub fn student_mut(&mut self, id: &StudentId) -> Option<&mut Student> {
        self.changed.students = true;
        self.students.iter_mut().find(|s| &s.id == id)
    }

    fn seat_index(&self, number: u16) -> Option<usize> {
        self.seats.iter().position(|s| s.number == number)
    }

    pub fn emit(&mut self, effect: SideEffect) {
        self.effects.push(effect);
    }

    /// Prepends an activity entry, evicting the oldest past capacity.
    pub fn record_activity(
        &mut self,
        kind: ActivityKind,
        message: String,
        student_name: Option<String>,
    ) {
        self.activity
            .insert(0, ActivityLogEntry::new(kind, message, student_name));
        self.activity.truncate(ACTIVITY_LOG_CAPACITY);
        self.changed.activity = true;
    }

    /// Logs a notification and requests its delivery.
    pub fn record_notification(
        &mut self,
        student: &Student,
        kind: NotificationKind,
        message: String,
    ) -> NotificationLogEntry {
        let entry = NotificationLogEntry {
            id: ulid::Ulid::new().to_string(),
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            mobile: student.mobile.clone(),
            kind,
            message,
            sent_at: Utc::now(),
            method: Default::default(),
        };
        self.notifications.insert(0, entry.clone());
        self.notifications.truncate(NOTIFICATION_LOG_CAPACITY);
        self.changed.notifications = true;
        self.emit(SideEffect::NotificationRequested {
            notification_id: entry.id.clone(),
            student_id: entry.student_id.clone(),
            mobile: entry.mobile.clone(),
            message: entry.message.clone(),
            kind,
        });
        entry
    }

    /// Vacates `number` and clears the holder's back-reference.
    ///
    /// Returns false if the seat is unknown or already vacant.
    pub fn vacate_seat(&mut self, number: u16) -> bool {
        let Some(idx) = self.seat_index(number) else {
            return false;
        };
        if !self.seats[idx].is_occupied {
            return false;
        }

        let holder = self.seats[idx].student_id.take();
        self.seats[idx] = Seat::vacant(number);
        self.changed.seats = true;

        let mut holder_name = None;
        if let Some(id) = &holder {
            if let Some(student) = self.student_mut(id) {
                if student.seat_number == Some(number) {
                    student.seat_number = None;
                }
                holder_name = Some(student.name.clone());
            }
        }

        if let Some(name) = holder_name {
            self.record_activity(
                ActivityKind::SeatAssignment,
                format!("Seat {number} released from {name}"),
                Some(name),
            );
        }
        self.emit(SideEffect::SeatReleased {
            seat_number: number,
            student_id: holder,
        });
        true
    }

    /// Seats `student_id` at `number`, releasing both prior associations.
    ///
    /// Returns false if either side does not exist.
    pub fn occupy_seat(&mut self, number: u16, student_id: &StudentId, today: NaiveDate) -> bool {
        let Some(idx) = self.seat_index(number) else {
            return false;
        };
        let Some(student) = self.student(student_id) else {
            return false;
        };
        let current = student.seat_number;
        let name = student.name.clone();

        if current == Some(number) && self.seats[idx].student_id.as_ref() == Some(student_id) {
            return true;
        }
        if let Some(held) = current {
            self.vacate_seat(held);
        }
        if self.seats[idx].is_occupied {
            self.vacate_seat(number);
        }

        self.seats[idx] = Seat {
            number,
            is_occupied: true,
            student_id: Some(student_id.clone()),
            student_name: Some(name.clone()),
            assigned_date: Some(today),
        };
        self.changed.seats = true;
        if let Some(student) = self.student_mut(student_id) {
            student.seat_number = Some(number);
        }

        self.record_activity(
            ActivityKind::SeatAssignment,
            format!("Seat {number} assigned to {name}"),
            Some(name),
        );
        self.emit(SideEffect::SeatAssigned {
            seat_number: number,
            student_id: student_id.clone(),
        });
        true
    }

    /// Rewrites the cached name on the seat held by `student_id`.
    pub fn refresh_seat_name(&mut self, student_id: &StudentId) {
        let Some(student) = self.student(student_id) else {
            return;
        };
        let (Some(number), name) = (student.seat_number, student.name.clone()) else {
            return;
        };
        if let Some(idx) = self.seat_index(number) {
            if self.seats[idx].student_id.as_ref() == Some(student_id)
                && self.seats[idx].student_name.as_deref() != Some(name.as_str())
            {
                self.seats[idx].student_name = Some(name);
                self.changed.seats = true;
            }
        }
    }

    /// Moves the edited collections back into `store`.
    pub fn commit(self, store: &mut EntityStore) -> (Changed, Vec<SideEffect>) {
        if self.changed.students {
            store.replace_students(self.students);
        }
        if self.changed.seats {
            store.replace_seats(self.seats);
        }
        if self.changed.transactions {
            store.replace_transactions(self.transactions);
        }
        if self.changed.activity {
            store.replace_activity(self.activity);
        }
        if self.changed.notifications {
            store.replace_notifications(self.notifications);
        }
        (self.changed, self.effects)
    }
}
