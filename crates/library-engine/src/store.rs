//! The entity store: the in-memory snapshot of every collection.
//!
//! The store only offers whole-collection replacement. The engine computes the
//! next collection and commits it; nothing else mutates entities in place.

use crate::types::{
    is_valid_seat, ActivityLogEntry, FeeTransaction, NotificationLogEntry, Seat, Student,
    StudentId, SEAT_COUNT,
};
use std::collections::HashMap;

/// Canonical state of one library.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    students: Vec<Student>,
    seats: Vec<Seat>,
    transactions: Vec<FeeTransaction>,
    activity: Vec<ActivityLogEntry>,
    notifications: Vec<NotificationLogEntry>,
}

impl EntityStore {
    /// A store with no students and every seat vacant.
    pub fn fresh() -> Self {
        Self {
            seats: fresh_seats(),
            ..Default::default()
        }
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// Fee transactions in insertion order.
    pub fn transactions(&self) -> &[FeeTransaction] {
        &self.transactions
    }

    /// Activity log, most recent first.
    pub fn activity(&self) -> &[ActivityLogEntry] {
        &self.activity
    }

    /// Notification log, most recent first.
    pub fn notifications(&self) -> &[NotificationLogEntry] {
        &self.notifications
    }

    pub fn student(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|s| &s.id == id)
    }

    pub fn seat(&self, number: u16) -> Option<&Seat> {
        self.seats.iter().find(|s| s.number == number)
    }

    pub fn replace_students(&mut self, students: Vec<Student>) {
        self.students = students;
    }

    pub fn replace_seats(&mut self, seats: Vec<Seat>) {
        self.seats = seats;
    }

    pub fn replace_transactions(&mut self, transactions: Vec<FeeTransaction>) {
        self.transactions = transactions;
    }

    pub fn replace_activity(&mut self, activity: Vec<ActivityLogEntry>) {
        self.activity = activity;
    }

    pub fn replace_notifications(&mut self, notifications: Vec<NotificationLogEntry>) {
        self.notifications = notifications;
    }

    /// Checks the seat/student 1:1 link in both directions.
    ///
    /// A seat is occupied iff exactly one student points at it, and the seat's
    /// cached id and name match that student.
    pub fn seat_links_consistent(&self) -> bool {
        let mut holders: HashMap<u16, &Student> = HashMap::new();
        for student in &self.students {
            if let Some(n) = student.seat_number {
                if holders.insert(n, student).is_some() {
                    return false;
                }
            }
        }

        self.seats.iter().all(|seat| match holders.get(&seat.number) {
            Some(student) => {
                seat.is_occupied
                    && seat.student_id.as_ref() == Some(&student.id)
                    && seat.student_name.as_deref() == Some(student.name.as_str())
            }
            None => !seat.is_occupied && seat.student_id.is_none(),
        }) && holders.keys().all(|n| self.seat(*n).is_some())
    }
}

/// Seats `1..=SEAT_COUNT`, all vacant.
pub fn fresh_seats() -> Vec<Seat> {
    (1..=SEAT_COUNT).map(Seat::vacant).collect()
}

/// Returns true if `seats` is exactly the seat universe, in order.
pub fn is_seat_universe(seats: &[Seat]) -> bool {
    seats.len() == SEAT_COUNT as usize
        && seats
            .iter()
            .zip(1..=SEAT_COUNT)
            .all(|(seat, n)| seat.number == n)
}

/// Rebuilds seat occupancy from `Student::seat_number`.
///
/// Student seat numbers are the source of truth. Out-of-range numbers and
/// second claims on the same seat are cleared on the student side; seats are
/// then made to mirror the surviving claims. Returns the number of records
/// that had to change.
pub fn reconcile_seat_links(students: &mut [Student], seats: &mut [Seat]) -> usize {
    let mut changed = 0;
    let mut claimed: HashMap<u16, usize> = HashMap::new();

    for (idx, student) in students.iter_mut().enumerate() {
        let Some(n) = student.seat_number else {
            continue;
        };
        if !is_valid_seat(n) || claimed.contains_key(&n) {
            student.seat_number = None;
            changed += 1;
            continue;
        }
        claimed.insert(n, idx);
    }

    for seat in seats.iter_mut() {
        match claimed.get(&seat.number) {
            Some(&idx) => {
                let student = &students[idx];
                let in_sync = seat.is_occupied
                    && seat.student_id.as_ref() == Some(&student.id)
                    && seat.student_name.as_deref() == Some(student.name.as_str());
                if !in_sync {
                    let assigned = seat
                        .assigned_date
                        .filter(|_| seat.student_id.as_ref() == Some(&student.id))
                        .unwrap_or(student.registration_date);
                    seat.is_occupied = true;
                    seat.student_id = Some(student.id.clone());
                    seat.student_name = Some(student.name.clone());
                    seat.assigned_date = Some(assigned);
                    changed += 1;
                }
            }
            None => {
                if seat.is_occupied || seat.student_id.is_some() {
                    *seat = Seat::vacant(seat.number);
                    changed += 1;
                }
            }
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StudentStatus;
    use chrono::NaiveDate;

    fn student(id: &str, seat: Option<u16>) -> Student {
        let day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        Student {
            id: StudentId::from(id),
            name: format!("Student {id}"),
            mobile: "9000000001".into(),
            email: None,
            parent_name: "Parent".into(),
            parent_mobile: "9000000002".into(),
            address: None,
            vehicle_number: None,
            photo: None,
            seat_number: seat,
            registration_date: day,
            fee_expiry_date: day,
            last_fee_payment: None,
            status: StudentStatus::Active,
            payment_mode: None,
            total_fees_paid: 0,
        }
    }

    #[test]
    fn fresh_store_has_full_vacant_universe() {
        let store = EntityStore::fresh();
        assert!(is_seat_universe(store.seats()));
        assert!(store.seats().iter().all(|s| !s.is_occupied));
        assert!(store.seat_links_consistent());
    }

    #[test]
    fn seat_universe_rejects_gaps_and_extras() {
        let mut seats = fresh_seats();
        seats.pop();
        assert!(!is_seat_universe(&seats));

        let mut seats = fresh_seats();
        seats.push(Seat::vacant(103));
        assert!(!is_seat_universe(&seats));

        let mut seats = fresh_seats();
        seats.swap(0, 1);
        assert!(!is_seat_universe(&seats));
    }

    #[test]
    fn reconcile_fills_seat_from_student() {
        let mut students = vec![student("a", Some(7))];
        let mut seats = fresh_seats();

        assert_eq!(reconcile_seat_links(&mut students, &mut seats), 1);
        let seat = &seats[6];
        assert!(seat.is_occupied);
        assert_eq!(seat.student_id, Some(StudentId::from("a")));
        assert_eq!(seat.student_name.as_deref(), Some("Student a"));
    }

    #[test]
    fn reconcile_clears_dangling_seat() {
        let mut students = vec![student("a", None)];
        let mut seats = fresh_seats();
        seats[3].is_occupied = true;
        seats[3].student_id = Some(StudentId::from("ghost"));
        seats[3].student_name = Some("Ghost".into());

        assert_eq!(reconcile_seat_links(&mut students, &mut seats), 1);
        assert_eq!(seats[3], Seat::vacant(4));
    }

    #[test]
    fn reconcile_drops_duplicate_and_out_of_range_claims() {
        let mut students = vec![
            student("a", Some(2)),
            student("b", Some(2)),
            student("c", Some(500)),
        ];
        let mut seats = fresh_seats();

        reconcile_seat_links(&mut students, &mut seats);

        assert_eq!(students[0].seat_number, Some(2));
        assert_eq!(students[1].seat_number, None);
        assert_eq!(students[2].seat_number, None);

        let mut store = EntityStore::fresh();
        store.replace_students(students);
        store.replace_seats(seats);
        assert!(store.seat_links_consistent());
    }

    #[test]
    fn reconcile_is_noop_when_consistent() {
        let mut students = vec![student("a", Some(1))];
        let mut seats = fresh_seats();
        reconcile_seat_links(&mut students, &mut seats);
        assert_eq!(reconcile_seat_links(&mut students, &mut seats), 0);
    }

    #[test]
    fn consistency_detects_stale_cached_name() {
        let mut students = vec![student("a", Some(1))];
        let mut seats = fresh_seats();
        reconcile_seat_links(&mut students, &mut seats);
        students[0].name = "Renamed".into();

        let mut store = EntityStore::fresh();
        store.replace_students(students);
        store.replace_seats(seats);
        assert!(!store.seat_links_consistent());
    }
}
