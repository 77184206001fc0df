//! Derived views: dashboard stats, recent activity and reports.
//!
//! Everything here is a pure function of an [`EntityStore`] snapshot. Dates
//! are passed in so the same snapshot always yields the same numbers.

use crate::store::EntityStore;
use crate::types::{
    ActivityKind, ActivityLogEntry, FeeTransaction, PaymentMode, Student, StudentStatus,
    SEAT_COUNT,
};
use chrono::{DateTime, Datelike, Days, Local, NaiveDate, Utc};
use serde::Serialize;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    pub active_students: usize,
    pub occupied_seats: usize,
    pub available_seats: usize,
    pub monthly_revenue: u64,
    pub pending_fees: usize,
    pub expiring_today: usize,
    pub expiring_this_week: usize,
}

/// An activity entry with its timestamp rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityView {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student_name: Option<String>,
}

fn same_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

/// Integer division rounded half up.
fn round_div(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let remainder = numerator % denominator;
    numerator / denominator + u64::from(remainder >= denominator - denominator / 2)
}

/// Saturating sum of amounts.
fn sum_amounts(amounts: impl Iterator<Item = u64>) -> u64 {
    amounts.fold(0, u64::saturating_add)
}

fn total(transactions: &[&FeeTransaction]) -> u64 {
    sum_amounts(transactions.iter().map(|t| t.amount))
}

pub fn dashboard_stats(store: &EntityStore, today: NaiveDate) -> DashboardStats {
    let students = store.students();
    let occupied_seats = store.seats().iter().filter(|s| s.is_occupied).count();
    let week_end = today.checked_add_days(Days::new(7)).unwrap_or(today);

    DashboardStats {
        total_students: students.len(),
        active_students: students
            .iter()
            .filter(|s| s.status == StudentStatus::Active)
            .count(),
        occupied_seats,
        available_seats: (SEAT_COUNT as usize).saturating_sub(occupied_seats),
        monthly_revenue: sum_amounts(
            store
                .transactions()
                .iter()
                .filter(|t| same_month(t.transaction_date, today.year(), today.month()))
                .map(|t| t.amount),
        ),
        pending_fees: students.iter().filter(|s| s.fee_expiry_date < today).count(),
        expiring_today: students.iter().filter(|s| s.fee_expiry_date == today).count(),
        expiring_this_week: students
            .iter()
            .filter(|s| s.fee_expiry_date >= today && s.fee_expiry_date <= week_end)
            .count(),
    }
}

/// Renders a timestamp in the local zone: `16/10/2026, 3:04:05 pm`.
pub fn display_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%-d/%-m/%Y, %-I:%M:%S %P")
        .to_string()
}

/// Newest first, whatever order `log` arrives in.
pub fn recent_activity(log: &[ActivityLogEntry], limit: usize) -> Vec<ActivityView> {
    let mut entries: Vec<&ActivityLogEntry> = log.iter().collect();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries
        .into_iter()
        .take(limit)
        .map(|entry| ActivityView {
            id: entry.id.clone(),
            kind: entry.kind,
            message: entry.message.clone(),
            timestamp: display_timestamp(entry.timestamp),
            student_name: entry.student_name.clone(),
        })
        .collect()
}

// ============================================================================
// Reports
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyFeeReport {
    pub year: i32,
    pub month: u32,
    pub total_collection: u64,
    pub online_collection: u64,
    pub offline_collection: u64,
    pub total_transactions: usize,
    pub online_transactions: usize,
    pub offline_transactions: usize,
    pub transactions: Vec<FeeTransaction>,
}

pub fn monthly_fee_report(store: &EntityStore, year: i32, month: u32) -> MonthlyFeeReport {
    let rows: Vec<&FeeTransaction> = store
        .transactions()
        .iter()
        .filter(|t| same_month(t.transaction_date, year, month))
        .collect();
    let (online, offline): (Vec<&FeeTransaction>, Vec<&FeeTransaction>) = rows
        .iter()
        .copied()
        .partition(|t| t.payment_mode == PaymentMode::Online);

    MonthlyFeeReport {
        year,
        month,
        total_collection: total(&rows),
        online_collection: total(&online),
        offline_collection: total(&offline),
        total_transactions: rows.len(),
        online_transactions: online.len(),
        offline_transactions: offline.len(),
        transactions: rows.into_iter().cloned().collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentReport {
    pub year: i32,
    pub new_registrations: usize,
    pub active_students: usize,
    pub inactive_students: usize,
    pub expired_students: usize,
    pub students_with_seats: usize,
}

pub fn student_report(store: &EntityStore, year: i32) -> StudentReport {
    let students = store.students();
    let with_status =
        |status: StudentStatus| students.iter().filter(|s| s.status == status).count();

    StudentReport {
        year,
        new_registrations: students
            .iter()
            .filter(|s| s.registration_date.year() == year)
            .count(),
        active_students: with_status(StudentStatus::Active),
        inactive_students: with_status(StudentStatus::Inactive),
        expired_students: with_status(StudentStatus::Expired),
        students_with_seats: students.iter().filter(|s| s.seat_number.is_some()).count(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatUtilization {
    pub total_seats: usize,
    pub occupied_seats: usize,
    pub available_seats: usize,
    /// Whole percent.
    pub utilization_rate: u64,
}

pub fn seat_utilization(store: &EntityStore) -> SeatUtilization {
    let total_seats = SEAT_COUNT as usize;
    let occupied_seats = store.seats().iter().filter(|s| s.is_occupied).count();
    SeatUtilization {
        total_seats,
        occupied_seats,
        available_seats: total_seats.saturating_sub(occupied_seats),
        utilization_rate: round_div(occupied_seats as u64 * 100, total_seats as u64),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub month: u32,
    pub revenue: u64,
    pub transactions: usize,
    pub average_transaction: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub year: i32,
    pub yearly_revenue: u64,
    pub average_monthly_revenue: u64,
    pub average_transaction_value: u64,
    pub total_transactions: usize,
    pub months: Vec<MonthlyRevenue>,
}

pub fn revenue_report(store: &EntityStore, year: i32) -> RevenueReport {
    let yearly: Vec<&FeeTransaction> = store
        .transactions()
        .iter()
        .filter(|t| t.transaction_date.year() == year)
        .collect();
    let yearly_revenue = total(&yearly);

    let months = (1..=12)
        .map(|month| {
            let rows: Vec<&FeeTransaction> = yearly
                .iter()
                .copied()
                .filter(|t| t.transaction_date.month() == month)
                .collect();
            let revenue = total(&rows);
            MonthlyRevenue {
                month,
                revenue,
                transactions: rows.len(),
                average_transaction: round_div(revenue, rows.len() as u64),
            }
        })
        .collect();

    RevenueReport {
        year,
        yearly_revenue,
        average_monthly_revenue: round_div(yearly_revenue, 12),
        average_transaction_value: round_div(yearly_revenue, yearly.len() as u64),
        total_transactions: yearly.len(),
        months,
    }
}

// ============================================================================
// Lookups
// ============================================================================

/// Case-insensitive name match, or substring of mobile or seat number.
pub fn search_students<'a>(store: &'a EntityStore, term: &str) -> Vec<&'a Student> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return store.students().iter().collect();
    }
    store
        .students()
        .iter()
        .filter(|s| {
            s.name.to_lowercase().contains(&needle)
                || s.mobile.contains(&needle)
                || s
                    .seat_number
                    .is_some_and(|n| n.to_string().contains(&needle))
        })
        .collect()
}

/// Active students without a seat whose name matches `term`.
pub fn seatable_students<'a>(store: &'a EntityStore, term: &str) -> Vec<&'a Student> {
    let needle = term.trim().to_lowercase();
    store
        .students()
        .iter()
        .filter(|s| {
            s.status == StudentStatus::Active
                && s.seat_number.is_none()
                && s.name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Exactly ten ASCII digits.
pub fn is_valid_mobile(mobile: &str) -> bool {
    mobile.len() == 10 && mobile.bytes().all(|b| b.is_ascii_digit())
}
