//! Message templates for outbound notifications.

use crate::types::{NotificationKind, Student};
use chrono::NaiveDate;

/// Custom template used when none is supplied.
pub const DEFAULT_CUSTOM_TEMPLATE: &str = "Hello {name}!";

/// Renders a date the way messages show it: `1/3/2025`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%-d/%-m/%Y").to_string()
}

pub fn welcome(name: &str, seat_number: Option<u16>) -> String {
    match seat_number {
        Some(n) => format!(
            "Welcome to our library, {name}! Your seat number is {n}. We're excited to have you with us. For any queries, contact us."
        ),
        None => format!(
            "Welcome to our library, {name}! We're excited to have you with us. For any queries, contact us."
        ),
    }
}

pub fn fee_confirmation(name: &str, amount: u64, expiry: NaiveDate) -> String {
    format!(
        "Dear {name}, your fee payment of ₹{amount} has been received successfully. Your membership is valid till {}. Thank you!",
        display_date(expiry)
    )
}

pub fn fee_reminder(name: &str, expiry: NaiveDate) -> String {
    format!(
        "Dear {name}, your library membership expires on {}. Please renew your fees to continue using our services. Thank you!",
        display_date(expiry)
    )
}

pub fn goodbye(name: &str) -> String {
    format!(
        "Dear {name}, thank you for being part of our library family. We hope to see you again soon. Best wishes for your future endeavors!"
    )
}

/// Replaces every `{name}` placeholder.
pub fn custom(template: &str, name: &str) -> String {
    template.replace("{name}", name)
}

/// Renders `kind` for `student`.
///
/// Fee confirmations quote the student's running total; `template` is only
/// consulted for [`NotificationKind::Custom`].
pub fn render(kind: NotificationKind, student: &Student, template: Option<&str>) -> String {
    match kind {
        NotificationKind::Welcome => welcome(&student.name, student.seat_number),
        NotificationKind::FeeConfirmation => {
            fee_confirmation(&student.name, student.total_fees_paid, student.fee_expiry_date)
        }
        NotificationKind::FeeReminder => fee_reminder(&student.name, student.fee_expiry_date),
        NotificationKind::Goodbye => goodbye(&student.name),
        NotificationKind::Custom => custom(
            template.unwrap_or(DEFAULT_CUSTOM_TEMPLATE),
            &student.name,
        ),
    }
}

/// Renders one message of a bulk send.
///
/// A non-blank `template` overrides the kind's own text for every kind;
/// otherwise this is [`render`].
pub fn render_bulk(kind: NotificationKind, student: &Student, template: Option<&str>) -> String {
    match template.filter(|t| !t.trim().is_empty()) {
        Some(template) => custom(template, &student.name),
        None => render(kind, student, None),
    }
}
