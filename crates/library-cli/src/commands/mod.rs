//! CLI command implementations.

mod fees;
mod notify;
mod reports;
mod seats;
mod students;

pub use fees::{fees_list, fees_record, PaymentArgs};
pub use notify::{notify_bulk, notify_log, notify_send};
pub use reports::{
    activity, import_refresh, reports_monthly, reports_revenue, reports_seats, reports_students,
    stats,
};
pub use seats::{seats_assign, seats_candidates, seats_list, seats_release};
pub use students::{
    students_add, students_delete, students_list, students_search, students_show,
    students_update,
};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};

/// Today's date in local time.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parses `YYYY-MM`, defaulting to the current month.
fn year_month(month: Option<&str>) -> Result<(i32, u32)> {
    let Some(month) = month else {
        let now = today();
        return Ok((now.year(), now.month()));
    };

    let first = NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", month))?;
    Ok((first.year(), first.month()))
}
