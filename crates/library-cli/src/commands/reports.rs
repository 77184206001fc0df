//! Dashboard, activity, reports and import.

use super::fees::print_transactions;
use super::{today, year_month};
use crate::app::App;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use library_engine::views::{monthly_fee_report, revenue_report, seat_utilization, student_report};
use library_engine::{FeeTransaction, LibraryReader};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Dashboard statistics.
pub fn stats(app: &App, date: Option<NaiveDate>, format: OutputFormat) -> Result<()> {
    let stats = app.engine.dashboard_stats(date.unwrap_or_else(today));

    output::print(&stats, format, |stats| {
        output::print_heading("Dashboard");
        output::print_row("Total students", &stats.total_students.to_string());
        output::print_row("Active students", &stats.active_students.to_string());
        output::print_row("Occupied seats", &stats.occupied_seats.to_string());
        output::print_row("Available seats", &stats.available_seats.to_string());
        output::print_row("Monthly revenue", &output::rupees(stats.monthly_revenue));
        output::print_row("Pending fees", &stats.pending_fees.to_string());
        output::print_row("Expiring today", &stats.expiring_today.to_string());
        output::print_row("Expiring in 7d", &stats.expiring_this_week.to_string());
    });
    Ok(())
}

/// Recent activity.
pub fn activity(app: &App, limit: usize, format: OutputFormat) -> Result<()> {
    let entries = app.engine.recent_activity(limit);

    output::print(&entries, format, |entries| {
        if entries.is_empty() {
            println!("No activity yet");
        }
        for entry in entries {
            println!("{:<24} {}", entry.timestamp, entry.message);
        }
    });
    Ok(())
}

/// Fee collection for a month.
pub fn reports_monthly(app: &App, month: Option<&str>, format: OutputFormat) -> Result<()> {
    let (year, month) = year_month(month)?;
    let report = monthly_fee_report(&app.engine.snapshot(), year, month);

    output::print(&report, format, |report| {
        output::print_heading(&format!("Fee collection {}-{:02}", report.year, report.month));
        output::print_row(
            "Total",
            &format!(
                "{} ({} transactions)",
                output::rupees(report.total_collection),
                report.total_transactions
            ),
        );
        output::print_row(
            "Online",
            &format!(
                "{} ({})",
                output::rupees(report.online_collection),
                report.online_transactions
            ),
        );
        output::print_row(
            "Offline",
            &format!(
                "{} ({})",
                output::rupees(report.offline_collection),
                report.offline_transactions
            ),
        );
        println!();
        let rows: Vec<&FeeTransaction> = report.transactions.iter().collect();
        print_transactions(&rows);
    });
    Ok(())
}

/// Student counts for a year.
pub fn reports_students(app: &App, year: Option<i32>, format: OutputFormat) -> Result<()> {
    let year = year.unwrap_or_else(|| today().year());
    let report = student_report(&app.engine.snapshot(), year);

    output::print(&report, format, |report| {
        output::print_heading(&format!("Students {}", report.year));
        output::print_row("New registrations", &report.new_registrations.to_string());
        output::print_row("Active", &report.active_students.to_string());
        output::print_row("Inactive", &report.inactive_students.to_string());
        output::print_row("Expired", &report.expired_students.to_string());
        output::print_row("With seats", &report.students_with_seats.to_string());
    });
    Ok(())
}

/// Seat utilisation.
pub fn reports_seats(app: &App, format: OutputFormat) -> Result<()> {
    let report = seat_utilization(&app.engine.snapshot());

    output::print(&report, format, |report| {
        output::print_heading("Seat utilisation");
        output::print_row("Total", &report.total_seats.to_string());
        output::print_row("Occupied", &report.occupied_seats.to_string());
        output::print_row("Available", &report.available_seats.to_string());
        output::print_row("Utilisation", &format!("{}%", report.utilization_rate));
    });
    Ok(())
}

/// Revenue by month.
pub fn reports_revenue(app: &App, year: Option<i32>, format: OutputFormat) -> Result<()> {
    let year = year.unwrap_or_else(|| today().year());
    let report = revenue_report(&app.engine.snapshot(), year);

    output::print(&report, format, |report| {
        output::print_heading(&format!("Revenue {}", report.year));
        output::print_row("Yearly revenue", &output::rupees(report.yearly_revenue));
        output::print_row(
            "Monthly average",
            &output::rupees(report.average_monthly_revenue),
        );
        output::print_row(
            "Average payment",
            &output::rupees(report.average_transaction_value),
        );
        output::print_row("Transactions", &report.total_transactions.to_string());
        println!();
        println!("{:<6} {:>10} {:>6} {:>10}", "Month", "Revenue", "Count", "Average");
        for row in &report.months {
            let name = MONTH_NAMES
                .get(row.month.saturating_sub(1) as usize)
                .copied()
                .unwrap_or("?");
            println!(
                "{:<6} {:>10} {:>6} {:>10}",
                name,
                output::rupees(row.revenue),
                row.transactions,
                output::rupees(row.average_transaction)
            );
        }
    });
    Ok(())
}

/// Pull new students from the import source.
pub async fn import_refresh(app: &App, format: OutputFormat) -> Result<()> {
    let added = app.engine.refresh_from_import_source().await?;

    let message = if added > 0 {
        format!("{} new student(s) added from import source", added)
    } else {
        "No new students found".to_string()
    };
    output::print_success(&message, format);
    Ok(())
}
