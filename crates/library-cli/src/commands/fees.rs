//! Fee commands.

use super::{today, year_month};
use crate::app::App;
use crate::output::{self, OutputFormat};
use anyhow::{bail, Context, Result};
use chrono::{Datelike, Months, NaiveDate};
use library_engine::{
    FeeTransaction, LibraryReader, LibraryWriter, NewTransaction, PaymentMode, StudentId,
};

/// Arguments of `fees record`.
pub struct PaymentArgs {
    pub student: String,
    pub amount: u64,
    pub mode: PaymentMode,
    pub method: String,
    pub date: Option<NaiveDate>,
    pub expires: Option<NaiveDate>,
}

/// Record a payment.
pub fn fees_record(app: &App, args: PaymentArgs, format: OutputFormat) -> Result<()> {
    if args.amount == 0 {
        bail!("Amount must be greater than zero");
    }

    let student_id = StudentId::from_string(&args.student);
    let Some(student) = app.engine.student(&student_id) else {
        bail!("Student not found: {}", args.student);
    };

    let transaction_date = args.date.unwrap_or_else(today);
    let expiry_date = match args.expires {
        Some(date) => date,
        None => transaction_date
            .checked_add_months(Months::new(1))
            .context("Fee expiry date out of range")?,
    };

    let transaction = app.engine.add_transaction(NewTransaction {
        student_id,
        student_name: student.name,
        amount: args.amount,
        payment_mode: args.mode,
        payment_method: args.method,
        transaction_date,
        expiry_date,
    })?;

    output::print(&transaction, format, |t| {
        println!(
            "Recorded {} from {} (receipt {}, valid until {})",
            output::rupees(t.amount),
            t.student_name,
            t.receipt_number,
            output::date(t.expiry_date)
        );
    });
    Ok(())
}

/// List payments in the order they were recorded.
pub fn fees_list(
    app: &App,
    student: Option<&str>,
    month: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let period = month.map(|m| year_month(Some(m))).transpose()?;
    let snapshot = app.engine.snapshot();
    let transactions: Vec<&FeeTransaction> = snapshot
        .transactions()
        .iter()
        .filter(|t| student.map_or(true, |id| t.student_id.as_str() == id))
        .filter(|t| {
            period.map_or(true, |(year, month)| {
                t.transaction_date.year() == year && t.transaction_date.month() == month
            })
        })
        .collect();

    output::print(&transactions, format, |transactions| {
        print_transactions(transactions)
    });
    Ok(())
}

/// Prints transactions as a table.
pub(crate) fn print_transactions(transactions: &[&FeeTransaction]) {
    if transactions.is_empty() {
        println!("No transactions found");
        return;
    }

    println!(
        "{:<11} {:<24} {:>9} {:<8} {:<12} {}",
        "Date", "Student", "Amount", "Mode", "Method", "Receipt"
    );
    println!("{}", "-".repeat(80));
    for t in transactions {
        println!(
            "{:<11} {:<24} {:>9} {:<8} {:<12} {}",
            output::date(t.transaction_date),
            t.student_name,
            output::rupees(t.amount),
            t.payment_mode.as_str(),
            t.payment_method,
            t.receipt_number
        );
    }
}
