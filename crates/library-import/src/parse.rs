//! CSV text to candidate students.

use crate::matcher::{FieldMatcher, Row, StudentField};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use library_engine::{ImportError, Student, StudentId, StudentStatus};
use tracing::{debug, info, warn};

/// Days of access granted at registration.
pub const FEE_PERIOD_DAYS: u64 = 30;

/// Parent name used when the row has none.
pub const MISSING_PARENT_NAME: &str = "Not Provided";

const DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M", "%Y-%m-%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

/// Parses a form timestamp into a calendar date.
///
/// Accepts the spreadsheet's `M/D/YYYY H:MM:SS` layout, ISO dates and RFC 3339.
pub fn parse_registration_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        })
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

/// Parses a registration CSV export.
///
/// Rows without a name or mobile are skipped. Ids are `csv-<n>`, numbered
/// over the non-blank rows starting at 1. An unreadable timestamp falls back
/// to `today`.
pub fn parse_students(csv_text: &str, today: NaiveDate) -> Result<Vec<Student>, ImportError> {
    if csv_text.trim().is_empty() {
        warn!("Import source returned empty CSV data");
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(csv_text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ImportError::Parse(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    debug!(?headers, "CSV headers");

    let mut records = Vec::new();
    for (line, record) in reader.records().enumerate() {
        match record {
            Ok(record) => records.push(record),
            Err(e) => warn!(line = line + 2, error = %e, "Skipping unreadable CSV record"),
        }
    }

    let students: Vec<Student> = records
        .iter()
        .map(|record| Row::new(&headers, record))
        .filter(|row| !row.is_blank())
        .enumerate()
        .filter_map(|(idx, row)| student_from_row(idx + 1, &row, today))
        .collect();

    info!(rows = records.len(), students = students.len(), "Parsed import CSV");
    Ok(students)
}

fn student_from_row(number: usize, row: &Row<'_>, today: NaiveDate) -> Option<Student> {
    let field = |f: StudentField| FieldMatcher::for_field(f).find(row);

    let (Some(name), Some(mobile)) = (field(StudentField::Name), field(StudentField::Mobile))
    else {
        debug!(row = number, "Skipping row: missing name or mobile");
        return None;
    };

    let registration_date = match field(StudentField::Timestamp) {
        Some(raw) => parse_registration_date(&raw).unwrap_or_else(|| {
            warn!(row = number, timestamp = %raw, "Invalid timestamp, using today");
            today
        }),
        None => today,
    };
    let fee_expiry_date = registration_date
        .checked_add_days(Days::new(FEE_PERIOD_DAYS))
        .unwrap_or(registration_date);

    Some(Student {
        id: StudentId::from_string(format!("csv-{number}")),
        parent_name: field(StudentField::ParentName)
            .unwrap_or_else(|| MISSING_PARENT_NAME.to_string()),
        parent_mobile: field(StudentField::ParentMobile).unwrap_or_else(|| mobile.clone()),
        email: field(StudentField::Email),
        address: field(StudentField::Address),
        vehicle_number: field(StudentField::VehicleNumber),
        photo: field(StudentField::Photo),
        name,
        mobile,
        seat_number: None,
        registration_date,
        fee_expiry_date,
        last_fee_payment: None,
        status: StudentStatus::Active,
        payment_mode: None,
        total_fees_paid: 0,
    })
}
