//! Student commands.

use super::today;
use crate::app::App;
use crate::output::{self, OutputFormat};
use crate::StudentFields;
use anyhow::{bail, Context, Result};
use chrono::Months;
use library_engine::views::{is_valid_mobile, search_students};
use library_engine::{
    LibraryReader, LibraryWriter, NewStudent, Student, StudentId, StudentStatus, StudentUpdate,
};

fn check_mobile(label: &str, mobile: &str) -> Result<()> {
    if !is_valid_mobile(mobile) {
        bail!("{} must be exactly 10 digits, got '{}'", label, mobile);
    }
    Ok(())
}

fn find_student(app: &App, id: &str) -> Result<Student> {
    app.engine
        .student(&StudentId::from_string(id))
        .with_context(|| format!("Student not found: {}", id))
}

/// Prints students as a table.
pub(crate) fn print_students(students: &[&Student]) {
    if students.is_empty() {
        println!("No students found");
        return;
    }

    println!(
        "{:<44} {:<24} {:<12} {:<5} {:<9} {}",
        "ID", "Name", "Mobile", "Seat", "Status", "Fee Expiry"
    );
    println!("{}", "-".repeat(110));
    for student in students {
        let seat = student
            .seat_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<44} {:<24} {:<12} {:<5} {:<9} {}",
            student.id.as_str(),
            student.name,
            student.mobile,
            seat,
            student.status.as_str(),
            output::date(student.fee_expiry_date)
        );
    }
}

fn print_student(student: &Student) {
    output::print_heading(&student.name);
    output::print_row("ID", student.id.as_str());
    output::print_row("Mobile", &student.mobile);
    output::print_row("Email", output::or_dash(student.email.as_deref()));
    output::print_row("Parent", &student.parent_name);
    output::print_row("Parent mobile", &student.parent_mobile);
    output::print_row("Address", output::or_dash(student.address.as_deref()));
    output::print_row(
        "Vehicle",
        output::or_dash(student.vehicle_number.as_deref()),
    );
    output::print_row(
        "Seat",
        &student
            .seat_number
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string()),
    );
    output::print_row("Status", student.status.as_str());
    output::print_row("Registered", &output::date(student.registration_date));
    output::print_row("Fee expiry", &output::date(student.fee_expiry_date));
    output::print_row(
        "Last payment",
        &student
            .last_fee_payment
            .map(output::date)
            .unwrap_or_else(|| "-".to_string()),
    );
    output::print_row("Total paid", &output::rupees(student.total_fees_paid));
}

/// List students.
pub fn students_list(
    app: &App,
    status: Option<StudentStatus>,
    format: OutputFormat,
) -> Result<()> {
    let snapshot = app.engine.snapshot();
    let students: Vec<&Student> = snapshot
        .students()
        .iter()
        .filter(|s| status.map_or(true, |status| s.status == status))
        .collect();

    output::print(&students, format, |students| print_students(students));
    Ok(())
}

/// Show student details.
pub fn students_show(app: &App, id: &str, format: OutputFormat) -> Result<()> {
    let student = find_student(app, id)?;
    output::print(&student, format, print_student);
    Ok(())
}

/// Register a new student.
pub fn students_add(app: &App, fields: StudentFields, format: OutputFormat) -> Result<()> {
    let Some(name) = fields.name.filter(|n| !n.trim().is_empty()) else {
        bail!("--name is required");
    };
    let Some(mobile) = fields.mobile else {
        bail!("--mobile is required");
    };
    let Some(parent_name) = fields.parent_name.filter(|n| !n.trim().is_empty()) else {
        bail!("--parent-name is required");
    };
    let Some(parent_mobile) = fields.parent_mobile else {
        bail!("--parent-mobile is required");
    };
    check_mobile("Mobile number", &mobile)?;
    check_mobile("Parent mobile number", &parent_mobile)?;

    let registration_date = fields.registered.unwrap_or_else(today);
    let fee_expiry_date = match fields.expires {
        Some(date) => date,
        None => registration_date
            .checked_add_months(Months::new(1))
            .context("Fee expiry date out of range")?,
    };

    let student = app.engine.add_student(NewStudent {
        name: name.trim().to_string(),
        mobile,
        email: fields.email,
        parent_name: parent_name.trim().to_string(),
        parent_mobile,
        address: fields.address,
        vehicle_number: fields.vehicle_number,
        photo: fields.photo,
        registration_date,
        fee_expiry_date,
        status: StudentStatus::Active,
    })?;

    output::print(&student, format, |student| {
        println!("Registered {} ({})", student.name, student.id);
    });
    Ok(())
}

/// Update a student.
pub fn students_update(
    app: &App,
    id: &str,
    fields: StudentFields,
    status: Option<StudentStatus>,
    format: OutputFormat,
) -> Result<()> {
    if let Some(mobile) = &fields.mobile {
        check_mobile("Mobile number", mobile)?;
    }
    if let Some(mobile) = &fields.parent_mobile {
        check_mobile("Parent mobile number", mobile)?;
    }

    let update = StudentUpdate {
        name: fields.name,
        mobile: fields.mobile,
        email: fields.email,
        parent_name: fields.parent_name,
        parent_mobile: fields.parent_mobile,
        address: fields.address,
        vehicle_number: fields.vehicle_number,
        photo: fields.photo,
        registration_date: fields.registered,
        fee_expiry_date: fields.expires,
        last_fee_payment: None,
        status,
        payment_mode: None,
    };

    let Some(student) = app
        .engine
        .update_student(&StudentId::from_string(id), update)?
    else {
        bail!("Student not found: {}", id);
    };

    output::print(&student, format, |student| {
        println!("Updated {} ({})", student.name, student.id);
    });
    Ok(())
}

/// Remove a student.
pub fn students_delete(app: &App, id: &str, format: OutputFormat) -> Result<()> {
    let student = find_student(app, id)?;
    if !app.engine.delete_student(&student.id)? {
        bail!("Student not found: {}", id);
    }

    output::print_success(&format!("Removed {}", student.name), format);
    Ok(())
}

/// Search by name, mobile or seat.
pub fn students_search(app: &App, term: &str, format: OutputFormat) -> Result<()> {
    let snapshot = app.engine.snapshot();
    let students = search_students(&snapshot, term);

    output::print(&students, format, |students| print_students(students));
    Ok(())
}
