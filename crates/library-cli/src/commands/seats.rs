//! Seat commands.

use super::students::print_students;
use crate::app::App;
use crate::output::{self, OutputFormat};
use anyhow::{bail, Result};
use library_engine::views::seatable_students;
use library_engine::{LibraryReader, LibraryWriter, Seat, StudentId};

/// List seats.
pub fn seats_list(app: &App, vacant: bool, occupied: bool, format: OutputFormat) -> Result<()> {
    let snapshot = app.engine.snapshot();
    let seats: Vec<&Seat> = snapshot
        .seats()
        .iter()
        .filter(|seat| !(vacant && seat.is_occupied) && !(occupied && !seat.is_occupied))
        .collect();

    output::print(&seats, format, |seats| {
        println!("{:<6} {:<24} {}", "Seat", "Student", "Since");
        println!("{}", "-".repeat(50));
        for seat in seats {
            println!(
                "{:<6} {:<24} {}",
                seat.number,
                output::or_dash(seat.student_name.as_deref()),
                seat.assigned_date
                    .map(output::date)
                    .unwrap_or_else(|| "-".to_string())
            );
        }
        let taken = snapshot.seats().iter().filter(|s| s.is_occupied).count();
        println!(
            "\n{} occupied, {} available",
            taken,
            snapshot.seats().len() - taken
        );
    });
    Ok(())
}

/// Assign a seat.
pub fn seats_assign(app: &App, seat: u16, student: &str, format: OutputFormat) -> Result<()> {
    let student_id = StudentId::from_string(student);
    let Some(name) = app.engine.student(&student_id).map(|s| s.name) else {
        bail!("Student not found: {}", student);
    };
    if !app.engine.assign_seat(seat, &student_id)? {
        bail!("Seat {} could not be assigned", seat);
    }

    output::print_success(&format!("Seat {} assigned to {}", seat, name), format);
    Ok(())
}

/// Release a seat.
pub fn seats_release(app: &App, seat: u16, format: OutputFormat) -> Result<()> {
    if !app.engine.release_seat(seat)? {
        bail!("Seat {} is not occupied", seat);
    }

    output::print_success(&format!("Seat {} released", seat), format);
    Ok(())
}

/// Active students who could take a seat.
pub fn seats_candidates(app: &App, term: &str, format: OutputFormat) -> Result<()> {
    let snapshot = app.engine.snapshot();
    let students = seatable_students(&snapshot, term);

    output::print(&students, format, |students| print_students(students));
    Ok(())
}
