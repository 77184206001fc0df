//! Notification commands.

use crate::app::App;
use crate::output::{self, OutputFormat};
use anyhow::{bail, Result};
use library_engine::views::display_timestamp;
use library_engine::{
    LibraryReader, LibraryWriter, NotificationKind, NotificationLogEntry, StudentId, StudentStatus,
};

/// Message one student.
pub fn notify_send(
    app: &App,
    student: &str,
    kind: NotificationKind,
    template: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let Some(entry) = app
        .engine
        .send_notification(&StudentId::from_string(student), kind, template)?
    else {
        bail!("Student not found: {}", student);
    };

    output::print(&entry, format, |entry| {
        println!("{} message queued for {}", entry.kind.label(), entry.student_name);
        println!("{}", entry.message);
    });
    Ok(())
}

/// Message several students.
pub fn notify_bulk(
    app: &App,
    students: &[String],
    all_active: bool,
    kind: NotificationKind,
    template: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let ids: Vec<StudentId> = if all_active {
        app.engine
            .snapshot()
            .students()
            .iter()
            .filter(|s| s.status == StudentStatus::Active)
            .map(|s| s.id.clone())
            .collect()
    } else {
        students.iter().map(StudentId::from_string).collect()
    };

    let sent = app.engine.send_bulk_notification(&ids, kind, template)?;
    if sent == 0 {
        bail!("No matching students to notify");
    }

    output::print_success(
        &format!("{} message queued for {} student(s)", kind.label(), sent),
        format,
    );
    Ok(())
}

/// Show the notification log, newest first.
pub fn notify_log(app: &App, limit: usize, format: OutputFormat) -> Result<()> {
    let snapshot = app.engine.snapshot();
    let entries: Vec<&NotificationLogEntry> =
        snapshot.notifications().iter().take(limit).collect();

    output::print(&entries, format, |entries| {
        if entries.is_empty() {
            println!("No messages sent yet");
        }
        for entry in entries {
            println!(
                "{:<24} {:<18} {:<24} {}",
                display_timestamp(entry.sent_at),
                entry.kind.label(),
                entry.student_name,
                entry.mobile
            );
        }
    });
    Ok(())
}
