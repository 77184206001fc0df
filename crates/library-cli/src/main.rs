//! Library Desk CLI - manage students, seats, fees and notifications.

mod app;
mod commands;
mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use library_engine::{NotificationKind, PaymentMode, StudentStatus, SEAT_COUNT};
use tracing::debug;

/// Library Desk CLI - run the study library from the terminal.
#[derive(Parser)]
#[command(name = "librarian")]
#[command(about = "Manage library students, seats, fees and notifications")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Library owner id; data is stored under this identity
    #[arg(long, env = "LIBRARY_OWNER_ID", global = true)]
    owner: Option<String>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Never contact the import source
    #[arg(long, global = true)]
    offline: bool,

    /// Print WhatsApp links instead of opening them
    #[arg(long, global = true)]
    print_links: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage students
    Students {
        #[command(subcommand)]
        command: StudentCommands,
    },

    /// Manage seats
    Seats {
        #[command(subcommand)]
        command: SeatCommands,
    },

    /// Record and list fee payments
    Fees {
        #[command(subcommand)]
        command: FeeCommands,
    },

    /// Show dashboard statistics
    Stats {
        /// Reference date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show recent activity
    Activity {
        /// Number of entries to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Generate reports
    Reports {
        #[command(subcommand)]
        command: ReportCommands,
    },

    /// Pull students from the registration spreadsheet
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },

    /// Send WhatsApp messages
    Notify {
        #[command(subcommand)]
        command: NotifyCommands,
    },
}

/// Student fields shared by `add` and `update`.
#[derive(clap::Args)]
pub struct StudentFields {
    /// Student name
    #[arg(long)]
    name: Option<String>,
    /// 10-digit mobile number
    #[arg(long)]
    mobile: Option<String>,
    /// Email address
    #[arg(long)]
    email: Option<String>,
    /// Parent or guardian name
    #[arg(long)]
    parent_name: Option<String>,
    /// Parent or guardian mobile number
    #[arg(long)]
    parent_mobile: Option<String>,
    /// Home address
    #[arg(long)]
    address: Option<String>,
    /// Vehicle registration number
    #[arg(long)]
    vehicle_number: Option<String>,
    /// Photo URL
    #[arg(long)]
    photo: Option<String>,
    /// Registration date (YYYY-MM-DD)
    #[arg(long)]
    registered: Option<NaiveDate>,
    /// Fee expiry date (YYYY-MM-DD)
    #[arg(long)]
    expires: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum StudentCommands {
    /// List students
    List {
        /// Filter by status
        #[arg(short, long)]
        status: Option<StudentStatus>,
    },
    /// Show student details
    Show {
        /// Student ID
        id: String,
    },
    /// Register a new student
    Add {
        #[command(flatten)]
        fields: StudentFields,
    },
    /// Update a student
    Update {
        /// Student ID
        id: String,
        #[command(flatten)]
        fields: StudentFields,
        /// New status
        #[arg(long)]
        status: Option<StudentStatus>,
    },
    /// Remove a student, releasing their seat
    Delete {
        /// Student ID
        id: String,
    },
    /// Search by name, mobile or seat number
    Search {
        /// Search term
        term: String,
    },
}

#[derive(Subcommand)]
enum SeatCommands {
    /// List seats
    List {
        /// Only show vacant seats
        #[arg(long, conflicts_with = "occupied")]
        vacant: bool,
        /// Only show occupied seats
        #[arg(long)]
        occupied: bool,
    },
    /// Assign a seat to a student
    Assign {
        /// Seat number
        #[arg(value_parser = clap::value_parser!(u16).range(1..=SEAT_COUNT as i64))]
        seat: u16,
        /// Student ID
        student: String,
    },
    /// Release a seat
    Release {
        /// Seat number
        #[arg(value_parser = clap::value_parser!(u16).range(1..=SEAT_COUNT as i64))]
        seat: u16,
    },
    /// Active students without a seat
    Candidates {
        /// Name filter
        #[arg(default_value = "")]
        term: String,
    },
}

#[derive(Subcommand)]
enum FeeCommands {
    /// Record a payment
    Record {
        /// Student ID
        student: String,
        /// Amount in rupees
        #[arg(short, long)]
        amount: u64,
        /// online or offline
        #[arg(short, long)]
        mode: PaymentMode,
        /// UPI, Card, Net Banking, Cash...
        #[arg(long, default_value = "Cash")]
        method: String,
        /// Payment date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// New fee expiry (defaults to one month after the payment)
        #[arg(long)]
        expires: Option<NaiveDate>,
    },
    /// List payments
    List {
        /// Only this student
        #[arg(long)]
        student: Option<String>,
        /// Only this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,
    },
}

#[derive(Subcommand)]
enum ReportCommands {
    /// Fee collection for one month
    Monthly {
        /// Month (YYYY-MM, defaults to the current month)
        month: Option<String>,
    },
    /// Registrations and status counts for a year
    Students {
        /// Year (defaults to the current year)
        year: Option<i32>,
    },
    /// Seat utilisation
    Seats,
    /// Revenue by month for a year
    Revenue {
        /// Year (defaults to the current year)
        year: Option<i32>,
    },
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Add students that are new in the spreadsheet
    Refresh,
}

#[derive(Subcommand)]
enum NotifyCommands {
    /// Message one student
    Send {
        /// Student ID
        student: String,
        /// welcome, fee-confirmation, fee-reminder, goodbye or custom
        #[arg(short, long)]
        kind: NotificationKind,
        /// Text for custom messages; `{name}` is replaced
        #[arg(short, long)]
        template: Option<String>,
    },
    /// Message several students
    Bulk {
        /// Student IDs
        #[arg(required_unless_present = "all_active")]
        students: Vec<String>,
        /// Every active student
        #[arg(long)]
        all_active: bool,
        /// welcome, fee-confirmation, fee-reminder, goodbye or custom
        #[arg(short, long)]
        kind: NotificationKind,
        /// Text sent instead of the kind's message; `{name}` is replaced
        #[arg(short, long)]
        template: Option<String>,
    },
    /// Show sent messages
    Log {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    let app = match app::App::open(app::AppOptions {
        owner: cli.owner,
        log_level: cli.log_level,
        offline: cli.offline,
        print_links: cli.print_links,
    })
    .await
    {
        Ok(app) => app,
        Err(e) => {
            output::print_error(&format!("{:#}", e), format);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Students { command } => match command {
            StudentCommands::List { status } => commands::students_list(&app, status, format),
            StudentCommands::Show { id } => commands::students_show(&app, &id, format),
            StudentCommands::Add { fields } => commands::students_add(&app, fields, format),
            StudentCommands::Update { id, fields, status } => {
                commands::students_update(&app, &id, fields, status, format)
            }
            StudentCommands::Delete { id } => commands::students_delete(&app, &id, format),
            StudentCommands::Search { term } => commands::students_search(&app, &term, format),
        },
        Commands::Seats { command } => match command {
            SeatCommands::List { vacant, occupied } => {
                commands::seats_list(&app, vacant, occupied, format)
            }
            SeatCommands::Assign { seat, student } => {
                commands::seats_assign(&app, seat, &student, format)
            }
            SeatCommands::Release { seat } => commands::seats_release(&app, seat, format),
            SeatCommands::Candidates { term } => commands::seats_candidates(&app, &term, format),
        },
        Commands::Fees { command } => match command {
            FeeCommands::Record {
                student,
                amount,
                mode,
                method,
                date,
                expires,
            } => commands::fees_record(
                &app,
                commands::PaymentArgs {
                    student,
                    amount,
                    mode,
                    method,
                    date,
                    expires,
                },
                format,
            ),
            FeeCommands::List { student, month } => {
                commands::fees_list(&app, student.as_deref(), month.as_deref(), format)
            }
        },
        Commands::Stats { date } => commands::stats(&app, date, format),
        Commands::Activity { limit } => commands::activity(&app, limit, format),
        Commands::Reports { command } => match command {
            ReportCommands::Monthly { month } => {
                commands::reports_monthly(&app, month.as_deref(), format)
            }
            ReportCommands::Students { year } => commands::reports_students(&app, year, format),
            ReportCommands::Seats => commands::reports_seats(&app, format),
            ReportCommands::Revenue { year } => commands::reports_revenue(&app, year, format),
        },
        Commands::Import { command } => match command {
            ImportCommands::Refresh => commands::import_refresh(&app, format).await,
        },
        Commands::Notify { command } => match command {
            NotifyCommands::Send {
                student,
                kind,
                template,
            } => commands::notify_send(&app, &student, kind, template.as_deref(), format),
            NotifyCommands::Bulk {
                students,
                all_active,
                kind,
                template,
            } => commands::notify_bulk(
                &app,
                &students,
                all_active,
                kind,
                template.as_deref(),
                format,
            ),
            NotifyCommands::Log { limit } => commands::notify_log(&app, limit, format),
        },
    };

    let status = app.close().await;
    debug!(?status, "Outbox drained");

    if let Err(e) = result {
        output::print_error(&format!("{:#}", e), format);
        std::process::exit(1);
    }
}
