//! Logging initialization.
//!
//! Every binary calls [`init_logging`] once at startup and uses plain
//! `tracing` macros afterwards. Output goes to structured JSONL at
//! `~/.library-desk/logs/library.jsonl`, optionally mirrored to stderr.

use crate::{CoreError, CoreResult, Paths};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the logging system.
///
/// - JSONL file layer at [`Paths::log_file`]
/// - Level from `RUST_LOG` when set, otherwise `level`
/// - Compact stderr layer when `also_stderr` is set
///
/// # Example
///
/// ```ignore
/// init_logging("info", &paths, false)?;
/// tracing::info!("librarian started");
/// ```
pub fn init_logging(level: &str, paths: &Paths, also_stderr: bool) -> CoreResult<()> {
    std::fs::create_dir_all(paths.logs_dir())?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths.log_file())?;

    let default_level = parse_level(level).to_string().to_lowercase();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(Mutex::new(file));

    let stderr_layer = also_stderr.then(|| {
        fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| CoreError::Config(format!("logging already initialized: {e}")))
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
