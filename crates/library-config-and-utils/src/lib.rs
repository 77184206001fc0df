//! Configuration, paths, logging, and shared error types for Library Desk.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, DEFAULT_COUNTRY_CODE, DEFAULT_DISPATCH_INTERVAL_MS, DEFAULT_IMPORT_CSV_URL,
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_DISPATCH_RETRIES,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
