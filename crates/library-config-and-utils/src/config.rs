//! Configuration management for Library Desk.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default import spreadsheet URL (can be baked in at compile time via LIBRARY_IMPORT_CSV_URL).
pub const DEFAULT_IMPORT_CSV_URL: &str = match option_env!("LIBRARY_IMPORT_CSV_URL") {
    Some(url) => url,
    None => "https://docs.google.com/spreadsheets/d/e/library-desk-registrations/pub?output=csv",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Country calling code prefixed to bare 10-digit mobile numbers.
pub const DEFAULT_COUNTRY_CODE: &str = "91";

/// Minimum gap between two opened notification links.
pub const DEFAULT_DISPATCH_INTERVAL_MS: u64 = 1000;

/// Attempts per notification before the outbox gives up on it.
pub const DEFAULT_MAX_DISPATCH_RETRIES: u32 = 3;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Published CSV export of the registration spreadsheet.
    #[serde(default = "default_import_csv_url")]
    pub import_csv_url: String,
    /// Country code for notification deep links.
    #[serde(default = "default_country_code")]
    pub country_code: String,
    /// Delay between consecutive notification dispatches, in milliseconds.
    #[serde(default = "default_dispatch_interval_ms")]
    pub dispatch_interval_ms: u64,
    /// Maximum dispatch attempts per notification.
    #[serde(default = "default_max_dispatch_retries")]
    pub max_dispatch_retries: u32,
}

fn default_import_csv_url() -> String {
    DEFAULT_IMPORT_CSV_URL.to_string()
}

fn default_country_code() -> String {
    DEFAULT_COUNTRY_CODE.to_string()
}

fn default_dispatch_interval_ms() -> u64 {
    DEFAULT_DISPATCH_INTERVAL_MS
}

fn default_max_dispatch_retries() -> u32 {
    DEFAULT_MAX_DISPATCH_RETRIES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            import_csv_url: default_import_csv_url(),
            country_code: default_country_code(),
            dispatch_interval_ms: DEFAULT_DISPATCH_INTERVAL_MS,
            max_dispatch_retries: DEFAULT_MAX_DISPATCH_RETRIES,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults.
    ///
    /// Environment variables take precedence over the file.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("LIBRARY_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(url) = std::env::var("LIBRARY_IMPORT_CSV_URL") {
            if !url.trim().is_empty() {
                self.import_csv_url = url.trim().to_string();
            }
        }
    }

    /// Get the import URL as a parsed URL.
    pub fn import_csv_url(&self) -> CoreResult<Url> {
        let url = Url::parse(&self.import_csv_url)?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(CoreError::Config(format!(
                "import source must be http(s), got {other}"
            ))),
        }
    }
}
