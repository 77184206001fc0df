//! Wiring: config, logging, storage, import source and outbox.

use anyhow::{Context, Result};
use library_config_and_utils::{init_logging, Config, Paths};
use library_engine::{ImportSource, LibraryEngine, StaticImportSource};
use library_import::CsvImportSource;
use library_outbox::{
    LinkOpener, LinkSender, OutboxQueue, OutboxResult, OutboxSink, QueueStatus, SenderConfig,
    SystemOpener,
};
use library_storage::{create_storage, KeyValueStorage, SessionProvider, StaticSession};
use std::sync::Arc;
use tracing::{info, warn};

/// Global flags that affect wiring.
pub struct AppOptions {
    pub owner: Option<String>,
    pub log_level: Option<String>,
    pub offline: bool,
    pub print_links: bool,
}

/// Prints deep links to stdout instead of opening them.
struct PrintOpener;

impl LinkOpener for PrintOpener {
    fn open(&self, url: &str) -> OutboxResult<()> {
        println!("{}", url);
        Ok(())
    }
}

/// An opened library plus its notification queue.
pub struct App {
    pub engine: LibraryEngine<OutboxSink>,
    outbox: OutboxQueue,
}

impl App {
    pub async fn open(options: AppOptions) -> Result<Self> {
        let paths = Paths::new().context("Failed to resolve data directory")?;
        paths.ensure_dirs()?;
        let config = Config::load(&paths).context("Failed to load config")?;

        let level = options.log_level.as_deref().unwrap_or(&config.log_level);
        init_logging(level, &paths, false)?;

        let session = match options.owner {
            Some(owner) => StaticSession::signed_in(owner),
            None => StaticSession::anonymous(),
        };
        if session.current_session_id().is_none() {
            warn!("No library owner set; changes will not be saved");
            eprintln!("Warning: no owner set (--owner or LIBRARY_OWNER_ID); changes will not be saved");
        }

        let importer: Arc<dyn ImportSource> = if options.offline {
            Arc::new(StaticImportSource::empty())
        } else {
            Arc::new(CsvImportSource::new(config.import_csv_url()?))
        };

        let opener: Arc<dyn LinkOpener> = if options.print_links {
            Arc::new(PrintOpener)
        } else {
            Arc::new(SystemOpener)
        };
        let outbox = OutboxQueue::spawn(LinkSender::new(SenderConfig::from(&config), opener));

        let storage: Arc<dyn KeyValueStorage> = Arc::from(create_storage(&paths)?);
        let engine = LibraryEngine::open(
            storage,
            Arc::new(session),
            importer,
            OutboxSink::new(outbox.handle()),
        )
        .await;

        info!(offline = options.offline, "Library opened");
        Ok(Self { engine, outbox })
    }

    /// Delivers queued notifications, then shuts the queue down.
    pub async fn close(self) -> QueueStatus {
        let Self { engine, outbox } = self;
        drop(engine);

        let status = outbox.shutdown().await;
        if status.failed > 0 {
            eprintln!("Warning: {} message(s) could not be opened", status.failed);
        }
        status
    }
}
