//! HTTP import source for the published spreadsheet export.

use crate::parse::parse_students;
use async_trait::async_trait;
use chrono::{Local, Utc};
use library_engine::{ImportError, ImportSource, Student};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tracing::{info, warn};
use url::Url;

/// Appends a `t=<millis>` query parameter so intermediaries never serve a stale export.
pub fn cache_busted(url: &Url, millis: i64) -> Url {
    let mut busted = url.clone();
    busted
        .query_pairs_mut()
        .append_pair("t", &millis.to_string());
    busted
}

/// Fetches the CSV export over HTTP and parses it.
#[derive(Debug, Clone)]
pub struct CsvImportSource {
    url: Url,
    client: reqwest::Client,
}

impl CsvImportSource {
    pub fn new(url: Url) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    pub fn with_client(url: Url, client: reqwest::Client) -> Self {
        Self { url, client }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn fetch_text(&self) -> Result<String, ImportError> {
        let url = cache_busted(&self.url, Utc::now().timestamp_millis());
        info!(%url, "Fetching import CSV");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/csv")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| ImportError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Import source returned an error status");
            return Err(ImportError::Fetch(format!(
                "HTTP error! status: {}",
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| ImportError::Fetch(e.to_string()))
    }
}

#[async_trait]
impl ImportSource for CsvImportSource {
    async fn fetch_students(&self) -> Result<Vec<Student>, ImportError> {
        let text = self.fetch_text().await?;
        parse_students(&text, Local::now().date_naive())
    }
}
