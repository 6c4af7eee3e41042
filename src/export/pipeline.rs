//! End-to-end export run.

use std::path::Path;

use tracing::{info, instrument};

use super::align::align_records;
use super::config::ExportConfig;
use super::error::ExportError;
use super::materialize::Materializer;
use super::repair::{RepairPrompt, parse_with_repair};
use crate::bibtex::serialize_records;
use crate::listing::{FetchError, ListingFetcher, crawl};
use crate::transport::HttpClient;

/// Totals of a finished export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Listing pages accepted by the crawler.
    pub pages_accepted: u32,
    /// Records written to the BibTeX file.
    pub records: usize,
    /// Entries aligned with listing entries.
    pub entries: usize,
    /// Entries with an attachment.
    pub attachments: usize,
    /// Attachments downloaded.
    pub downloaded: usize,
    /// Bytes downloaded.
    pub bytes: u64,
}

/// Runs exports against live listings.
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    client: HttpClient,
}

impl Exporter {
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Crawls the listing, aligns and rewrites the exported records, writes the
    /// BibTeX file, then downloads every attachment.
    ///
    /// The BibTeX file is written only after crawling, parsing and alignment
    /// succeed. Downloads happen afterwards, so a failed download leaves a
    /// complete BibTeX file that references missing attachments.
    ///
    /// # Errors
    ///
    /// Returns the first [`ExportError`] of any stage.
    #[instrument(skip_all, fields(url = %config.biblio_url))]
    pub async fn run(
        &self,
        config: &ExportConfig,
        prompt: &dyn RepairPrompt,
    ) -> Result<ExportSummary, ExportError> {
        config.validate()?;
        let fetcher = ListingFetcher::new(self.client.clone(), &config.biblio_url)?;

        info!("crawling listing pages");
        let crawled = crawl(&fetcher, config.page_limit).await?;

        info!(url = %crawled.export_link, "fetching BibTeX export");
        let text = self
            .client
            .fetch_text(crawled.export_link.as_str())
            .await
            .map_err(FetchError::export)?;

        let mut records = parse_with_repair(text, &config.recovery_path, prompt).await?;
        let targets = align_records(&mut records, &crawled.attachments, &config.local_prefix)?;

        write_bibtex(&config.bibtex_path, &serialize_records(&records)).await?;
        info!(
            path = %config.bibtex_path.display(),
            records = records.len(),
            "exported BibTeX"
        );

        let materializer =
            Materializer::new(self.client.clone(), &config.papers_dir, config.concurrency)?
                .with_progress(config.show_progress);
        let stats = materializer.download_all(&targets).await?;

        Ok(ExportSummary {
            pages_accepted: crawled.pages_accepted,
            records: records.len(),
            entries: crawled.attachments.len(),
            attachments: targets.len(),
            downloaded: stats.downloaded,
            bytes: stats.bytes,
        })
    }
}

/// Writes the whole BibTeX text in one operation, creating parent directories.
async fn write_bibtex(path: &Path, contents: &str) -> Result<(), ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ExportError::io(parent, e))?;
    }
    tokio::fs::write(path, contents)
        .await
        .map_err(|e| ExportError::io(path, e))
}
