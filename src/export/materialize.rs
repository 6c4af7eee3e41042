//! Concurrent download of attachments into the papers directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::align::AttachmentTarget;
use super::error::ExportError;
use crate::transport::HttpClient;

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 256;

/// Default number of simultaneous downloads.
pub const DEFAULT_CONCURRENCY: usize = 32;

/// Totals of a finished download phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeStats {
    /// Files written.
    pub downloaded: usize,
    /// Bytes written across all files.
    pub bytes: u64,
}

/// Downloads attachment targets into one directory.
///
/// Every target is spawned at once; a semaphore bounds how many transfers are
/// in flight. Two targets with the same filename race for the same path and
/// the last to finish wins.
#[derive(Debug)]
pub struct Materializer {
    client: HttpClient,
    papers_dir: PathBuf,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    show_progress: bool,
}

impl Materializer {
    /// Creates a materializer writing into `papers_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidConfig`] if `concurrency` is outside
    /// `1..=256`.
    pub fn new(
        client: HttpClient,
        papers_dir: impl Into<PathBuf>,
        concurrency: usize,
    ) -> Result<Self, ExportError> {
        validate_concurrency(concurrency)?;
        Ok(Self {
            client,
            papers_dir: papers_dir.into(),
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            show_progress: false,
        })
    }

    /// Draws a progress bar on stderr while downloading.
    #[must_use]
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    #[must_use]
    pub fn papers_dir(&self) -> &Path {
        &self.papers_dir
    }

    /// Downloads every target and waits for all of them.
    ///
    /// The papers directory (and its ancestors) is created first, even when
    /// there is nothing to download.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Io`] if the directory cannot be created, or the
    /// first [`ExportError::Download`]; remaining transfers are aborted then.
    #[instrument(skip(self, targets), fields(dir = %self.papers_dir.display(), targets = targets.len()))]
    pub async fn download_all(
        &self,
        targets: &[AttachmentTarget],
    ) -> Result<MaterializeStats, ExportError> {
        tokio::fs::create_dir_all(&self.papers_dir)
            .await
            .map_err(|e| ExportError::io(&self.papers_dir, e))?;

        info!(
            count = targets.len(),
            concurrency = self.concurrency,
            "downloading attachments"
        );
        let progress = self.progress_bar(targets.len());

        let mut tasks = JoinSet::new();
        for target in targets {
            let client = self.client.clone();
            let semaphore = Arc::clone(&self.semaphore);
            let url = target.url.to_string();
            let destination = self.papers_dir.join(&target.filename);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| ExportError::SemaphoreClosed)?;
                let bytes = client
                    .fetch_to_file(&url, &destination)
                    .await
                    .map_err(|e| ExportError::download(&url, e))?;
                debug!(url = %url, path = %destination.display(), bytes, "attachment saved");
                Ok::<u64, ExportError>(bytes)
            });
        }

        let mut stats = MaterializeStats::default();
        while let Some(joined) = tasks.join_next().await {
            match joined.map_err(ExportError::from).and_then(|outcome| outcome) {
                Ok(bytes) => {
                    stats.downloaded += 1;
                    stats.bytes += bytes;
                    progress.inc(1);
                }
                Err(e) => {
                    warn!(error = %e, pending = tasks.len(), "attachment download failed, aborting");
                    tasks.abort_all();
                    progress.abandon();
                    return Err(e);
                }
            }
        }

        progress.finish_and_clear();
        info!(
            downloaded = stats.downloaded,
            bytes = stats.bytes,
            "attachments downloaded"
        );
        Ok(stats)
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} attachments ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    }
}

pub(crate) fn validate_concurrency(concurrency: usize) -> Result<(), ExportError> {
    if (MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
        Ok(())
    } else {
        Err(ExportError::invalid_config(format!(
            "concurrency {concurrency} must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
        )))
    }
}
