//! Run configuration for an export.

use std::path::PathBuf;

use super::align::DEFAULT_LOCAL_PREFIX;
use super::error::ExportError;
use super::materialize::{DEFAULT_CONCURRENCY, validate_concurrency};
use super::repair::DEFAULT_RECOVERY_FILE;
use crate::listing::PageLimit;

/// Default output BibTeX file.
pub const DEFAULT_BIBTEX_FILE: &str = "bibtex.bib";

/// Default attachment directory.
pub const DEFAULT_PAPERS_DIR: &str = "papers/";

/// Everything one export run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// Listing URL (page 0).
    pub biblio_url: String,
    /// Output BibTeX file, overwritten.
    pub bibtex_path: PathBuf,
    /// Directory receiving attachments.
    pub papers_dir: PathBuf,
    /// How many listing pages to visit.
    pub page_limit: PageLimit,
    /// Simultaneous attachment downloads.
    pub concurrency: usize,
    /// Transient file used while repairing a malformed export.
    pub recovery_path: PathBuf,
    /// Local serving path prefix written into `url` fields.
    pub local_prefix: String,
    /// Draw a download progress bar.
    pub show_progress: bool,
}

impl ExportConfig {
    /// Creates a configuration for `biblio_url` with every other value at its
    /// default.
    #[must_use]
    pub fn new(biblio_url: impl Into<String>) -> Self {
        Self {
            biblio_url: biblio_url.into(),
            bibtex_path: PathBuf::from(DEFAULT_BIBTEX_FILE),
            papers_dir: PathBuf::from(DEFAULT_PAPERS_DIR),
            page_limit: PageLimit::default(),
            concurrency: DEFAULT_CONCURRENCY,
            recovery_path: PathBuf::from(DEFAULT_RECOVERY_FILE),
            local_prefix: DEFAULT_LOCAL_PREFIX.to_string(),
            show_progress: false,
        }
    }

    /// Checks values that would otherwise fail halfway through a run.
    ///
    /// The listing URL itself is validated when the fetcher is built.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::InvalidConfig`] for an empty URL, a zero page
    /// count, an out-of-range concurrency, or an empty local prefix.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.biblio_url.trim().is_empty() {
            return Err(ExportError::invalid_config("listing URL is empty"));
        }
        match self.page_limit {
            PageLimit::Exact(0) => {
                return Err(ExportError::invalid_config("page count must be at least 1"));
            }
            PageLimit::Auto { max_pages: 0 } => {
                return Err(ExportError::invalid_config("maximum pages must be at least 1"));
            }
            _ => {}
        }
        validate_concurrency(self.concurrency)?;
        if self.local_prefix.trim().is_empty() {
            return Err(ExportError::invalid_config("local prefix is empty"));
        }
        Ok(())
    }
}
