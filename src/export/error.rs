//! Error type for the export pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::bibtex::ParseError;
use crate::listing::FetchError;
use crate::transport::NetworkError;

/// Errors that end an export run.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A listing page or the bulk export could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The exported records and the crawled entries disagree in number.
    ///
    /// The two sources are matched by position only, so no partial alignment
    /// is attempted.
    #[error(
        "BibTeX export has {records} entries but the listing has {attachments}; \
         the listing probably changed between fetches, run the export again"
    )]
    Correspondence {
        /// Entry records parsed from the export.
        records: usize,
        /// Entries crawled from the listing pages.
        attachments: usize,
    },

    /// An attachment download failed.
    #[error("failed to download attachment {url}: {source}")]
    Download {
        /// The attachment URL.
        url: String,
        /// The transport failure.
        #[source]
        source: NetworkError,
    },

    /// Reading or writing a local file failed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The operator abandoned the manual repair of a malformed export.
    #[error("BibTeX repair aborted; the unparsed export is left in {path}: {source}")]
    RepairAborted {
        /// The recovery file holding the last candidate text.
        path: PathBuf,
        /// The parse failure that was being repaired.
        #[source]
        source: ParseError,
    },

    /// The run configuration is unusable.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// What is wrong.
        reason: String,
    },

    /// A download task panicked or was cancelled.
    #[error("download task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The download semaphore was closed unexpectedly.
    #[error("download semaphore closed unexpectedly")]
    SemaphoreClosed,
}

impl ExportError {
    /// Creates an attachment download error.
    pub fn download(url: impl Into<String>, source: NetworkError) -> Self {
        Self::Download {
            url: url.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correspondence_error_reports_both_counts() {
        let msg = ExportError::Correspondence {
            records: 3,
            attachments: 2,
        }
        .to_string();
        assert!(msg.contains("3 entries"), "{msg}");
        assert!(msg.contains("has 2"), "{msg}");
    }

    #[test]
    fn test_repair_aborted_names_recovery_file() {
        let err = ExportError::RepairAborted {
            path: PathBuf::from("bibtex-recovery.bib"),
            source: ParseError::new(1, 1, "expected entry type after '@'"),
        };
        assert!(err.to_string().contains("bibtex-recovery.bib"));
    }
}
