//! Error types for listing retrieval.

use thiserror::Error;

use crate::transport::NetworkError;

/// Errors raised while retrieving listing pages or the bulk export.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A listing page could not be fetched.
    #[error("failed to fetch listing page {page}: {source}")]
    Page {
        /// Zero-based page index.
        page: u32,
        /// The transport failure.
        #[source]
        source: NetworkError,
    },

    /// The bulk BibTeX export could not be fetched.
    #[error("failed to fetch BibTeX export: {source}")]
    Export {
        /// The transport failure.
        #[source]
        source: NetworkError,
    },

    /// Page 0 came back without a link to the bulk export.
    #[error("listing page 0 has no BibTeX export link")]
    MissingExportLink,

    /// The listing URL (or a URL derived from it) is unusable.
    #[error("invalid listing URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl FetchError {
    /// Wraps a transport failure on listing page `page`.
    pub fn page(page: u32, source: NetworkError) -> Self {
        Self::Page { page, source }
    }

    /// Wraps a transport failure on the bulk export.
    pub fn export(source: NetworkError) -> Self {
        Self::Export { source }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_page_display_names_page_and_cause() {
        let err = FetchError::page(3, NetworkError::http_status("https://x.org/biblio?page=3", 502));
        let msg = err.to_string();
        assert!(msg.contains("page 3"), "{msg}");
        assert!(msg.contains("502"), "{msg}");
    }

    #[test]
    fn test_fetch_error_invalid_url_display() {
        let err = FetchError::invalid_url("ftp://x.org", "scheme 'ftp' is not supported");
        assert_eq!(
            err.to_string(),
            "invalid listing URL 'ftp://x.org': scheme 'ftp' is not supported"
        );
    }
}
