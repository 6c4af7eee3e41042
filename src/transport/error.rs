//! Transport failures.

use std::path::PathBuf;

use thiserror::Error;

/// A fetch that did not produce a body.
///
/// Every variant carries the URL or path it concerns, so none of them can be
/// built from a bare `reqwest::Error` or `io::Error`.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The request never got a usable response (DNS, refused connection, TLS,
    /// or a body that broke off mid-stream).
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Connect or overall request timeout elapsed.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// The server answered, but not with a 2xx status.
    #[error("{url} answered with HTTP status {status}")]
    HttpStatus { url: String, status: u16 },

    /// The destination file could not be created or written.
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl NetworkError {
    /// Wraps a reqwest failure for `url`; timeouts become [`Self::Timeout`].
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
