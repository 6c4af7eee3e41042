//! Shared HTTP client for listing pages, the bulk export and attachments.

use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Response};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, warn};

use super::constants::{CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS};
use super::error::NetworkError;
use crate::user_agent;

/// Pooled HTTP client. Build it once and clone it; clones share connections.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Client with a 30 s connect timeout, a 300 s whole-request timeout and
    /// gzip decoding.
    ///
    /// # Panics
    ///
    /// Panics if reqwest cannot build a client from the fixed settings, which
    /// only happens when no TLS backend is available.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS)
    }

    /// Same as [`HttpClient::new`] with explicit timeouts, in seconds.
    ///
    /// # Panics
    ///
    /// See [`HttpClient::new`].
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_secs: u64, request_secs: u64) -> Self {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(connect_secs))
            .timeout(Duration::from_secs(request_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("reqwest client settings are static");
        Self { inner }
    }

    /// GETs `url` and returns the decoded body.
    ///
    /// # Errors
    ///
    /// [`NetworkError::HttpStatus`] for a non-2xx answer,
    /// [`NetworkError::Timeout`] or [`NetworkError::Network`] otherwise.
    #[instrument(skip(self))]
    pub async fn fetch_text(&self, url: &str) -> Result<String, NetworkError> {
        let body = self
            .get(url)
            .await?
            .text()
            .await
            .map_err(|e| NetworkError::network(url, e))?;
        debug!(len = body.len(), "received body");
        Ok(body)
    }

    /// GETs `url` and writes the body to `destination`, replacing any file
    /// already there. Returns the byte count once everything is flushed.
    ///
    /// Nothing is created when the server rejects the request. A transfer that
    /// breaks off leaves no partial file behind.
    ///
    /// # Errors
    ///
    /// As [`HttpClient::fetch_text`], plus [`NetworkError::Io`] when the
    /// destination cannot be written.
    #[instrument(skip(self), fields(destination = %destination.display()))]
    pub async fn fetch_to_file(&self, url: &str, destination: &Path) -> Result<u64, NetworkError> {
        let response = self.get(url).await?;
        let file = File::create(destination)
            .await
            .map_err(|e| NetworkError::io(destination, e))?;

        match copy_body(response, file, url, destination).await {
            Ok(bytes) => {
                debug!(bytes, "saved body");
                Ok(bytes)
            }
            Err(err) => {
                if let Err(cleanup) = tokio::fs::remove_file(destination).await {
                    warn!(error = %cleanup, "could not remove partial file");
                }
                Err(err)
            }
        }
    }

    async fn get(&self, url: &str) -> Result<Response, NetworkError> {
        let response = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|e| NetworkError::network(url, e))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            status => Err(NetworkError::http_status(url, status.as_u16())),
        }
    }
}

async fn copy_body(
    response: Response,
    file: File,
    url: &str,
    destination: &Path,
) -> Result<u64, NetworkError> {
    let mut out = BufWriter::new(file);
    let mut body = response.bytes_stream();
    let mut total = 0u64;

    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| NetworkError::network(url, e))?;
        out.write_all(&chunk)
            .await
            .map_err(|e| NetworkError::io(destination, e))?;
        total += chunk.len() as u64;
    }

    out.flush()
        .await
        .map_err(|e| NetworkError::io(destination, e))?;
    Ok(total)
}
