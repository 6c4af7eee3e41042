//! HTTP transport for listing pages, the bulk export and attachment files.
//!
//! Two operations are exposed by [`HttpClient`]:
//!
//! - [`HttpClient::fetch_text`] buffers a response body as text
//! - [`HttpClient::fetch_to_file`] streams a response body to a destination path
//!
//! Neither retries. A failure is returned to the caller, which decides whether
//! it is fatal.
//!
//! # Example
//!
//! ```no_run
//! use biblio_export::transport::HttpClient;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let html = client.fetch_text("https://example.org/biblio").await?;
//! let bytes = client
//!     .fetch_to_file("https://example.org/files/paper.pdf", Path::new("papers/paper.pdf"))
//!     .await?;
//! println!("{} chars of markup, {bytes} bytes of paper", html.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
mod filename;

pub use client::HttpClient;
pub use constants::{CONNECT_TIMEOUT_SECS, REQUEST_TIMEOUT_SECS};
pub use error::NetworkError;
pub use filename::{FALLBACK_ATTACHMENT_NAME, attachment_filename};
