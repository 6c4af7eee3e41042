//! Biblio Export Library
//!
//! Exports a Drupal Biblio listing into a single BibTeX file and downloads the
//! paper attached to each entry, re-pointing the entry's `url` at the local
//! copy.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`transport`] - HTTP fetches, buffered or streamed to disk
//! - [`bibtex`] - BibTeX record parsing and serialization
//! - [`listing`] - Listing page extraction and pagination
//! - [`export`] - Alignment, manual repair, attachment downloads, the full run

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bibtex;
pub mod export;
pub mod listing;
pub mod transport;
mod user_agent;

// Re-export commonly used types
pub use bibtex::{ParseError, Record, Tags, parse_records, serialize_records};
pub use export::{
    DEFAULT_CONCURRENCY, ExportConfig, ExportError, ExportSummary, Exporter, RepairPrompt,
    TerminalPrompt,
};
pub use listing::{DEFAULT_MAX_PAGES, FetchError, PageLimit};
pub use transport::{HttpClient, NetworkError};
