//! Drupal Biblio listing pages: extraction and pagination.
//!
//! - [`parse_listing_page`] pulls the per-entry attachment links (and, on the
//!   first page, the bulk-export link) out of one page of markup
//! - [`ListingFetcher`] is the HTTP [`PageSource`]
//! - [`crawl`] walks pages in order until the listing is exhausted and
//!   concatenates their attachment references into one [`AttachmentList`]

mod crawler;
mod error;
mod fetcher;
mod page;

pub use crawler::{AttachmentList, CrawlResult, DEFAULT_MAX_PAGES, PageLimit, StopReason, crawl};
pub use error::FetchError;
pub use fetcher::{ListingFetcher, PageSource};
pub use page::{
    ATTACHMENT_SELECTOR, ENTRY_SELECTOR, EXPORT_FALLBACK_PATH, EXPORT_SELECTOR, ListingEntry,
    ListingPage, fallback_export_url, parse_listing_page,
};
