//! Sequential pagination over a listing.
//!
//! Biblio listings do not reliably say which page is the last one. Past the
//! end they keep serving their final page, so a page whose first entry has the
//! same identifying link as the previously accepted page marks exhaustion. An
//! empty page does too. Pages are fetched strictly one after another because
//! each decision depends on the page before it.

use tracing::{debug, info, instrument};
use url::Url;

use super::error::FetchError;
use super::fetcher::PageSource;

/// Upper bound on pages visited when the caller does not fix the count.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Attachment reference per listing entry, in listing order.
pub type AttachmentList = Vec<Option<Url>>;

/// How many pages the crawler may visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLimit {
    /// Stop on an empty or repeated page, visiting at most `max_pages`.
    Auto {
        /// Hard upper bound on pages fetched.
        max_pages: u32,
    },
    /// Visit exactly this many pages; only an empty page stops early.
    ///
    /// The repeated-page check is disabled, for listings whose last real page
    /// genuinely starts with the same entry as the page before it.
    Exact(u32),
}

impl Default for PageLimit {
    fn default() -> Self {
        Self::Auto {
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl PageLimit {
    fn pages(self) -> u32 {
        match self {
            Self::Auto { max_pages } => max_pages,
            Self::Exact(pages) => pages,
        }
    }
}

/// Why the crawl ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Page `page` had no entries.
    EmptyPage {
        /// Zero-based index of the empty page.
        page: u32,
    },
    /// Page `page` started with the same entry as the page before it.
    RepeatedPage {
        /// Zero-based index of the repeated page.
        page: u32,
    },
    /// The page limit was reached.
    PageLimit,
}

/// Outcome of a crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlResult {
    /// Concatenated attachment references of every accepted page.
    pub attachments: AttachmentList,
    /// Identifying link per entry, aligned with `attachments`.
    pub identifiers: Vec<Option<String>>,
    /// Number of pages accepted.
    pub pages_accepted: u32,
    /// Export link found on page 0.
    pub export_link: Url,
    /// Why the crawl ended.
    pub stop: StopReason,
}

/// Visits pages `0, 1, 2, ...` of `source` until the listing is exhausted.
///
/// Page 0 is always fetched, whatever the limit, because it carries the
/// export link.
///
/// # Errors
///
/// Returns the first [`FetchError`] raised by `source`, or
/// [`FetchError::MissingExportLink`] when page 0 has no export link. Nothing
/// fetched so far is kept.
#[instrument(skip(source))]
pub async fn crawl(source: &dyn PageSource, limit: PageLimit) -> Result<CrawlResult, FetchError> {
    let check_repeats = matches!(limit, PageLimit::Auto { .. });
    let mut attachments = AttachmentList::new();
    let mut identifiers = Vec::new();
    let mut previous_first: Option<String> = None;
    let mut pages_accepted = 0;
    let mut stop = StopReason::PageLimit;

    let mut first_page = source.fetch_page(0).await?;
    let export_link = first_page
        .export_link
        .take()
        .ok_or(FetchError::MissingExportLink)?;
    let mut prefetched = Some(first_page);

    for index in 0..limit.pages().max(1) {
        let page = match prefetched.take() {
            Some(page) => page,
            None => source.fetch_page(index).await?,
        };

        if page.is_empty() {
            info!(page = index, "listing page is empty, stopping");
            stop = StopReason::EmptyPage { page: index };
            break;
        }

        let first = page.first_identifier().map(str::to_string);
        if check_repeats && first.is_some() && first == previous_first {
            info!(
                page = index,
                first_entry = first.as_deref(),
                "listing page repeats the previous page, stopping"
            );
            stop = StopReason::RepeatedPage { page: index };
            break;
        }

        info!(page = index, entries = page.len(), "accepted listing page");
        attachments.extend(page.attachments());
        identifiers.extend(page.entries.into_iter().map(|e| e.identifier));
        previous_first = first;
        pages_accepted += 1;
    }

    debug!(
        pages_accepted,
        entries = attachments.len(),
        with_attachment = attachments.iter().filter(|a| a.is_some()).count(),
        ?stop,
        "crawl finished"
    );

    Ok(CrawlResult {
        attachments,
        identifiers,
        pages_accepted,
        export_link,
        stop,
    })
}
