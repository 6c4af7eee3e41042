//! Extraction of entries and links from one listing page.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

/// One bibliography entry on a listing page.
pub const ENTRY_SELECTOR: &str = ".biblio-entry";
/// Attachment anchor nested inside an entry.
pub const ATTACHMENT_SELECTOR: &str = ".biblio_file_links a[href]";
/// Title link identifying an entry.
pub const TITLE_SELECTOR: &str = ".biblio-title a[href]";
/// BibTeX export button on the first page.
pub const EXPORT_SELECTOR: &str = ".biblio-export .biblio_bibtex a[href]";
/// Path of the Biblio BibTeX export endpoint, used when the button is missing.
pub const EXPORT_FALLBACK_PATH: &str = "/biblio/export/bibtex";

#[allow(clippy::expect_used)]
static ENTRY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(ENTRY_SELECTOR).expect("entry selector is valid"));
#[allow(clippy::expect_used)]
static ATTACHMENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(ATTACHMENT_SELECTOR).expect("attachment selector is valid"));
#[allow(clippy::expect_used)]
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(TITLE_SELECTOR).expect("title selector is valid"));
#[allow(clippy::expect_used)]
static ANY_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("link selector is valid"));
#[allow(clippy::expect_used)]
static EXPORT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(EXPORT_SELECTOR).expect("export selector is valid"));

/// One entry as it appears on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// The entry's identifying link (title link, else its first link).
    pub identifier: Option<String>,
    /// Absolute attachment URL, or `None` when the entry has no attachment.
    pub attachment: Option<Url>,
}

/// Everything extracted from one listing page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Entries in document order.
    pub entries: Vec<ListingEntry>,
    /// Absolute URL of the BibTeX export button, when present.
    pub export_link: Option<Url>,
}

impl ListingPage {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Identifying link of the first entry.
    #[must_use]
    pub fn first_identifier(&self) -> Option<&str> {
        self.entries.first().and_then(|e| e.identifier.as_deref())
    }

    /// Attachment references in entry order.
    pub fn attachments(&self) -> impl Iterator<Item = Option<Url>> + '_ {
        self.entries.iter().map(|e| e.attachment.clone())
    }
}

/// Extracts entries and the export link from listing markup.
///
/// Relative links are resolved against `page_url`. An entry without an
/// attachment anchor yields `None`, which is not an error.
#[must_use]
pub fn parse_listing_page(html: &str, page_url: &Url) -> ListingPage {
    let document = Html::parse_document(html);

    let entries = document
        .select(&ENTRY)
        .map(|entry| ListingEntry {
            identifier: identifying_link(entry),
            attachment: first_href(entry, &ATTACHMENT).and_then(|href| resolve(page_url, href)),
        })
        .collect::<Vec<_>>();

    let export_link = document
        .select(&EXPORT)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve(page_url, href));

    debug!(
        entries = entries.len(),
        export_link = export_link.as_ref().map(Url::as_str),
        "parsed listing page"
    );

    ListingPage {
        entries,
        export_link,
    }
}

/// URL of the export endpoint on the listing's host.
///
/// # Errors
///
/// Returns the URL join error when `base` cannot carry a path.
pub fn fallback_export_url(base: &Url) -> Result<Url, url::ParseError> {
    base.join(EXPORT_FALLBACK_PATH)
}

fn identifying_link(entry: ElementRef<'_>) -> Option<String> {
    first_href(entry, &TITLE)
        .or_else(|| first_href(entry, &ANY_LINK))
        .map(|href| href.trim().to_string())
}

fn first_href<'a>(entry: ElementRef<'a>, selector: &Selector) -> Option<&'a str> {
    entry
        .select(selector)
        .next()
        .and_then(|a| a.value().attr("href"))
}

fn resolve(page_url: &Url, href: &str) -> Option<Url> {
    match page_url.join(href.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(url) => {
            warn!(href, scheme = url.scheme(), "ignoring non-web link");
            None
        }
        Err(e) => {
            warn!(href, error = %e, "ignoring unresolvable link");
            None
        }
    }
}
