//! HTTP retrieval of listing pages.

use async_trait::async_trait;
use tracing::{instrument, warn};
use url::Url;

use super::error::FetchError;
use super::page::{ListingPage, fallback_export_url, parse_listing_page};
use crate::transport::HttpClient;

/// Source of listing pages, addressed by zero-based index.
///
/// The crawler only sees this trait, so pagination can be exercised without a
/// network.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Retrieves and extracts page `index`.
    ///
    /// Page 0 always carries an export link (the button, else the fallback
    /// endpoint).
    async fn fetch_page(&self, index: u32) -> Result<ListingPage, FetchError>;
}

/// [`PageSource`] backed by a live Biblio listing.
#[derive(Debug, Clone)]
pub struct ListingFetcher {
    client: HttpClient,
    base_url: Url,
}

impl ListingFetcher {
    /// Creates a fetcher for the listing at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] unless `base_url` is an absolute
    /// http(s) URL with a host.
    pub fn new(client: HttpClient, base_url: &str) -> Result<Self, FetchError> {
        let parsed =
            Url::parse(base_url).map_err(|e| FetchError::invalid_url(base_url, e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::invalid_url(
                base_url,
                format!("scheme '{}' is not supported", parsed.scheme()),
            ));
        }
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(FetchError::invalid_url(base_url, "URL has no host"));
        }
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of page `index`: the listing URL itself for page 0, otherwise the
    /// listing URL with `page=<index>` (replacing any existing `page`).
    #[must_use]
    pub fn page_url(&self, index: u32) -> Url {
        if index == 0 {
            return self.base_url.clone();
        }
        let kept: Vec<(String, String)> = self
            .base_url
            .query_pairs()
            .filter(|(name, _)| name != "page")
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect();

        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.clear();
            for (name, value) in &kept {
                query.append_pair(name, value);
            }
            query.append_pair("page", &index.to_string());
        }
        url
    }
}

#[async_trait]
impl PageSource for ListingFetcher {
    #[instrument(skip(self), fields(base = %self.base_url))]
    async fn fetch_page(&self, index: u32) -> Result<ListingPage, FetchError> {
        let url = self.page_url(index);
        let html = self
            .client
            .fetch_text(url.as_str())
            .await
            .map_err(|e| FetchError::page(index, e))?;

        let mut page = parse_listing_page(&html, &url);

        if index == 0 && page.export_link.is_none() {
            let fallback = fallback_export_url(&self.base_url)
                .map_err(|e| FetchError::invalid_url(self.base_url.as_str(), e.to_string()))?;
            warn!(fallback = %fallback, "BibTeX export button not found, using fallback");
            page.export_link = Some(fallback);
        } else if index > 0 {
            page.export_link = None;
        }

        Ok(page)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn fetcher(url: &str) -> ListingFetcher {
        ListingFetcher::new(HttpClient::new(), url).unwrap()
    }

    #[test]
    fn test_page_url_zero_is_base() {
        let f = fetcher("https://lab.example.edu/biblio");
        assert_eq!(f.page_url(0).as_str(), "https://lab.example.edu/biblio");
    }

    #[test]
    fn test_page_url_appends_page_parameter() {
        let f = fetcher("https://lab.example.edu/biblio");
        assert_eq!(f.page_url(2).as_str(), "https://lab.example.edu/biblio?page=2");
    }

    #[test]
    fn test_page_url_preserves_query_and_replaces_page() {
        let f = fetcher("https://lab.example.edu/biblio?s=year&page=7");
        assert_eq!(
            f.page_url(1).as_str(),
            "https://lab.example.edu/biblio?s=year&page=1"
        );
    }

    #[test]
    fn test_new_rejects_bad_urls() {
        for bad in ["not a url", "ftp://lab.example.edu/biblio", "file:///tmp/biblio"] {
            let err = ListingFetcher::new(HttpClient::new(), bad).unwrap_err();
            assert!(matches!(err, FetchError::InvalidUrl { .. }), "{bad}: {err}");
        }
    }
}
