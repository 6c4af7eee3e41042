//! Integration tests for the full export run.
//!
//! A mock Biblio site serves listing pages, the bulk BibTeX export and the
//! attached papers; each test drives [`Exporter::run`] against it.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use biblio_export::export::RepairDecision;
use biblio_export::{
    ExportConfig, ExportError, Exporter, FetchError, HttpClient, PageLimit, RepairPrompt,
    parse_records,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXPORT_BUTTON: &str = r#"<div class="biblio-export"><span class="biblio_bibtex"><a href="/biblio/export/bibtex">BibTeX</a></span></div>"#;

const ENTRIES: &str = r#"
<div class="biblio-entry">
  <span class="biblio-title"><a href="/node/1">Alpha</a></span>
  <span class="biblio_file_links"><a href="/files/alpha.pdf">PDF</a></span>
</div>
<div class="biblio-entry">
  <span class="biblio-title"><a href="/node/2">Beta</a></span>
</div>
<div class="biblio-entry">
  <span class="biblio-title"><a href="/node/3">Gamma</a></span>
  <span class="biblio_file_links"><a href="/cdn/gamma.pdf">PDF</a></span>
</div>
"#;

const EXPORT: &str = r"
@inproceedings{alpha2020,
  title = {Alpha},
  url = {http://publisher.example/alpha},
  attachments = {http://lab.example/files/alpha.pdf}
}
@article{beta2019,
  title = {Beta},
  url = {http://publisher.example/beta}
}
@misc{gamma2018,
  title = {Gamma}
}
";

const BROKEN_EXPORT: &str = "@article{alpha2020, title {Alpha}}";

fn listing_html(with_button: bool, entries: &str) -> String {
    let button = if with_button { EXPORT_BUTTON } else { "" };
    format!("<html><body>{button}{entries}</body></html>")
}

async fn mount_page(server: &MockServer, page: Option<&str>, body: String, expected: u64) {
    let mock = Mock::given(method("GET")).and(path("/biblio"));
    let mock = match page {
        Some(index) => mock.and(query_param("page", index)),
        None => mock.and(query_param_is_missing("page")),
    };
    mock.respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, file_path: &str, status: u16, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

async fn mount_export(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/biblio/export/bibtex"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

fn config_in(dir: &TempDir, server: &MockServer) -> ExportConfig {
    let mut config = ExportConfig::new(format!("{}/biblio", server.uri()));
    config.bibtex_path = dir.path().join("out").join("bibtex.bib");
    config.papers_dir = dir.path().join("papers");
    config.recovery_path = dir.path().join("bibtex-recovery.bib");
    config
}

/// Prompt that fails the test if a repair is ever requested.
struct NoRepair;

#[async_trait]
impl RepairPrompt for NoRepair {
    async fn wait_for_fix(&self, _: &Path, diagnostic: &str) -> Result<RepairDecision, ExportError> {
        panic!("unexpected repair prompt: {diagnostic}");
    }
}

/// Prompt that writes a fixed text into the recovery file, then retries.
struct FixWith {
    text: &'static str,
    prompts: Mutex<u32>,
}

#[async_trait]
impl RepairPrompt for FixWith {
    async fn wait_for_fix(
        &self,
        recovery_path: &Path,
        _diagnostic: &str,
    ) -> Result<RepairDecision, ExportError> {
        *self.prompts.lock().unwrap() += 1;
        assert!(recovery_path.exists(), "recovery file should hold the export");
        std::fs::write(recovery_path, self.text).unwrap();
        Ok(RepairDecision::Retry)
    }
}

#[tokio::test]
async fn test_export_writes_rewritten_bibtex_and_downloads_papers() {
    let server = MockServer::start().await;
    let html = listing_html(true, ENTRIES);
    mount_page(&server, None, html.clone(), 1).await;
    // Out-of-range pages repeat the last page.
    mount_page(&server, Some("1"), html, 1).await;
    mount_page(&server, Some("2"), String::new(), 0).await;
    mount_export(&server, EXPORT).await;
    mount_file(&server, "/files/alpha.pdf", 200, b"%PDF-alpha").await;
    mount_file(&server, "/cdn/gamma.pdf", 200, b"%PDF-gamma").await;

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, &server);

    let summary = Exporter::new(HttpClient::new())
        .run(&config, &NoRepair)
        .await
        .unwrap();

    assert_eq!(summary.pages_accepted, 1);
    assert_eq!(summary.records, 3);
    assert_eq!(summary.entries, 3);
    assert_eq!(summary.attachments, 2);
    assert_eq!(summary.downloaded, 2);
    assert_eq!(summary.bytes, 20);

    let written = std::fs::read_to_string(&config.bibtex_path).unwrap();
    let records = parse_records(&written).unwrap();
    assert_eq!(records.len(), 3);

    let alpha = &records[0];
    assert_eq!(alpha.citation_key.as_deref(), Some("alpha2020"));
    assert_eq!(
        alpha.tags.get("url"),
        Some("/sites/default/files/papers/alpha.pdf")
    );
    assert_eq!(
        alpha.tags.get("original_publication"),
        Some("http://publisher.example/alpha")
    );
    assert!(!alpha.tags.contains("attachments"));

    let beta = &records[1];
    assert_eq!(beta.tags.get("url"), None);
    assert_eq!(
        beta.tags.get("original_publication"),
        Some("http://publisher.example/beta")
    );

    let gamma = &records[2];
    assert_eq!(
        gamma.tags.get("url"),
        Some("/sites/default/files/papers/gamma.pdf")
    );
    assert!(!gamma.tags.contains("original_publication"));

    assert_eq!(
        std::fs::read(config.papers_dir.join("alpha.pdf")).unwrap(),
        b"%PDF-alpha"
    );
    assert_eq!(
        std::fs::read(config.papers_dir.join("gamma.pdf")).unwrap(),
        b"%PDF-gamma"
    );
    assert!(!config.recovery_path.exists());
}

#[tokio::test]
async fn test_export_uses_fallback_endpoint_and_stops_on_empty_page() {
    let server = MockServer::start().await;
    mount_page(&server, None, listing_html(false, ENTRIES), 1).await;
    mount_page(&server, Some("1"), listing_html(false, ""), 1).await;
    mount_export(&server, EXPORT).await;
    mount_file(&server, "/files/alpha.pdf", 200, b"a").await;
    mount_file(&server, "/cdn/gamma.pdf", 200, b"g").await;

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, &server);

    let summary = Exporter::new(HttpClient::new())
        .run(&config, &NoRepair)
        .await
        .unwrap();

    assert_eq!(summary.pages_accepted, 1);
    assert_eq!(summary.downloaded, 2);
}

#[tokio::test]
async fn test_export_with_exact_page_count_fetches_only_those_pages() {
    let server = MockServer::start().await;
    mount_page(&server, None, listing_html(true, ENTRIES), 1).await;
    mount_page(&server, Some("1"), listing_html(true, ENTRIES), 0).await;
    mount_export(&server, EXPORT).await;
    mount_file(&server, "/files/alpha.pdf", 200, b"a").await;
    mount_file(&server, "/cdn/gamma.pdf", 200, b"g").await;

    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, &server);
    config.page_limit = PageLimit::Exact(1);

    let summary = Exporter::new(HttpClient::new())
        .run(&config, &NoRepair)
        .await
        .unwrap();

    assert_eq!(summary.pages_accepted, 1);
    assert_eq!(summary.records, 3);
}

#[tokio::test]
async fn test_export_count_mismatch_writes_nothing() {
    let server = MockServer::start().await;
    let two_entries = r#"
<div class="biblio-entry"><span class="biblio-title"><a href="/node/1">A</a></span>
  <span class="biblio_file_links"><a href="/files/alpha.pdf">PDF</a></span></div>
<div class="biblio-entry"><span class="biblio-title"><a href="/node/2">B</a></span></div>
"#;
    mount_page(&server, None, listing_html(true, two_entries), 1).await;
    mount_page(&server, Some("1"), listing_html(true, ""), 1).await;
    mount_export(&server, EXPORT).await;
    Mock::given(method("GET"))
        .and(path("/files/alpha.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, &server);

    let err = Exporter::new(HttpClient::new())
        .run(&config, &NoRepair)
        .await
        .unwrap_err();

    match err {
        ExportError::Correspondence {
            records,
            attachments,
        } => {
            assert_eq!(records, 3);
            assert_eq!(attachments, 2);
        }
        other => panic!("expected correspondence error, got {other}"),
    }
    assert!(!config.bibtex_path.exists());
    assert!(!config.papers_dir.exists());
}

#[tokio::test]
async fn test_export_resumes_after_manual_repair_without_recrawling() {
    let server = MockServer::start().await;
    mount_page(&server, None, listing_html(true, ENTRIES), 1).await;
    mount_page(&server, Some("1"), listing_html(true, ""), 1).await;
    mount_export(&server, BROKEN_EXPORT).await;
    mount_file(&server, "/files/alpha.pdf", 200, b"a").await;
    mount_file(&server, "/cdn/gamma.pdf", 200, b"g").await;

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, &server);
    let prompt = FixWith {
        text: EXPORT,
        prompts: Mutex::new(0),
    };

    let summary = Exporter::new(HttpClient::new())
        .run(&config, &prompt)
        .await
        .unwrap();

    assert_eq!(*prompt.prompts.lock().unwrap(), 1);
    assert_eq!(summary.records, 3);
    assert_eq!(summary.downloaded, 2);
    assert!(!config.recovery_path.exists());
}

#[tokio::test]
async fn test_export_failed_download_keeps_written_bibtex() {
    let server = MockServer::start().await;
    mount_page(&server, None, listing_html(true, ENTRIES), 1).await;
    mount_page(&server, Some("1"), listing_html(true, ""), 1).await;
    mount_export(&server, EXPORT).await;
    mount_file(&server, "/files/alpha.pdf", 200, b"a").await;
    mount_file(&server, "/cdn/gamma.pdf", 404, b"").await;

    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, &server);
    config.concurrency = 1;

    let err = Exporter::new(HttpClient::new())
        .run(&config, &NoRepair)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Download { .. }), "{err}");
    assert!(config.bibtex_path.exists(), "BibTeX is written before downloads");
}

#[tokio::test]
async fn test_export_first_page_failure_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/biblio"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, &server);

    let err = Exporter::new(HttpClient::new())
        .run(&config, &NoRepair)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ExportError::Fetch(FetchError::Page { page: 0, .. })),
        "{err}"
    );
    assert!(!config.bibtex_path.exists());
}

#[tokio::test]
async fn test_export_rejects_non_web_listing_url() {
    let dir = TempDir::new().unwrap();
    let mut config = ExportConfig::new("ftp://lab.example.edu/biblio");
    config.bibtex_path = dir.path().join("bibtex.bib");

    let err = Exporter::new(HttpClient::new())
        .run(&config, &NoRepair)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ExportError::Fetch(FetchError::InvalidUrl { .. })),
        "{err}"
    );
}
