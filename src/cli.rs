//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use biblio_export::export::{
    DEFAULT_BIBTEX_FILE, DEFAULT_LOCAL_PREFIX, DEFAULT_PAPERS_DIR, DEFAULT_RECOVERY_FILE,
};
use biblio_export::{DEFAULT_CONCURRENCY, DEFAULT_MAX_PAGES, ExportConfig, PageLimit};
use clap::Parser;

/// Export a Drupal Biblio listing to BibTeX and download the attached papers.
///
/// Every entry's `url` field is re-pointed at the local copy of its paper.
#[derive(Parser, Debug)]
#[command(name = "biblio-export")]
#[command(author, version, about)]
#[command(after_help = "Example: biblio-export https://linqs.soe.ucsc.edu/biblio")]
pub struct Args {
    /// Listing URL of the Biblio module (e.g. https://example.org/biblio)
    pub biblio_url: Option<String>,

    /// Output BibTeX file
    #[arg(short = 'b', long = "bibtex", value_name = "FILE", default_value = DEFAULT_BIBTEX_FILE)]
    pub bibtex: PathBuf,

    /// Number of listing pages to read (detected automatically by default)
    #[arg(short = 'n', long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub pages: Option<u32>,

    /// Directory to download papers into
    #[arg(short = 'p', long, value_name = "DIR", default_value = DEFAULT_PAPERS_DIR)]
    pub papers: PathBuf,

    /// Upper bound on listing pages when detecting the page count (1-10000)
    #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_PAGES, value_parser = clap::value_parser!(u32).range(1..=10_000))]
    pub max_pages: u32,

    /// Maximum concurrent paper downloads (1-256)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u16, value_parser = clap::value_parser!(u16).range(1..=256))]
    pub concurrency: u16,

    /// File holding a malformed export while it is repaired by hand
    #[arg(long, value_name = "FILE", default_value = DEFAULT_RECOVERY_FILE)]
    pub recovery_file: PathBuf,

    /// Path prefix under which the site serves the downloaded papers
    #[arg(long, value_name = "PATH", default_value = DEFAULT_LOCAL_PREFIX)]
    pub local_prefix: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Builds the run configuration for `biblio_url`.
    pub fn to_config(&self, biblio_url: &str, show_progress: bool) -> ExportConfig {
        let page_limit = match self.pages {
            Some(pages) => PageLimit::Exact(pages),
            None => PageLimit::Auto {
                max_pages: self.max_pages,
            },
        };
        ExportConfig {
            biblio_url: biblio_url.to_string(),
            bibtex_path: self.bibtex.clone(),
            papers_dir: self.papers.clone(),
            page_limit,
            concurrency: usize::from(self.concurrency),
            recovery_path: self.recovery_file.clone(),
            local_prefix: self.local_prefix.clone(),
            show_progress,
        }
    }
}
