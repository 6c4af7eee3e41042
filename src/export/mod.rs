//! The export pipeline.
//!
//! [`Exporter::run`] drives one export:
//!
//! 1. crawl the listing pages ([`crate::listing::crawl`])
//! 2. fetch the bulk BibTeX export and parse it, suspending for manual repair
//!    when it is malformed ([`parse_with_repair`])
//! 3. check the record/entry correspondence and rewrite attachment fields
//!    ([`align_records`])
//! 4. write the BibTeX file
//! 5. download every attachment ([`Materializer`])

mod align;
mod config;
mod error;
mod materialize;
mod pipeline;
mod repair;

pub use align::{
    ATTACHMENTS_FIELD, AttachmentTarget, DEFAULT_LOCAL_PREFIX, ORIGINAL_PUBLICATION_FIELD,
    URL_FIELD, align_records, local_url, rewrite_record,
};
pub use config::{DEFAULT_BIBTEX_FILE, DEFAULT_PAPERS_DIR, ExportConfig};
pub use error::ExportError;
pub use materialize::{
    DEFAULT_CONCURRENCY, MAX_CONCURRENCY, MIN_CONCURRENCY, MaterializeStats, Materializer,
};
pub use pipeline::{ExportSummary, Exporter};
pub use repair::{
    DEFAULT_RECOVERY_FILE, DIAGNOSTIC_LIMIT, RepairDecision, RepairPrompt, TerminalPrompt,
    parse_with_repair, truncate_diagnostic,
};
