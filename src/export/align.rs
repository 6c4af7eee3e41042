//! Positional alignment of exported records with crawled attachments.
//!
//! The bulk export and the listing pages enumerate the same entries in the
//! same order, but nothing ties a record to its listing entry except its
//! position. The only detectable drift is a count mismatch, which is fatal.

use tracing::{debug, instrument};
use url::Url;

use super::error::ExportError;
use crate::bibtex::Record;
use crate::transport::attachment_filename;

/// Path under which the site serves downloaded papers.
pub const DEFAULT_LOCAL_PREFIX: &str = "/sites/default/files/papers/";

/// Stale attachment metadata exported by Biblio.
pub const ATTACHMENTS_FIELD: &str = "attachments";
/// Field pointing at the entry's paper.
pub const URL_FIELD: &str = "url";
/// Field keeping a pre-existing external `url`.
pub const ORIGINAL_PUBLICATION_FIELD: &str = "original_publication";

/// A present attachment and the local filename it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentTarget {
    pub url: Url,
    pub filename: String,
}

impl AttachmentTarget {
    #[must_use]
    pub fn new(url: Url) -> Self {
        let filename = attachment_filename(&url);
        Self { url, filename }
    }
}

/// Checks the record/attachment correspondence and rewrites every entry.
///
/// Only regular entries take part; `@comment`-style blocks are left alone.
/// Returns the targets of all present attachments in listing order.
///
/// # Errors
///
/// Returns [`ExportError::Correspondence`] when the number of entries differs
/// from the number of attachment references. Records are untouched then.
#[instrument(skip_all, fields(records = records.len(), attachments = attachments.len()))]
pub fn align_records(
    records: &mut [Record],
    attachments: &[Option<Url>],
    local_prefix: &str,
) -> Result<Vec<AttachmentTarget>, ExportError> {
    let entries = records.iter().filter(|r| r.is_entry()).count();
    if entries != attachments.len() {
        return Err(ExportError::Correspondence {
            records: entries,
            attachments: attachments.len(),
        });
    }

    let mut targets = Vec::new();
    for (record, attachment) in records.iter_mut().filter(|r| r.is_entry()).zip(attachments) {
        let target = attachment.clone().map(AttachmentTarget::new);
        rewrite_record(record, target.as_ref(), local_prefix);
        targets.extend(target);
    }

    debug!(present = targets.len(), "aligned records with attachments");
    Ok(targets)
}

/// Rewrites the attachment-related fields of one record.
///
/// - `attachments` is removed
/// - an external `url` moves to `original_publication`
/// - with a target, `url` becomes the local path of its file
///
/// A `url` already under `local_prefix` is not external, so applying the
/// rewrite again changes nothing.
pub fn rewrite_record(record: &mut Record, target: Option<&AttachmentTarget>, local_prefix: &str) {
    record.tags.remove(ATTACHMENTS_FIELD);

    if record
        .tags
        .get(URL_FIELD)
        .is_some_and(|url| !url.starts_with(local_prefix))
    {
        record.tags.rename(URL_FIELD, ORIGINAL_PUBLICATION_FIELD);
    }

    if let Some(target) = target {
        record
            .tags
            .insert(URL_FIELD, local_url(local_prefix, &target.filename));
    }
}

/// Joins the local serving prefix and a filename with exactly one `/`.
#[must_use]
pub fn local_url(local_prefix: &str, filename: &str) -> String {
    format!("{}/{filename}", local_prefix.trim_end_matches('/'))
}
