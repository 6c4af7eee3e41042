//! BibTeX serialization.

use super::record::Record;

/// Serializes records back to BibTeX text, one block per record.
#[must_use]
pub fn serialize_records(records: &[Record]) -> String {
    records.iter().map(serialize_record).collect()
}

/// Serializes one record.
///
/// Regular entries render as `@type{key,\n  field = {value},\n  ...\n}\n`,
/// with an empty key slot (`@type{,\n`) when the entry has no key.
/// A record with a raw body renders that body verbatim between the braces.
#[must_use]
pub fn serialize_record(record: &Record) -> String {
    let mut out = format!("@{}{{", record.entry_type);

    if let Some(body) = &record.raw_entry_body {
        out.push_str(body);
    } else {
        // The comma stays even without a key, so the key slot reads back empty.
        out.push_str(record.citation_key.as_deref().unwrap_or_default());
        out.push_str(",\n");
        let fields = record
            .tags
            .iter()
            .map(|(name, value)| format!("  {name} = {{{value}}}"))
            .collect::<Vec<_>>()
            .join(",\n");
        out.push_str(&fields);
        out.push('\n');
    }

    out.push_str("}\n");
    out
}
