//! Local filename derivation for attachment URLs.

use url::Url;

/// Name used when an attachment URL has no usable path segment.
pub const FALLBACK_ATTACHMENT_NAME: &str = "attachment.bin";

/// Characters that cannot appear in a file name on at least one common
/// filesystem.
const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Derives the local filename for an attachment from its URL path basename.
///
/// The last non-empty path segment is used as-is (no percent-decoding), so the
/// name matches what the listing serves. The result always names a file
/// directly inside the papers directory.
#[must_use]
pub fn attachment_filename(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.rfind(|s| !s.is_empty()))
        .map_or_else(|| FALLBACK_ATTACHMENT_NAME.to_string(), local_name)
}

/// Makes one path segment safe to join onto the papers directory.
///
/// Reserved and control characters become `_`. A segment made only of dots
/// (`.`, `..`) would address a directory, so its dots become `_` too.
fn local_name(segment: &str) -> String {
    let name: String = segment
        .chars()
        .map(|c| if RESERVED.contains(&c) || c.is_control() { '_' } else { c })
        .collect();

    if name.chars().all(|c| c == '.') {
        "_".repeat(name.chars().count().max(1))
    } else {
        name
    }
}
