use crate::record::RawRecord;

/// Substrings that mark a filename or path as screenshot-like.
const SCREENSHOT_MARKERS: [&str; 3] = ["screenshot", "capture", "screen"];

/// Scheme prefix a captured image carries when saved straight from memory.
const DATA_IMAGE_PREFIX: &str = "data:image/";

fn contains_marker(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    SCREENSHOT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// The single authoritative screenshot predicate. Earlier revisions of the
/// history pipeline carried two diverging copies of this check; every
/// caller must go through this one.
///
/// A record is a screenshot iff its resolved filename, its filepath, or a
/// `data:image/` URL marks it as one, AND it carries a positive size.
/// Zero is the size writers store when the real size is unknown, so
/// marker-named zero-size records stay in the download partition.
pub fn is_screenshot(record: &RawRecord) -> bool {
    let marked = record
        .resolved_filename()
        .map(contains_marker)
        .unwrap_or(false)
        || record
            .url
            .as_deref()
            .map(|url| url.starts_with(DATA_IMAGE_PREFIX))
            .unwrap_or(false)
        || record
            .filepath
            .as_deref()
            .map(contains_marker)
            .unwrap_or(false);

    marked && record.resolved_size().is_some_and(|size| size > 0)
}

/// Whether a URL is plausible as a generic download's link. Only plain
/// HTTP(S) qualifies; `blob:` and `data:` references are useless once the
/// originating page is gone.
pub fn is_usable_link(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
