use chrono::{DateTime, Utc};
use url::Url;

use crate::record::leaf;

/// Filename prefix for captured screenshots.
const CAPTURE_PREFIX: &str = "SmartShot";

/// Maximum length of the cleaned title label in a capture filename.
const MAX_LABEL_CHARS: usize = 50;

/// Fallback extension when the MIME type gives no subtype.
const DEFAULT_EXTENSION: &str = "bin";

/// Composes `SmartShot_<label>_<timestamp>.png` for a new capture.
///
/// The label is the tab title with everything outside `[A-Za-z0-9_-]`
/// turned into spaces, whitespace runs collapsed to underscores, and the
/// result truncated to 50 characters. An empty title becomes the literal
/// label `screenshot`. The timestamp is ISO-8601 UTC with `:` and `.`
/// replaced by `-`, `T` by `_`, truncated to whole seconds, so captures
/// sort lexicographically.
pub fn capture_filename(title: &str, now: DateTime<Utc>) -> String {
    let label = capture_label(title);
    let stamp = now.format("%Y-%m-%d_%H-%M-%S");
    format!("{CAPTURE_PREFIX}_{label}_{stamp}.png")
}

fn capture_label(title: &str) -> String {
    let source = if title.is_empty() { "screenshot" } else { title };
    let spaced: String = source
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    joined.chars().take(MAX_LABEL_CHARS).collect()
}

/// Best-effort filename for a tracked download.
///
/// Precedence: the host-reported final filename's leaf, the original
/// event filename's leaf, then a name derived from the download URL (last
/// path segment, `filename` query parameter, or a synthesized
/// `download_<millis>.<ext>`). URL-derived names are prefixed with the
/// source page's domain when one can be extracted. A malformed download
/// URL is always recovered locally with `file_<millis>.<ext>`.
pub fn resolve_download_filename(
    final_name: Option<&str>,
    event_name: Option<&str>,
    url: &str,
    mime: Option<&str>,
    source_page: Option<&str>,
    now: DateTime<Utc>,
) -> String {
    if let Some(name) = final_name.and_then(leaf) {
        return name.to_string();
    }
    if let Some(name) = event_name.and_then(leaf) {
        return name.to_string();
    }

    let millis = now.timestamp_millis();
    let extension = mime
        .and_then(|m| m.split('/').nth(1))
        .filter(|sub| !sub.is_empty())
        .unwrap_or(DEFAULT_EXTENSION);

    let Ok(parsed) = Url::parse(url) else {
        return format!("file_{millis}.{extension}");
    };

    let derived = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .or_else(|| {
            parsed
                .query_pairs()
                .find(|(key, _)| key.as_ref() == "filename")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_else(|| format!("download_{millis}.{extension}"));

    match source_page.and_then(page_domain) {
        Some(domain) => format!("{domain}_{derived}"),
        None => derived,
    }
}

/// Registrable label of the source page's host, leading `www.` stripped.
/// `None` when the page URL does not parse (e.g. the `Unknown`
/// placeholder), in which case the derived name stays undecorated.
fn page_domain(page: &str) -> Option<String> {
    let parsed = Url::parse(page).ok()?;
    let host = parsed.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.split('.').next().map(str::to_string)
}
