use chrono::{DateTime, Utc};

use crate::record::HistoryItem;

/// Which partition a presentation-facing helper is rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Screenshots,
    Downloads,
}

/// Fallback title when a record carries no resolvable name at all.
const UNTITLED: &str = "Untitled";

/// Length of the capture stamp a screenshot filename carries,
/// `YYYY-MM-DDTHH-MM-SS-mmmZ`.
const STAMP_LEN: usize = 24;

/// Human-facing name for one item.
///
/// Downloads show the resolved leaf unchanged. Screenshots strip the
/// `screenshot_` prefix, collapse runs of underscores, then strip a
/// trailing capture stamp (with its optional leading underscore) and any
/// `.png` suffix before re-appending `.png`. When the stamp was the whole
/// base name, stripping leaves just `.png`; that degenerate result is
/// intentional and relied upon by the search path.
pub fn display_name(item: &HistoryItem, view: ViewKind) -> String {
    let name = if item.filename.is_empty() {
        UNTITLED.to_string()
    } else {
        item.filename.clone()
    };
    match view {
        ViewKind::Downloads => name,
        ViewKind::Screenshots => {
            let stripped = name.strip_prefix("screenshot_").unwrap_or(&name);
            let collapsed = collapse_underscores(stripped);
            let base = strip_trailing_stamp(&collapsed);
            format!("{base}.png")
        }
    }
}

/// Name used when matching a search query against a screenshot: stamp and
/// extension removed entirely, then the prefix.
pub(crate) fn search_name(item: &HistoryItem, view: ViewKind) -> String {
    let name = if item.filename.is_empty() {
        UNTITLED.to_string()
    } else {
        item.filename.clone()
    };
    match view {
        ViewKind::Downloads => name,
        ViewKind::Screenshots => {
            let base = strip_trailing_stamp(&name);
            base.strip_prefix("screenshot_").unwrap_or(&base).to_string()
        }
    }
}

/// Date as the history page renders it, e.g. `Jan 1, 2024`.
pub fn format_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y").to_string()
}

/// Time as the history page renders it, e.g. `03:04:05 PM`.
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%I:%M:%S %p").to_string()
}

fn collapse_underscores(name: &str) -> String {
    let mut collapsed = String::with_capacity(name.len());
    let mut previous_underscore = false;
    for c in name.chars() {
        if c == '_' {
            if !previous_underscore {
                collapsed.push(c);
            }
            previous_underscore = true;
        } else {
            collapsed.push(c);
            previous_underscore = false;
        }
    }
    collapsed
}

/// Removes a trailing `.png` and a trailing capture stamp, in that order.
fn strip_trailing_stamp(name: &str) -> String {
    let mut base = name;
    if let Some(start) = base.len().checked_sub(4) {
        if base.is_char_boundary(start) && base[start..].eq_ignore_ascii_case(".png") {
            base = &base[..start];
        }
    }
    if let Some(start) = stamp_start(base) {
        base = &base[..start];
    }
    base.to_string()
}

/// Byte offset where a trailing capture stamp (and its optional leading
/// underscore) begins, if the name ends in one.
fn stamp_start(name: &str) -> Option<usize> {
    if name.len() < STAMP_LEN {
        return None;
    }
    let start = name.len() - STAMP_LEN;
    if !name.is_char_boundary(start) || !is_stamp(&name.as_bytes()[start..]) {
        return None;
    }
    if start > 0 && name.as_bytes()[start - 1] == b'_' {
        Some(start - 1)
    } else {
        Some(start)
    }
}

/// `YYYY-MM-DDTHH-MM-SS-mmmZ`, the shape the capture filename embeds.
fn is_stamp(bytes: &[u8]) -> bool {
    if bytes.len() != STAMP_LEN {
        return false;
    }
    const SEPARATORS: [(usize, u8); 7] = [
        (4, b'-'),
        (7, b'-'),
        (10, b'T'),
        (13, b'-'),
        (16, b'-'),
        (19, b'-'),
        (23, b'Z'),
    ];
    for (index, byte) in bytes.iter().enumerate() {
        match SEPARATORS.iter().find(|(position, _)| *position == index) {
            Some((_, expected)) => {
                let matches = if *expected == b'Z' {
                    byte.eq_ignore_ascii_case(expected)
                } else {
                    byte == expected
                };
                if !matches {
                    return false;
                }
            }
            None => {
                if !byte.is_ascii_digit() {
                    return false;
                }
            }
        }
    }
    true
}
