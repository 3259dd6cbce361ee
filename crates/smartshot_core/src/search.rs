use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::display::{format_date, format_time, search_name, ViewKind};
use crate::record::HistoryItem;

/// Field restriction the search box offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    All,
    Filename,
    Url,
    Timestamp,
}

/// Header counters for one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewStats {
    pub total: usize,
    pub today: usize,
    pub week: usize,
}

/// Case-insensitive substring match against one item. An empty or
/// whitespace-only query matches everything.
pub fn matches_query(item: &HistoryItem, query: &str, field: SearchField, view: ViewKind) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    match field {
        SearchField::Filename => name_matches(item, &query, view),
        SearchField::Url => url_matches(item, &query),
        SearchField::Timestamp => timestamp_matches(item, &query),
        SearchField::All => {
            name_matches(item, &query, view)
                || url_matches(item, &query)
                || timestamp_matches(item, &query)
        }
    }
}

/// Totals plus today/last-7-days counts, measured from local midnight of
/// `now`'s date.
pub fn view_stats(items: &[HistoryItem], now: DateTime<Utc>) -> ViewStats {
    let today_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let week_start = today_start - Duration::days(7);
    let mut stats = ViewStats {
        total: items.len(),
        ..ViewStats::default()
    };
    for item in items {
        let Some(timestamp) = item.timestamp else {
            continue;
        };
        if timestamp >= today_start {
            stats.today += 1;
        }
        if timestamp >= week_start {
            stats.week += 1;
        }
    }
    stats
}

fn name_matches(item: &HistoryItem, query: &str, view: ViewKind) -> bool {
    search_name(item, view).to_lowercase().contains(query)
}

fn url_matches(item: &HistoryItem, query: &str) -> bool {
    [
        item.url.as_deref(),
        item.download_url.as_deref(),
        item.source_url.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|url| url.to_lowercase().contains(query))
}

fn timestamp_matches(item: &HistoryItem, query: &str) -> bool {
    let Some(timestamp) = item.timestamp else {
        return false;
    };
    format_date(timestamp).to_lowercase().contains(query)
        || format_time(timestamp).to_lowercase().contains(query)
}
