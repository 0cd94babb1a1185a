//! Filters over entry snapshots.
//!
//! These take the `Vec<Entry>` a vault hands out and never see key
//! material.  Secret fields are not searched.

use super::model::Entry;

/// Entries whose title, username, url, notes or tags contain `query`
/// (case-insensitive).  An empty query matches everything.
pub fn search_entries(entries: &[Entry], query: &str) -> Vec<Entry> {
    let needle = query.to_lowercase();

    entries
        .iter()
        .filter(|entry| {
            entry.title.to_lowercase().contains(&needle)
                || entry.username.to_lowercase().contains(&needle)
                || entry.url.to_lowercase().contains(&needle)
                || entry.notes.to_lowercase().contains(&needle)
                || entry
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Entries carrying exactly `tag`.
pub fn filter_by_tag(entries: &[Entry], tag: &str) -> Vec<Entry> {
    entries
        .iter()
        .filter(|entry| entry.tags.contains(tag))
        .cloned()
        .collect()
}

/// Entries marked as favorites.
pub fn favorites(entries: &[Entry]) -> Vec<Entry> {
    entries
        .iter()
        .filter(|entry| entry.is_favorite)
        .cloned()
        .collect()
}

/// Entries whose expiry time lies before `now`.
pub fn expired(entries: &[Entry], now: i64) -> Vec<Entry> {
    entries
        .iter()
        .filter(|entry| entry.is_expired(now))
        .cloned()
        .collect()
}
