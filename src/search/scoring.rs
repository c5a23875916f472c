//! Match tiers for search entries.
//!
//! Lower ranks are better. The tiers are deliberately coarse: exact, prefix,
//! title substring, and blob substring.

use super::entry::SearchEntry;

/// Rank of a query against an entry.
///
/// Returns:
/// - 0: title equals the query
/// - 1: title starts with the query
/// - 2: title contains the query
/// - 3: title, section, context or keywords contain the query
/// - None: no match
///
/// `normalized_query` must already be lowercase.
pub fn evaluate_match(entry: &SearchEntry, normalized_query: &str) -> Option<u32> {
    let title = entry.title_lower.as_str();
    if title == normalized_query {
        Some(0)
    } else if title.starts_with(normalized_query) {
        Some(1)
    } else if title.contains(normalized_query) {
        Some(2)
    } else if !entry.search_blob.is_empty() && entry.search_blob.contains(normalized_query) {
        Some(3)
    } else {
        None
    }
}
