//! Query evaluation over the entry registry, plus user-facing status text.

use super::entry::SearchEntry;
use super::registry::EntryRegistry;
use super::scoring::evaluate_match;
use crate::config::SearchConfig;
use std::cmp::Ordering;
use std::fmt;

/// Whether `query` is long enough to be evaluated.
///
/// Length is counted in UTF-16 code units, so a single astral character such
/// as an emoji already counts as two.
pub fn is_searchable(query: &str, config: &SearchConfig) -> bool {
    query.encode_utf16().count() >= config.min_query_len
}

/// Rank every entry against `query` and return the best matches.
///
/// Base entries score their rank, extra entries their rank plus
/// `config.extra_weight`; ties are broken by title. Queries shorter than
/// `config.min_query_len` return nothing.
pub fn perform_search(registry: &EntryRegistry, query: &str, config: &SearchConfig) -> Vec<SearchEntry> {
    if !is_searchable(query, config) {
        return Vec::new();
    }
    let normalized = query.to_lowercase();

    let base = registry.base().iter().map(|entry| (entry, 0));
    let extra = registry
        .extra()
        .iter()
        .map(|entry| (entry, config.extra_weight));

    let mut matches: Vec<(u32, &SearchEntry)> = base
        .chain(extra)
        .filter_map(|(entry, weight)| {
            evaluate_match(entry, &normalized).map(|rank| (rank + weight, entry))
        })
        .collect();

    matches.sort_by(|(a_score, a), (b_score, b)| {
        a_score
            .cmp(b_score)
            .then_with(|| compare_titles(&a.title, &b.title))
    });

    matches
        .into_iter()
        .take(config.result_limit)
        .map(|(_, entry)| entry.clone())
        .collect()
}

/// Case-insensitive title order, falling back to the exact text.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Feedback shown next to the result list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Query too short.
    Prompt,
    /// Deep indexing unavailable; object names only.
    OfflineResults(usize),
    OfflineEmpty,
    /// Results found; `indexing` while the background walk continues.
    Results { count: usize, indexing: bool },
    /// Nothing yet, but pages are still being indexed.
    Pending,
    NoMatches,
}

impl SearchStatus {
    pub fn compute(searchable: bool, count: usize, deep_indexing: bool, indexing: bool) -> Self {
        if !searchable {
            Self::Prompt
        } else if !deep_indexing {
            if count > 0 {
                Self::OfflineResults(count)
            } else {
                Self::OfflineEmpty
            }
        } else if count > 0 {
            Self::Results { count, indexing }
        } else if indexing {
            Self::Pending
        } else {
            Self::NoMatches
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Prompt => f.write_str("Type at least two characters to search."),
            Self::OfflineResults(count) => write!(
                f,
                "{} result{}. Serve these docs over http(s) to include methods and properties in search.",
                count,
                plural(count)
            ),
            Self::OfflineEmpty => f.write_str(
                "Object names are searchable offline. Serve the docs over http(s) to search methods and properties.",
            ),
            Self::Results { count, indexing } => {
                write!(f, "{} result{}", count, plural(count))?;
                if indexing {
                    f.write_str(" (indexing continues…)")?;
                }
                Ok(())
            }
            Self::Pending => f.write_str("No matches yet. Indexing methods and properties…"),
            Self::NoMatches => f.write_str("No matches found."),
        }
    }
}
