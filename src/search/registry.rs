//! Deduplicated entry pools.

use super::entry::{EntryKey, SearchEntry};
use ahash::AHashSet;

/// Which pool an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    /// Object entries derived from the navigation tree, ranked first.
    Base,
    /// Method and property entries found by the background indexer.
    Extra,
}

/// Base and extra entries sharing one key set.
///
/// An entry is stored at most once across both pools for the registry's
/// lifetime; re-registering a known key is a silent no-op.
#[derive(Debug, Default)]
pub struct EntryRegistry {
    base: Vec<SearchEntry>,
    extra: Vec<SearchEntry>,
    keys: AHashSet<EntryKey>,
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `entry` into `pool` unless its key is already registered.
    ///
    /// Returns whether the entry was inserted.
    pub fn register(&mut self, pool: Pool, entry: SearchEntry) -> bool {
        if !self.keys.insert(entry.key()) {
            return false;
        }
        match pool {
            Pool::Base => self.base.push(entry),
            Pool::Extra => self.extra.push(entry),
        }
        true
    }

    /// Register every entry, returning how many were new.
    pub fn register_all(&mut self, pool: Pool, entries: impl IntoIterator<Item = SearchEntry>) -> usize {
        entries
            .into_iter()
            .filter(|entry| self.register(pool, entry.clone()))
            .count()
    }

    pub fn contains(&self, key: &EntryKey) -> bool {
        self.keys.contains(key)
    }

    pub fn base(&self) -> &[SearchEntry] {
        &self.base
    }

    pub fn extra(&self) -> &[SearchEntry] {
        &self.extra
    }

    pub fn len(&self) -> usize {
        self.base.len() + self.extra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
