//! Registry, page cache and indexing queue owned by one search session.

use super::entry::{EntryKind, EntryMeta, SearchEntry, build_search_entry};
use super::query::{SearchStatus, is_searchable, perform_search};
use super::registry::{EntryRegistry, Pool};
use crate::config::SearchConfig;
use crate::nav::NavigationTree;
use ahash::AHashMap;
use std::collections::VecDeque;

/// Mutable search state.
///
/// Only the initial preparation and the background indexer write to it;
/// queries read.
#[derive(Debug, Default)]
pub struct SearchState {
    registry: EntryRegistry,
    /// Every page the indexer has attempted, including failures (empty list)
    page_index: AHashMap<String, Vec<SearchEntry>>,
    queue: VecDeque<String>,
    indexing: bool,
    active_query: String,
    deep_indexing: bool,
}

impl SearchState {
    pub fn new(deep_indexing: bool) -> Self {
        Self {
            deep_indexing,
            ..Self::default()
        }
    }

    /// Build state for `tree`: object entries plus the page queue.
    pub fn for_tree(tree: Option<&NavigationTree>, deep_indexing: bool) -> Self {
        let mut state = Self::new(deep_indexing);
        if let Some(tree) = tree {
            state.prepare_base_entries(tree);
            state.build_index_queue(tree);
        }
        state
    }

    /// Register one object entry per navigation item.
    pub fn prepare_base_entries(&mut self, tree: &NavigationTree) -> usize {
        let entries = tree.items().filter_map(|(_, section, item)| {
            build_search_entry(
                EntryKind::Object,
                &item.title,
                &item.href,
                EntryMeta::section(&section.title),
            )
        });
        let added = self.registry.register_all(Pool::Base, entries);
        tracing::debug!("Prepared {} base search entries", added);
        added
    }

    /// Seed the queue with each distinct page of `tree`, in navigation order.
    pub fn build_index_queue(&mut self, tree: &NavigationTree) {
        self.queue = tree.distinct_pages().into();
    }

    pub fn next_page(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn cached_page(&self, href: &str) -> Option<&[SearchEntry]> {
        self.page_index.get(href).map(Vec::as_slice)
    }

    pub fn indexed_pages(&self) -> usize {
        self.page_index.len()
    }

    /// Cache `entries` for `href` and merge them into the extra pool.
    ///
    /// Returns how many entries were new to the registry.
    pub fn record_page(&mut self, href: &str, entries: Vec<SearchEntry>) -> usize {
        let added = self.registry.register_all(Pool::Extra, entries.iter().cloned());
        self.page_index.insert(href.to_string(), entries);
        added
    }

    pub fn registry(&self) -> &EntryRegistry {
        &self.registry
    }

    pub fn is_indexing(&self) -> bool {
        self.indexing
    }

    pub fn set_indexing(&mut self, indexing: bool) {
        self.indexing = indexing;
    }

    pub fn deep_indexing(&self) -> bool {
        self.deep_indexing
    }

    pub fn active_query(&self) -> &str {
        &self.active_query
    }

    pub fn set_active_query(&mut self, query: &str) {
        self.active_query = query.trim().to_string();
    }

    pub fn search(&self, query: &str, config: &SearchConfig) -> Vec<SearchEntry> {
        perform_search(&self.registry, query.trim(), config)
    }

    pub fn status(&self, query: &str, count: usize, config: &SearchConfig) -> SearchStatus {
        SearchStatus::compute(
            is_searchable(query.trim(), config),
            count,
            self.deep_indexing,
            self.indexing,
        )
    }
}
