//! Search context shared by query handling and the background indexer.
//!
//! A [`SearchSession`] owns the [`SearchState`] behind a tokio `RwLock` and
//! publishes every evaluated result set on a `watch` channel, so a reader
//! always sees the latest complete snapshot.

use super::entry::SearchEntry;
use super::query::{SearchStatus, is_searchable};
use super::state::SearchState;
use crate::config::SearchConfig;
use crate::nav::NavigationTree;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard, watch};
use tokio::task::JoinHandle;

/// A published result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchView {
    pub query: String,
    pub entries: Vec<SearchEntry>,
    #[serde(skip)]
    pub status: SearchStatus,
}

pub struct SearchSession {
    state: RwLock<SearchState>,
    config: SearchConfig,
    results: watch::Sender<SearchView>,
    /// Pending debounced evaluation, replaced on every keystroke
    debounce: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("config", &self.config)
            .field("query", &self.results.borrow().query)
            .finish_non_exhaustive()
    }
}

impl SearchSession {
    /// Create a session with base entries and the page queue prepared from `tree`.
    pub fn new(tree: Option<&NavigationTree>, deep_indexing: bool, config: SearchConfig) -> Arc<Self> {
        let state = SearchState::for_tree(tree, deep_indexing);
        let initial = SearchView {
            query: String::new(),
            entries: Vec::new(),
            status: state.status("", 0, &config),
        };
        let (results, _) = watch::channel(initial);
        Arc::new(Self {
            state: RwLock::new(state),
            config,
            results,
            debounce: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub async fn state(&self) -> RwLockReadGuard<'_, SearchState> {
        self.state.read().await
    }

    pub(crate) async fn state_mut(&self) -> RwLockWriteGuard<'_, SearchState> {
        self.state.write().await
    }

    /// Receive every published result set.
    pub fn subscribe(&self) -> watch::Receiver<SearchView> {
        self.results.subscribe()
    }

    /// The most recently published result set.
    pub fn current(&self) -> SearchView {
        self.results.borrow().clone()
    }

    /// Evaluate `query` now and publish the outcome.
    pub async fn perform_search(&self, query: &str) -> SearchView {
        let query = query.trim();
        let view = {
            let state = self.state.read().await;
            let entries = state.search(query, &self.config);
            let status = state.status(query, entries.len(), &self.config);
            SearchView {
                query: query.to_string(),
                entries,
                status,
            }
        };
        tracing::debug!(
            "Search {:?}: {} result(s)",
            view.query,
            view.entries.len()
        );
        self.results.send_replace(view.clone());
        view
    }

    /// Record `value` as the active query and evaluate it once input settles.
    ///
    /// Each call restarts the debounce window; only the last query within
    /// the window is evaluated.
    pub async fn handle_query(self: &Arc<Self>, value: &str) {
        let query = value.trim().to_string();
        self.state.write().await.set_active_query(&query);

        let session = Arc::clone(self);
        let delay = self.config.debounce();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            session.perform_search(&query).await;
        });

        if let Some(previous) = self.lock_debounce().replace(task) {
            previous.abort();
        }
    }

    /// Evaluate `value` immediately, dropping any pending debounced query.
    pub async fn submit(&self, value: &str) -> SearchView {
        self.cancel_pending();
        self.state.write().await.set_active_query(value);
        self.perform_search(value).await
    }

    /// Re-evaluate the active query after the registry grew.
    ///
    /// A query too short to search only has its status refreshed.
    pub async fn refresh(&self) {
        let query = self.state.read().await.active_query().to_string();
        if is_searchable(&query, &self.config) {
            self.perform_search(&query).await;
        } else {
            self.publish_status().await;
        }
    }

    /// Recompute the status line of the current result set.
    pub async fn publish_status(&self) {
        let status = {
            let state = self.state.read().await;
            let current = self.results.borrow();
            state.status(&current.query, current.entries.len(), &self.config)
        };
        self.results.send_if_modified(|view| {
            let changed = view.status != status;
            view.status = status;
            changed
        });
    }

    pub fn cancel_pending(&self) {
        if let Some(task) = self.lock_debounce().take() {
            task.abort();
        }
    }

    fn lock_debounce(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.debounce.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
