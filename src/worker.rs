//! Background indexer that walks every navigation page for methods and properties.
//!
//! The indexer processes one queued page per tick: a longer delay before the
//! first page, a shorter one between pages. Every attempted page is cached,
//! successful or not, so no page is fetched twice in a session. After every
//! step the active query is re-evaluated so results grow while indexing runs.

use crate::config::IndexerConfig;
use crate::fetch::{PageFetcher, parse_document};
use crate::search::{HeadingClassifier, SearchSession, SectionClassifier, extract_page_index};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Walks the session's page queue and feeds the extra entry pool.
pub struct BackgroundIndexer<F> {
    session: Arc<SearchSession>,
    fetcher: Arc<F>,
    classifier: Arc<dyn SectionClassifier>,
    config: IndexerConfig,
}

impl<F> std::fmt::Debug for BackgroundIndexer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundIndexer")
            .field("session", &self.session)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<F: PageFetcher> BackgroundIndexer<F> {
    /// Create an indexer that classifies sections by heading text.
    pub fn new(session: Arc<SearchSession>, fetcher: Arc<F>, config: IndexerConfig) -> Self {
        Self {
            session,
            fetcher,
            classifier: Arc::new(HeadingClassifier),
            config,
        }
    }

    /// Replace the section classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn SectionClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Run the walk as a tokio task.
    pub fn spawn(self) -> IndexerHandle {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move { self.run(token).await });
        IndexerHandle { cancel, task }
    }

    /// Walk the queue until it is empty or `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) {
        {
            let mut state = self.session.state_mut().await;
            if !state.deep_indexing() || state.queue_len() == 0 {
                state.set_indexing(false);
                tracing::debug!("Deep indexing disabled or nothing queued");
                return;
            }
            state.set_indexing(true);
            tracing::info!("Indexing {} page(s) in the background", state.queue_len());
        }
        self.session.publish_status().await;

        if !pause(&cancel, self.config.initial_delay()).await {
            self.stop().await;
            return;
        }

        loop {
            let Some(href) = self.session.state_mut().await.next_page() else {
                break;
            };

            tokio::select! {
                _ = cancel.cancelled() => {
                    self.stop().await;
                    return;
                }
                _ = self.index_page(&href) => {}
            }

            let remaining = {
                let mut state = self.session.state_mut().await;
                let remaining = state.queue_len();
                if remaining == 0 {
                    state.set_indexing(false);
                }
                remaining
            };
            self.session.refresh().await;

            if remaining == 0 {
                break;
            }
            if !pause(&cancel, self.config.tick_delay()).await {
                self.stop().await;
                return;
            }
        }

        let state = self.session.state().await;
        tracing::info!(
            "Indexing complete: {} page(s), {} extra entries",
            state.indexed_pages(),
            state.registry().extra().len()
        );
    }

    /// Index a single page, returning how many entries were new.
    ///
    /// Pages already cached are skipped. A failed fetch is cached as an
    /// empty page and never retried.
    pub async fn index_page(&self, href: &str) -> usize {
        if self.session.state().await.cached_page(href).is_some() {
            tracing::debug!("Page {} already indexed", href);
            return 0;
        }

        let entries = match self.fetcher.fetch(href).await {
            Ok(text) => {
                let index = {
                    let document = parse_document(&text);
                    extract_page_index(&document, href, self.classifier.as_ref())
                };
                tracing::debug!(
                    "Indexed {} ({}): {} entries",
                    href,
                    index.title,
                    index.entries.len()
                );
                index.entries
            }
            Err(e) => {
                tracing::warn!("Unable to index {}: {}", href, e);
                Vec::new()
            }
        };

        self.session.state_mut().await.record_page(href, entries)
    }

    async fn stop(&self) {
        self.session.state_mut().await.set_indexing(false);
        tracing::debug!("Background indexing cancelled");
    }
}

/// Sleep for `delay`, returning `false` if cancelled first.
async fn pause(cancel: &CancellationToken, delay: Duration) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

/// Handle to a running indexer task.
#[derive(Debug)]
pub struct IndexerHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl IndexerHandle {
    /// Stop the walk at its next suspension point.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the task to end.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::error!("Background indexer failed: {}", e);
        }
    }
}

/// Spawn a background indexer with the default classifier.
pub fn spawn_background_indexer<F: PageFetcher>(
    session: Arc<SearchSession>,
    fetcher: Arc<F>,
    config: IndexerConfig,
) -> IndexerHandle {
    BackgroundIndexer::new(session, fetcher, config).spawn()
}
