//! Site context: one documentation site opened for navigation and search.
//!
//! Opening a site fetches the entry page, extracts (or restores) the
//! navigation tree, prepares the search session and, for network sites,
//! leaves the background indexer ready to start.

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{PageFetcher, SiteFetcher, parse_document};
use crate::nav::{
    FileStore, LoadMode, MemoryStore, NavigationController, NavigationOrigin, NavigationSettings,
    SnapshotStore, load_navigation,
};
use crate::search::{SearchSession, SectionClassifier};
use crate::worker::{BackgroundIndexer, IndexerHandle};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use tokio::sync::Mutex;

/// Everything the server needs for one site.
pub struct SiteContext<F> {
    config: Config,
    fetcher: Arc<F>,
    network: bool,
    product_title: String,
    origin: Option<NavigationOrigin>,
    session: Arc<SearchSession>,
    /// `None` when neither the entry page nor a snapshot provided navigation
    navigation: Option<Mutex<NavigationController<F>>>,
    indexer: StdMutex<Option<IndexerHandle>>,
}

impl<F> std::fmt::Debug for SiteContext<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteContext")
            .field("site_root", &self.config.site_root)
            .field("network", &self.network)
            .field("product_title", &self.product_title)
            .field("origin", &self.origin)
            .field("has_navigation", &self.navigation.is_some())
            .finish_non_exhaustive()
    }
}

impl SiteContext<SiteFetcher> {
    /// Open the site described by `config` with the fetcher and store it implies.
    pub async fn from_config(config: Config) -> Result<Self> {
        let fetcher = SiteFetcher::from_config(&config)?;
        let network = fetcher.is_network();
        let store: Box<dyn SnapshotStore> = match config.resolved_storage_dir() {
            Some(dir) => Box::new(FileStore::new(dir)),
            None => {
                tracing::warn!("No cache directory available; navigation snapshots are disabled");
                Box::new(MemoryStore::disabled())
            }
        };
        Self::open(config, Arc::new(fetcher), store.as_ref(), network).await
    }
}

impl<F: PageFetcher> SiteContext<F> {
    /// Open a site.
    ///
    /// `network` enables incremental page loading and deep indexing. A
    /// missing entry page or navigation listing is not an error: the site
    /// opens without navigation and search.
    pub async fn open(
        config: Config,
        fetcher: Arc<F>,
        store: &dyn SnapshotStore,
        network: bool,
    ) -> Result<Self> {
        let settings = NavigationSettings::from_config(&config)?;
        let (entry_path, entry_fragment) = match config.entry_page.split_once('#') {
            Some((path, fragment)) => (path, Some(fragment)),
            None => (config.entry_page.as_str(), None),
        };

        let entry_text = match fetcher.fetch(entry_path).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Unable to load entry page: {}", e);
                None
            }
        };

        let (navigation, product_title) = {
            let document = entry_text.as_deref().map(parse_document);
            let navigation = load_navigation(document.as_ref(), store, &settings);
            let product_title = settings.resolve_product_title(
                navigation.as_ref().map(|(tree, _)| tree),
                None,
                document.as_ref(),
            );
            (navigation, product_title)
        };

        let origin = navigation.as_ref().map(|(_, origin)| *origin);
        let tree = navigation.map(|(tree, _)| tree);
        match origin {
            Some(origin) => tracing::info!(
                "Opened {} with {:?} navigation ({} sections)",
                config.site_root,
                origin,
                tree.as_ref().map_or(0, |t| t.sections.len())
            ),
            None => tracing::warn!(
                "No navigation data for {}; navigation and search are unavailable",
                config.site_root
            ),
        }

        let session = SearchSession::new(tree.as_ref(), network, config.search.clone());

        let mode = if network {
            LoadMode::Incremental
        } else {
            LoadMode::FullNavigation
        };
        let navigation = tree.map(|tree| {
            let mut controller = NavigationController::new(tree, Arc::clone(&fetcher), mode);
            controller.set_current_page(entry_path, entry_fragment);
            if let Some(text) = &entry_text {
                controller.adopt_content(text);
            }
            Mutex::new(controller)
        });

        Ok(Self {
            config,
            fetcher,
            network,
            product_title,
            origin,
            session,
            navigation,
            indexer: StdMutex::new(None),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    /// Whether incremental loading and deep indexing are enabled.
    pub fn is_network(&self) -> bool {
        self.network
    }

    /// Label for the home link.
    pub fn product_title(&self) -> &str {
        &self.product_title
    }

    pub fn origin(&self) -> Option<NavigationOrigin> {
        self.origin
    }

    pub fn session(&self) -> &Arc<SearchSession> {
        &self.session
    }

    pub fn navigation(&self) -> Option<&Mutex<NavigationController<F>>> {
        self.navigation.as_ref()
    }

    /// Start the background indexer unless it already runs.
    pub fn start_indexing(&self) {
        self.start_indexing_with(None);
    }

    /// Start the background indexer with a custom section classifier.
    pub fn start_indexing_with(&self, classifier: Option<Arc<dyn SectionClassifier>>) {
        let mut slot = self.indexer.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return;
        }
        let mut indexer = BackgroundIndexer::new(
            Arc::clone(&self.session),
            Arc::clone(&self.fetcher),
            self.config.indexer.clone(),
        );
        if let Some(classifier) = classifier {
            indexer = indexer.with_classifier(classifier);
        }
        *slot = Some(indexer.spawn());
    }

    /// Wait for the background indexer to finish its walk.
    pub async fn wait_for_indexing(&self) {
        let handle = self
            .indexer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.join().await;
        }
    }

    /// Stop background work and wait for it to end.
    pub async fn shutdown(&self) {
        self.session.cancel_pending();
        let handle = self
            .indexer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.cancel();
            handle.join().await;
        }
    }
}
