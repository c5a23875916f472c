//! Navigation and progressive search for static API reference sites.
//!
//! A site's topic listing becomes a collapsible [`nav::NavigationTree`];
//! its pages are indexed in the background for methods and properties, and
//! both are served to MCP clients by [`server::DocNavServer`].

pub mod config;
pub mod context;
pub mod error;
pub mod fetch;
pub mod href;
pub mod nav;
pub mod search;
pub mod server;
pub mod tools;
pub mod tracing;
pub mod worker;

pub use config::Config;
pub use context::SiteContext;
pub use error::{FetchError, NavigationError, Result, StorageError};
pub use fetch::{FileFetcher, HttpFetcher, PageFetcher, SiteFetcher};
pub use nav::{NavigationController, NavigationTree};
pub use search::{SearchEntry, SearchSession};
pub use worker::{BackgroundIndexer, IndexerHandle, spawn_background_indexer};
