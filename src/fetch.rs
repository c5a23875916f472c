//! Page fetch and parse adapter.
//!
//! Shared by incremental navigation and the background indexer. Non-success
//! responses are reported as [`FetchError::Status`] so callers never parse an
//! error page as content.

use crate::config::Config;
use crate::error::{FetchError, Result};
use anyhow::Context;
use scraper::Html;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Retrieves the text of a page reference relative to the site root.
pub trait PageFetcher: Send + Sync + 'static {
    fn fetch(&self, href: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Parse page text into a traversable document.
pub fn parse_document(text: &str) -> Html {
    Html::parse_document(text)
}

/// Fetches pages over HTTP(S) relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        // A base without a trailing slash would drop its last segment on join.
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let base = Url::parse(&base).with_context(|| format!("Invalid site root '{}'", base))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, base })
    }

    /// Absolute URL for a page reference. Fragments are never sent.
    pub fn resolve(&self, href: &str) -> Result<Url, FetchError> {
        let mut url = self
            .base
            .join(href)
            .map_err(|_| FetchError::InvalidReference {
                href: href.to_string(),
            })?;
        url.set_fragment(None);
        Ok(url)
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, href: &str) -> Result<String, FetchError> {
        let url = self.resolve(href)?;
        tracing::debug!("Fetching {}", url);

        let transport = |e: reqwest::Error| FetchError::Transport {
            href: href.to_string(),
            message: e.to_string(),
        };
        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                href: href.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(transport)
    }
}

/// Reads pages from a local directory (sites opened without a web server).
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path for a page reference, refusing anything that leaves the root.
    pub fn resolve(&self, href: &str) -> Result<PathBuf, FetchError> {
        let invalid = || FetchError::InvalidReference {
            href: href.to_string(),
        };
        let base = href.split('#').next().unwrap_or_default();
        if base.is_empty() || base.contains("://") {
            return Err(invalid());
        }
        let relative = Path::new(base);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(invalid());
        }
        Ok(self.root.join(relative))
    }
}

impl PageFetcher for FileFetcher {
    async fn fetch(&self, href: &str) -> Result<String, FetchError> {
        let path = self.resolve(href)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(FetchError::Status {
                href: href.to_string(),
                status: 404,
            }),
            Err(e) => Err(FetchError::Transport {
                href: href.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

/// The fetcher chosen for a configured site.
#[derive(Debug, Clone)]
pub enum SiteFetcher {
    Http(HttpFetcher),
    File(FileFetcher),
}

impl SiteFetcher {
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.is_network_site() {
            Ok(Self::Http(HttpFetcher::new(
                &config.site_root,
                Duration::from_secs(config.http.timeout_secs),
                &config.http.user_agent,
            )?))
        } else {
            let root = config
                .site_root
                .strip_prefix("file://")
                .unwrap_or(&config.site_root);
            Ok(Self::File(FileFetcher::new(root)))
        }
    }

    /// Whether incremental loading and deep indexing are available.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

impl PageFetcher for SiteFetcher {
    async fn fetch(&self, href: &str) -> Result<String, FetchError> {
        match self {
            Self::Http(fetcher) => fetcher.fetch(href).await,
            Self::File(fetcher) => fetcher.fetch(href).await,
        }
    }
}
