//! Runtime configuration loaded from an optional TOML file.
//!
//! Every field has a default, so an empty (or missing) file yields a working
//! configuration pointed at `./index.html`.

use crate::error::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming the configuration file used by the binary.
pub const CONFIG_ENV_VAR: &str = "DOCNAV_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Base URL (`https://…/`) or local directory holding the reference site.
    pub site_root: String,
    /// Page opened at startup and used as the home link target.
    pub entry_page: String,
    /// Directory for the navigation snapshot. `None` uses the user cache dir.
    pub storage_dir: Option<PathBuf>,
    /// Key the navigation snapshot is stored under.
    pub storage_key: String,
    /// Case-insensitive pattern a heading must match to name the product.
    pub product_pattern: String,
    /// Product title used when nothing in the document matches.
    pub default_product_title: String,
    pub search: SearchConfig,
    pub indexer: IndexerConfig,
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_root: ".".to_string(),
            entry_page: "index.html".to_string(),
            storage_dir: None,
            storage_key: "extendscriptApiNavigationData".to_string(),
            product_pattern: "extendscript api".to_string(),
            default_product_title: "ExtendScript API".to_string(),
            search: SearchConfig::default(),
            indexer: IndexerConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

/// Query evaluation tunables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    /// Queries shorter than this clear the result list.
    pub min_query_len: usize,
    /// Maximum number of results returned.
    pub result_limit: usize,
    /// Added to the rank of every entry found by the background indexer.
    pub extra_weight: u32,
    /// Idle window before a typed query is evaluated.
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            result_limit: 50,
            extra_weight: 10,
            debounce_ms: 120,
        }
    }
}

impl SearchConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Background indexer pacing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IndexerConfig {
    /// Delay before the first page is fetched.
    pub initial_delay_ms: u64,
    /// Delay between subsequent pages.
    pub tick_delay_ms: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 120,
            tick_delay_ms: 40,
        }
    }
}

impl IndexerConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn tick_delay(&self) -> Duration {
        Duration::from_millis(self.tick_delay_ms)
    }
}

/// HTTP client settings for network-served sites.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("docnav-mcp/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse docnav configuration")
    }

    /// Load configuration from `path`, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Load configuration from the file named by [`CONFIG_ENV_VAR`], if set.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Some(Path::new(&path))),
            None => Ok(Self::default()),
        }
    }

    /// Whether the site is served over a network-capable protocol.
    ///
    /// Incremental navigation and deep indexing are only available in that case.
    pub fn is_network_site(&self) -> bool {
        let root = self.site_root.to_ascii_lowercase();
        root.starts_with("http://") || root.starts_with("https://")
    }

    /// Directory holding the navigation snapshot.
    pub fn resolved_storage_dir(&self) -> Option<PathBuf> {
        self.storage_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("docnav-mcp")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        check!(config == Config::default());
        check!(config.search.min_query_len == 2);
        check!(config.search.result_limit == 50);
        check!(config.search.extra_weight == 10);
        check!(config.indexer.initial_delay() == Duration::from_millis(120));
        check!(config.indexer.tick_delay() == Duration::from_millis(40));
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = Config::from_toml(
            r#"
            site_root = "https://docs.example.com/api/"

            [search]
            result_limit = 10
            "#,
        )
        .unwrap();
        check!(config.site_root == "https://docs.example.com/api/");
        check!(config.search.result_limit == 10);
        check!(config.search.debounce_ms == 120);
        check!(config.entry_page == "index.html");
    }

    #[test]
    fn network_detection_follows_scheme() {
        let mut config = Config::default();
        check!(!config.is_network_site());
        config.site_root = "HTTPS://docs.example.com".to_string();
        check!(config.is_network_site());
        config.site_root = "file:///srv/docs".to_string();
        check!(!config.is_network_site());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        check!(Config::from_toml("search = 3").is_err());
    }
}
