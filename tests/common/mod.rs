//! Shared test fixtures and utilities for integration tests.
//!
//! # Available Fixtures
//!
//! - `site`: an in-memory reference site with an entry page, three class
//!   pages and one dangling navigation link
//! - [`MockSite`]: a [`PageFetcher`] serving fixed pages and recording every
//!   request, so tests can assert fetch counts and order
//! - [`TempWorkspace`]: a temp directory for file-backed sites and snapshots
//!
//! Time-sensitive tests run with `#[tokio::test(start_paused = true)]`; the
//! indexer's delays then elapse instantly once every task is idle.

use docnav_mcp::error::FetchError;
use docnav_mcp::fetch::PageFetcher;
use docnav_mcp::nav::MemoryStore;
use docnav_mcp::{Config, SiteContext};
use rstest::fixture;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Entry page carrying the topic listing.
///
/// `Missing.html` has no page behind it; `Window.html` is linked twice.
pub const INDEX_PAGE: &str = r#"<html><head><title>ExtendScript API</title></head><body>
<ul class="map">
  <li class="topichead">JavaScript Classes
    <ul>
      <li class="topicref"><a href="./Array.html">Array</a></li>
      <li class="topicref"><a href="File.html">File</a></li>
      <li class="topicref"><a href="Missing.html">Missing</a></li>
    </ul>
  </li>
  <li class="topichead">ScriptUI Classes
    <ul>
      <li class="topicref"><a href="Window.html">Window</a></li>
      <li class="topicref"><a href="Window.html#show">Window show</a></li>
    </ul>
  </li>
</ul>
<h1>Welcome</h1>
</body></html>"#;

/// Render a class page with method links and property rows.
pub fn class_page(name: &str, methods: &[&str], properties: &[&str]) -> String {
    let method_links: String = methods
        .iter()
        .map(|m| format!(r##"<a class="xref" href="#{m}">{m}()</a> "##))
        .collect();
    let property_rows: String = properties
        .iter()
        .map(|p| format!(r#"<tr><td><span class="clip_button">{p}</span></td><td>Object</td></tr>"#))
        .collect();
    format!(
        r#"<html><body>
<ul class="map"><li class="topichead">Embedded</li></ul>
<h1 class="title topictitle1">{name}</h1>
<div class="section" id="methods"><h2 class="title sectiontitle">Methods</h2><p>{method_links}</p></div>
<div class="section" id="properties"><h2 class="title sectiontitle">Property Summary</h2>
<table><tbody>{property_rows}</tbody></table></div>
{anchors}
</body></html>"#,
        anchors = methods
            .iter()
            .map(|m| format!(r#"<a name="{m}"></a>"#))
            .collect::<String>()
    )
}

/// In-memory site recording every fetch.
#[allow(dead_code)] // Methods used across different integration test crates
#[derive(Debug, Default)]
pub struct MockSite {
    pages: HashMap<String, String>,
    requests: Mutex<Vec<String>>,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl MockSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, href: &str, body: impl Into<String>) -> Self {
        self.pages.insert(href.to_string(), body.into());
        self
    }

    /// Every reference fetched so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// How many times `href` was fetched.
    pub fn fetch_count(&self, href: &str) -> usize {
        self.requests().iter().filter(|r| r.as_str() == href).count()
    }
}

impl PageFetcher for MockSite {
    async fn fetch(&self, href: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(href.to_string());
        // Yield like a real transport would.
        tokio::task::yield_now().await;
        self.pages
            .get(href)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                href: href.to_string(),
                status: 404,
            })
    }
}

/// The reference site described by [`INDEX_PAGE`].
#[fixture]
pub fn site() -> MockSite {
    MockSite::new()
        .with_page("index.html", INDEX_PAGE)
        .with_page("Array.html", class_page("Array", &["push", "pop"], &["length"]))
        .with_page("File.html", class_page("File", &["open", "close"], &["length", "name"]))
        .with_page("Window.html", class_page("Window", &["show", "close"], &["bounds"]))
}

/// Open `site` with default configuration and an in-memory snapshot store.
#[allow(dead_code)] // Used across different integration test crates
pub async fn open_site(site: MockSite, network: bool) -> (Arc<SiteContext<MockSite>>, Arc<MockSite>) {
    let site = Arc::new(site);
    let store = MemoryStore::default();
    let context = SiteContext::open(Config::default(), Arc::clone(&site), &store, network)
        .await
        .expect("site should open");
    (Arc::new(context), site)
}

/// A temporary directory for test isolation.
///
/// Removed automatically when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempWorkspace {
    temp: TempDir,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempWorkspace {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Creates a file, creating parent directories as needed.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.temp.path().join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }
}

impl Default for TempWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
