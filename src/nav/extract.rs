//! Extraction of the navigation tree from a reference page.
//!
//! The topic listing is a `ul.map` whose `li.topichead` elements are sections
//! and whose `li.topicref` elements are links. When a page carries no listing,
//! the last persisted snapshot is reused.

use super::model::{NavItem, NavigationTree, Section};
use super::store::SnapshotStore;
use crate::config::Config;
use crate::error::{Result, StorageError};
use anyhow::Context;
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, warn};

static MAP_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("ul.map").expect("BUG: hardcoded selector 'ul.map' is statically valid")
});

static TOPICHEAD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("li.topichead")
        .expect("BUG: hardcoded selector 'li.topichead' is statically valid")
});

static MAP_HEADER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("ul.map > li.topichead")
        .expect("BUG: hardcoded selector 'ul.map > li.topichead' is statically valid")
});

static UL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("ul").expect("BUG: hardcoded selector 'ul' is statically valid")
});

static TOPICREF_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("li.topicref")
        .expect("BUG: hardcoded selector 'li.topicref' is statically valid")
});

static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a").expect("BUG: hardcoded selector 'a' is statically valid")
});

static DC_TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="DC.title"]"#)
        .expect("BUG: hardcoded selector 'meta[name=\"DC.title\"]' is statically valid")
});

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("title").expect("BUG: hardcoded selector 'title' is statically valid")
});

/// Where a navigation tree came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOrigin {
    /// Parsed from the listing embedded in the current page.
    Live,
    /// Restored from the durable store.
    Snapshot,
}

/// Settings shared by extraction, persistence and product-title derivation.
#[derive(Debug, Clone)]
pub struct NavigationSettings {
    pub storage_key: String,
    pub default_product_title: String,
    product_pattern: Regex,
}

impl NavigationSettings {
    /// Build settings, matching `product_pattern` literally and case-insensitively.
    pub fn new(
        storage_key: impl Into<String>,
        product_pattern: &str,
        default_product_title: impl Into<String>,
    ) -> Result<Self> {
        let product_pattern = RegexBuilder::new(&regex::escape(product_pattern))
            .case_insensitive(true)
            .build()
            .with_context(|| format!("Invalid product pattern '{}'", product_pattern))?;
        Ok(Self {
            storage_key: storage_key.into(),
            default_product_title: default_product_title.into(),
            product_pattern,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.storage_key.clone(),
            &config.product_pattern,
            config.default_product_title.clone(),
        )
    }

    pub fn is_product_title(&self, text: &str) -> bool {
        !text.is_empty() && self.product_pattern.is_match(text)
    }

    /// Product title for display, trying the tree, then the stored snapshot,
    /// then the document, then the default.
    pub fn resolve_product_title(
        &self,
        tree: Option<&NavigationTree>,
        stored: Option<&NavigationTree>,
        document: Option<&Html>,
    ) -> String {
        [tree, stored]
            .into_iter()
            .flatten()
            .map(|t| t.product_title.trim())
            .find(|title| !title.is_empty())
            .map(str::to_string)
            .or_else(|| document.and_then(|doc| derive_product_title(doc, self)))
            .unwrap_or_else(|| self.default_product_title.clone())
    }
}

/// Title text of a `li.topichead`.
///
/// Prefers the first non-empty direct text node, then the first child
/// element's text, then the whole element's text.
pub fn extract_section_title(topic_head: ElementRef<'_>) -> String {
    for child in topic_head.children() {
        if let Some(text) = child.value().as_text() {
            let value = text.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }
    if let Some(first) = topic_head.children().find_map(ElementRef::wrap) {
        return element_text(first);
    }
    element_text(topic_head)
}

/// Derive a product title from document metadata.
///
/// Each candidate (map header, `DC.title` meta, `<title>`) only counts when it
/// matches the product pattern.
pub fn derive_product_title(document: &Html, settings: &NavigationSettings) -> Option<String> {
    if let Some(header) = document.select(&MAP_HEADER_SELECTOR).next() {
        let title = extract_section_title(header);
        if settings.is_product_title(&title) {
            return Some(title);
        }
    }

    if let Some(meta) = document.select(&DC_TITLE_SELECTOR).next()
        && let Some(content) = meta.value().attr("content")
        && settings.is_product_title(content)
    {
        return Some(content.trim().to_string());
    }

    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(element_text)
        .filter(|title| settings.is_product_title(title))
}

/// Parse the live topic listing. Returns `None` if the page has no `ul.map`.
pub fn extract_navigation(document: &Html, settings: &NavigationSettings) -> Option<NavigationTree> {
    let map = document.select(&MAP_SELECTOR).next()?;
    let mut tree = NavigationTree::default();

    for topic_head in map.select(&TOPICHEAD_SELECTOR) {
        let title = extract_section_title(topic_head);
        if tree.product_title.is_empty() && settings.is_product_title(&title) {
            tree.product_title = title.clone();
        }

        let mut section = Section {
            title,
            items: Vec::new(),
        };
        if let Some(items_list) = topic_head.select(&UL_SELECTOR).next() {
            for item in items_list.select(&TOPICREF_SELECTOR) {
                if let Some(link) = item.select(&LINK_SELECTOR).next() {
                    section.items.push(NavItem {
                        title: element_text(link),
                        href: link.value().attr("href").unwrap_or_default().to_string(),
                    });
                }
            }
        }
        tree.sections.push(section);
    }

    if tree.product_title.is_empty() {
        tree.product_title = derive_product_title(document, settings)
            .unwrap_or_else(|| settings.default_product_title.clone());
    }

    debug!(
        "Extracted navigation: {} sections, {} items",
        tree.sections.len(),
        tree.items().count()
    );
    Some(tree)
}

/// Produce the navigation tree for the current page.
///
/// A live listing wins and is persisted; otherwise the last snapshot is loaded.
/// Storage failures are logged and never returned.
pub fn load_navigation(
    document: Option<&Html>,
    store: &dyn SnapshotStore,
    settings: &NavigationSettings,
) -> Option<(NavigationTree, NavigationOrigin)> {
    if let Some(tree) = document.and_then(|doc| extract_navigation(doc, settings)) {
        persist_navigation(store, settings, &tree);
        return Some((tree, NavigationOrigin::Live));
    }

    let mut tree = load_snapshot(store, settings)?;
    if tree.product_title.trim().is_empty() {
        tree.product_title = document
            .and_then(|doc| derive_product_title(doc, settings))
            .unwrap_or_else(|| settings.default_product_title.clone());
    }
    Some((tree, NavigationOrigin::Snapshot))
}

/// Write a non-empty tree to the store, logging failures.
pub fn persist_navigation(
    store: &dyn SnapshotStore,
    settings: &NavigationSettings,
    tree: &NavigationTree,
) {
    if tree.is_empty() {
        return;
    }
    let saved = encode_snapshot(&settings.storage_key, tree)
        .and_then(|payload| store.save(&settings.storage_key, &payload));
    if let Err(e) = saved {
        warn!("Unable to persist navigation data: {}", e);
    }
}

/// Read the last snapshot. Missing, corrupt or empty snapshots yield `None`.
pub fn load_snapshot(
    store: &dyn SnapshotStore,
    settings: &NavigationSettings,
) -> Option<NavigationTree> {
    let loaded = store.load(&settings.storage_key).and_then(|payload| {
        payload
            .map(|payload| decode_snapshot(&settings.storage_key, &payload))
            .transpose()
    });
    match loaded {
        Ok(tree) => tree.filter(|tree| !tree.is_empty()),
        Err(e) => {
            warn!("Unable to load navigation data from storage: {}", e);
            None
        }
    }
}

fn encode_snapshot(key: &str, tree: &NavigationTree) -> Result<String, StorageError> {
    serde_json::to_string(tree).map_err(|source| StorageError::Serialization {
        key: key.to_string(),
        source,
    })
}

fn decode_snapshot(key: &str, payload: &str) -> Result<NavigationTree, StorageError> {
    serde_json::from_str(payload).map_err(|source| StorageError::Serialization {
        key: key.to_string(),
        source,
    })
}

pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
