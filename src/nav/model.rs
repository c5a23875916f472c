//! In-memory navigation tree.

use crate::href::normalize_href;
use serde::{Deserialize, Serialize};

/// Sections and items of the reference site's topic listing, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationTree {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub product_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub items: Vec<NavItem>,
}

/// A link in the navigation tree. `href` is stored exactly as written in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub title: String,
    #[serde(default)]
    pub href: String,
}

/// Position of an item inside a [`NavigationTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId {
    pub section: usize,
    pub item: usize,
}

impl NavigationTree {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn item(&self, id: ItemId) -> Option<&NavItem> {
        self.sections.get(id.section)?.items.get(id.item)
    }

    /// Iterate all items with their positions, sections first to last.
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &Section, &NavItem)> {
        self.sections
            .iter()
            .enumerate()
            .flat_map(|(section_idx, section)| {
                section
                    .items
                    .iter()
                    .enumerate()
                    .map(move |(item_idx, item)| {
                        (
                            ItemId {
                                section: section_idx,
                                item: item_idx,
                            },
                            section,
                            item,
                        )
                    })
            })
    }

    /// Find the first item whose href names the same document as `href`.
    ///
    /// Fragments are ignored on both sides.
    pub fn find_item_by_href(&self, href: &str) -> Option<ItemId> {
        let target = normalize_href(href, None).base;
        if target.is_empty() {
            return None;
        }
        self.items()
            .find(|(_, _, item)| {
                !item.href.is_empty() && normalize_href(&item.href, None).base == target
            })
            .map(|(id, _, _)| id)
    }

    /// Distinct document references in first-seen order.
    pub fn distinct_pages(&self) -> Vec<String> {
        let mut seen = ahash::AHashSet::new();
        self.items()
            .filter_map(|(_, _, item)| {
                let base = normalize_href(&item.href, None).base;
                (!base.is_empty() && seen.insert(base.clone())).then_some(base)
            })
            .collect()
    }
}
