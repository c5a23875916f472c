//! Navigation state: section expansion, selection, page loading and history.

use super::history::SessionHistory;
use super::model::{ItemId, NavItem, NavigationTree};
use crate::error::NavigationError;
use crate::fetch::{PageFetcher, parse_document};
use crate::href::{PageRef, normalize_href, page_from_location};
use rapidfuzz::distance::jaro_winkler;
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, LazyLock};

static EMBEDDED_MAP_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("ul.map").expect("BUG: hardcoded selector 'ul.map' is statically valid")
});

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("body").expect("BUG: hardcoded selector 'body' is statically valid")
});

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionState {
    #[default]
    Collapsed,
    Expanded,
}

impl SectionState {
    pub fn toggled(self) -> Self {
        match self {
            Self::Collapsed => Self::Expanded,
            Self::Expanded => Self::Collapsed,
        }
    }

    pub fn is_expanded(self) -> bool {
        self == Self::Expanded
    }
}

/// How page transitions are carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Fetch the page and splice its body into the content pane.
    Incremental,
    /// Hand the reference back to the host for a full navigation.
    FullNavigation,
}

/// The page currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentPane {
    /// Loaded reference, fragment included
    pub page: String,
    /// Body markup with embedded navigation listings removed
    pub html: String,
    /// Requested in-page anchor
    pub anchor: Option<String>,
    /// Whether an element with that `id` or `name` exists in `html`
    pub anchor_found: bool,
}

/// Outcome of a page transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTransition {
    /// Content was fetched and spliced into the pane.
    Loaded {
        href: String,
        item: Option<ItemId>,
        anchor: Option<String>,
        anchor_found: bool,
    },
    /// The host must navigate to `href` itself.
    FullNavigation { href: String, item: Option<ItemId> },
}

/// Owns the navigation tree and everything the user can change about it.
pub struct NavigationController<F> {
    tree: NavigationTree,
    sections: Vec<SectionState>,
    selected: Option<ItemId>,
    current_page: Option<String>,
    content: Option<ContentPane>,
    history: SessionHistory,
    fetcher: Arc<F>,
    mode: LoadMode,
}

impl<F> std::fmt::Debug for NavigationController<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationController")
            .field("sections", &self.sections.len())
            .field("selected", &self.selected)
            .field("current_page", &self.current_page)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl<F: PageFetcher> NavigationController<F> {
    /// Create a controller with every section collapsed.
    pub fn new(tree: NavigationTree, fetcher: Arc<F>, mode: LoadMode) -> Self {
        let sections = vec![SectionState::Collapsed; tree.sections.len()];
        Self {
            tree,
            sections,
            selected: None,
            current_page: None,
            content: None,
            history: SessionHistory::new(),
            fetcher,
            mode,
        }
    }

    pub fn tree(&self) -> &NavigationTree {
        &self.tree
    }

    pub fn product_title(&self) -> &str {
        &self.tree.product_title
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    pub fn section_state(&self, index: usize) -> Option<SectionState> {
        self.sections.get(index).copied()
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&NavItem> {
        self.selected.and_then(|id| self.tree.item(id))
    }

    pub fn current_page(&self) -> Option<&str> {
        self.current_page.as_deref()
    }

    pub fn content(&self) -> Option<&ContentPane> {
        self.content.as_ref()
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    /// Flip one section. Returns its new state, or `None` for an unknown index.
    pub fn toggle_section(&mut self, index: usize) -> Option<SectionState> {
        let state = self.sections.get_mut(index)?;
        *state = state.toggled();
        Some(*state)
    }

    /// Whether no section is collapsed.
    pub fn all_expanded(&self) -> bool {
        self.sections.iter().all(|state| state.is_expanded())
    }

    /// Collapse everything if all sections are expanded, otherwise expand all.
    ///
    /// Returns the state every section now has.
    pub fn toggle_all_sections(&mut self) -> SectionState {
        let target = if self.all_expanded() {
            SectionState::Collapsed
        } else {
            SectionState::Expanded
        };
        self.sections.fill(target);
        target
    }

    /// Label for the bulk toggle control.
    pub fn expand_all_label(&self) -> &'static str {
        if !self.sections.is_empty() && self.all_expanded() {
            "Collapse All"
        } else {
            "Expand All"
        }
    }

    /// Resolve `href` against the current page and find its navigation item.
    pub fn find_item_by_href(&self, href: &str) -> Option<ItemId> {
        let target = normalize_href(href, self.current_page.as_deref());
        self.tree.find_item_by_href(&target.base)
    }

    /// Select `item` (or clear the selection) and expand its section.
    pub fn select_item(&mut self, item: Option<ItemId>) {
        self.selected = item.filter(|id| self.tree.item(*id).is_some());
        if let Some(id) = self.selected
            && let Some(state) = self.sections.get_mut(id.section)
        {
            *state = SectionState::Expanded;
        }
    }

    /// Adopt the page named by a location path and fragment as the current page.
    ///
    /// The page becomes the first history entry.
    pub fn set_current_page(&mut self, path: &str, fragment: Option<&str>) -> PageRef {
        let page = page_from_location(path, fragment);
        let item = self.tree.find_item_by_href(&page.base);
        self.select_item(item);
        let href = page.to_href();
        self.history.replace(href.clone());
        self.current_page = Some(href);
        page
    }

    /// Show already-fetched `text` as the content of the current page.
    pub fn adopt_content(&mut self, text: &str) {
        let Some(page) = self.current_page.clone() else {
            return;
        };
        let anchor = normalize_href(&page, None).fragment;
        let (html, anchor_found) = splice_content(text, anchor.as_deref());
        self.content = Some(ContentPane {
            page,
            html,
            anchor,
            anchor_found,
        });
    }

    /// Navigate to `href`, recording a history entry.
    ///
    /// `item` overrides the navigation item resolved from `href`. On fetch
    /// failure the content pane keeps the previous page.
    pub async fn load_page(
        &mut self,
        href: &str,
        item: Option<ItemId>,
    ) -> Result<PageTransition, NavigationError> {
        let transition = self.transition(href, item).await?;
        if let Some(page) = &self.current_page {
            self.history.push(page.clone());
        }
        Ok(transition)
    }

    /// Replay the previous history entry.
    pub async fn go_back(&mut self) -> Result<PageTransition, NavigationError> {
        let href = self
            .history
            .back()
            .ok_or(NavigationError::NoHistory("previous"))?
            .to_string();
        let result = self.transition(&href, None).await;
        if result.is_err() {
            self.history.forward();
        }
        result
    }

    /// Replay the next history entry.
    pub async fn go_forward(&mut self) -> Result<PageTransition, NavigationError> {
        let href = self
            .history
            .forward()
            .ok_or(NavigationError::NoHistory("next"))?
            .to_string();
        let result = self.transition(&href, None).await;
        if result.is_err() {
            self.history.back();
        }
        result
    }

    async fn transition(
        &mut self,
        href: &str,
        item: Option<ItemId>,
    ) -> Result<PageTransition, NavigationError> {
        let target = normalize_href(href, self.current_page.as_deref());
        let item = item.or_else(|| self.tree.find_item_by_href(&target.base));
        self.select_item(item);
        let resolved = target.to_href();

        if self.mode == LoadMode::FullNavigation {
            tracing::debug!("Full navigation to {}", resolved);
            self.current_page = Some(resolved.clone());
            return Ok(PageTransition::FullNavigation {
                href: resolved,
                item,
            });
        }

        let text = self.fetcher.fetch(&target.base).await.map_err(|e| {
            tracing::error!("Error loading page {}: {}", target.base, e);
            NavigationError::from(e)
        })?;

        let (html, anchor_found) = splice_content(&text, target.fragment.as_deref());
        if let Some(anchor) = &target.fragment
            && !anchor_found
        {
            tracing::debug!("Anchor #{} not found in {}", anchor, target.base);
        }

        self.content = Some(ContentPane {
            page: resolved.clone(),
            html,
            anchor: target.fragment.clone(),
            anchor_found,
        });
        self.current_page = Some(resolved.clone());

        Ok(PageTransition::Loaded {
            href: resolved,
            item,
            anchor: target.fragment,
            anchor_found,
        })
    }

    /// Navigation items whose titles resemble `query`, best first.
    pub fn suggest_items(&self, query: &str, limit: usize) -> Vec<(f64, &NavItem)> {
        let query = query.to_lowercase();
        let mut scored: Vec<(f64, &NavItem)> = self
            .tree
            .items()
            .map(|(_, _, item)| {
                let score =
                    jaro_winkler::similarity(query.chars(), item.title.to_lowercase().chars());
                (score, item)
            })
            .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(limit);
        scored
    }
}

/// Strip embedded navigation listings and return the body markup, plus
/// whether an element with `id` or `name` equal to `anchor` remains.
pub fn splice_content(text: &str, anchor: Option<&str>) -> (String, bool) {
    let mut document = parse_document(text);
    remove_embedded_maps(&mut document);

    let body = document
        .select(&BODY_SELECTOR)
        .next()
        .unwrap_or_else(|| document.root_element());
    let anchor_found = anchor.is_some_and(|anchor| has_anchor(body, anchor));
    (body.inner_html(), anchor_found)
}

fn remove_embedded_maps(document: &mut Html) {
    let ids: Vec<_> = document
        .select(&EMBEDDED_MAP_SELECTOR)
        .map(|element| element.id())
        .collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn has_anchor(root: ElementRef<'_>, anchor: &str) -> bool {
    root.descendants().filter_map(ElementRef::wrap).any(|element| {
        let element = element.value();
        element.id() == Some(anchor) || element.attr("name") == Some(anchor)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::nav::Section;
    use assert2::check;
    use std::collections::HashMap;

    struct StaticFetcher {
        pages: HashMap<&'static str, &'static str>,
    }

    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, href: &str) -> Result<String, FetchError> {
            self.pages
                .get(href)
                .map(|page| page.to_string())
                .ok_or_else(|| FetchError::Status {
                    href: href.to_string(),
                    status: 404,
                })
        }
    }

    fn tree() -> NavigationTree {
        let item = |title: &str, href: &str| NavItem {
            title: title.to_string(),
            href: href.to_string(),
        };
        NavigationTree {
            sections: vec![
                Section {
                    title: "Core".to_string(),
                    items: vec![item("Array", "./Array.html"), item("File", "File.html")],
                },
                Section {
                    title: "ScriptUI".to_string(),
                    items: vec![item("Window", "Window.html")],
                },
            ],
            product_title: "ExtendScript API".to_string(),
        }
    }

    fn controller(mode: LoadMode) -> NavigationController<StaticFetcher> {
        let pages = HashMap::from([
            (
                "Window.html",
                r#"<html><body><ul class="map"><li>nav</li></ul><h1>Window</h1><a name="show"></a></body></html>"#,
            ),
            ("Array.html", r#"<html><body><h1 id="top">Array</h1></body></html>"#),
        ]);
        NavigationController::new(tree(), Arc::new(StaticFetcher { pages }), mode)
    }

    #[test]
    fn sections_start_collapsed_and_toggle() {
        let mut nav = controller(LoadMode::Incremental);
        check!(nav.section_state(0) == Some(SectionState::Collapsed));
        check!(nav.toggle_section(0) == Some(SectionState::Expanded));
        check!(nav.toggle_section(0) == Some(SectionState::Collapsed));
        check!(nav.toggle_section(9).is_none());
    }

    #[test]
    fn toggle_all_expands_when_any_collapsed() {
        let mut nav = controller(LoadMode::Incremental);
        nav.toggle_section(0);
        check!(nav.expand_all_label() == "Expand All");
        check!(nav.toggle_all_sections() == SectionState::Expanded);
        check!(nav.all_expanded());
        check!(nav.expand_all_label() == "Collapse All");
        check!(nav.toggle_all_sections() == SectionState::Collapsed);
        check!(nav.section_state(1) == Some(SectionState::Collapsed));
    }

    #[test]
    fn initial_page_selects_item_and_expands_section() {
        let mut nav = controller(LoadMode::Incremental);
        let page = nav.set_current_page("/docs/Window.html", Some("show"));
        check!(page.to_href() == "Window.html#show");
        check!(nav.selected() == Some(ItemId { section: 1, item: 0 }));
        check!(nav.section_state(1) == Some(SectionState::Expanded));
        check!(nav.history().current() == Some("Window.html#show"));
    }

    #[tokio::test]
    async fn load_page_splices_content_and_finds_anchor() {
        let mut nav = controller(LoadMode::Incremental);
        nav.set_current_page("", None);

        let transition = nav.load_page("Window.html#show", None).await.unwrap();
        check!(
            transition
                == PageTransition::Loaded {
                    href: "Window.html#show".to_string(),
                    item: Some(ItemId { section: 1, item: 0 }),
                    anchor: Some("show".to_string()),
                    anchor_found: true,
                }
        );
        let content = nav.content().unwrap();
        check!(!content.html.contains("class=\"map\""));
        check!(content.html.contains("<h1>Window</h1>"));
        check!(nav.history().len() == 2);
    }

    #[tokio::test]
    async fn fragment_only_href_stays_on_current_page() {
        let mut nav = controller(LoadMode::Incremental);
        nav.load_page("Array.html", None).await.unwrap();
        nav.load_page("#top", None).await.unwrap();
        check!(nav.current_page() == Some("Array.html#top"));
        check!(nav.content().unwrap().anchor_found);
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_content() {
        let mut nav = controller(LoadMode::Incremental);
        nav.load_page("Array.html", None).await.unwrap();
        let before = nav.content().cloned();

        let err = nav.load_page("File.html", None).await.unwrap_err();
        check!(matches!(err, NavigationError::Fetch(FetchError::Status { status: 404, .. })));
        check!(nav.content().cloned() == before);
        check!(nav.current_page() == Some("Array.html"));
        check!(nav.history().len() == 1);
    }

    #[tokio::test]
    async fn back_and_forward_replay_without_new_entries() {
        let mut nav = controller(LoadMode::Incremental);
        nav.load_page("Array.html", None).await.unwrap();
        nav.load_page("Window.html", None).await.unwrap();

        nav.go_back().await.unwrap();
        check!(nav.current_page() == Some("Array.html"));
        check!(nav.selected() == Some(ItemId { section: 0, item: 0 }));
        check!(nav.history().len() == 2);

        nav.go_forward().await.unwrap();
        check!(nav.current_page() == Some("Window.html"));
        check!(matches!(nav.go_forward().await, Err(NavigationError::NoHistory("next"))));
    }

    #[tokio::test]
    async fn full_navigation_mode_does_not_fetch() {
        let mut nav = controller(LoadMode::FullNavigation);
        let transition = nav.load_page("./File.html", None).await.unwrap();
        check!(
            transition
                == PageTransition::FullNavigation {
                    href: "File.html".to_string(),
                    item: Some(ItemId { section: 0, item: 1 }),
                }
        );
        check!(nav.content().is_none());
    }

    #[test]
    fn suggestions_rank_similar_titles() {
        let nav = controller(LoadMode::Incremental);
        let suggestions = nav.suggest_items("windw", 5);
        check!(suggestions.first().map(|(_, item)| item.title.as_str()) == Some("Window"));
        check!(nav.suggest_items("zzzzzz", 5).is_empty());
    }
}
