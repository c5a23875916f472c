//! Method and property extraction from fetched reference pages.
//!
//! A page is a sequence of `div.section` blocks. A [`SectionClassifier`] decides
//! from each block's heading whether it lists methods, properties, or both;
//! the extractors below then pull entry names out of anchors and table rows.

use super::entry::{EntryKind, EntryMeta, SearchEntry, build_search_entry};
use crate::href::resolve_anchor;
use crate::nav::extract::element_text;
use ahash::AHashSet;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static PAGE_TITLE_SELECTORS: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    ["h1.title.topictitle1", "h1.title", "h1"].map(|sel| {
        Selector::parse(sel).expect("BUG: hardcoded page title selector is statically valid")
    })
});

static SECTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("div.section").expect("BUG: hardcoded selector 'div.section' is statically valid")
});

static HEADING_SELECTORS: LazyLock<[Selector; 2]> = LazyLock::new(|| {
    [".title.sectiontitle", "h2"].map(|sel| {
        Selector::parse(sel).expect("BUG: hardcoded heading selector is statically valid")
    })
});

static XREF_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a.xref").expect("BUG: hardcoded selector 'a.xref' is statically valid")
});

static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("table tbody tr")
        .expect("BUG: hardcoded selector 'table tbody tr' is statically valid")
});

static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("td").expect("BUG: hardcoded selector 'td' is statically valid")
});

static CLIP_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".clip_button").expect("BUG: hardcoded selector '.clip_button' is statically valid")
});

/// Kind of entries a section block lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Methods,
    Properties,
}

/// The parts of a section block a classifier may inspect.
#[derive(Debug, Clone, Copy)]
pub struct SectionHeading<'a> {
    /// Trimmed heading text, never empty
    pub text: &'a str,
    /// `id` attribute of the section block
    pub id: Option<&'a str>,
}

/// Decides what a section block contains.
pub trait SectionClassifier: Send + Sync {
    fn classify(&self, heading: &SectionHeading<'_>) -> Vec<ContentKind>;
}

impl<F> SectionClassifier for F
where
    F: Fn(&SectionHeading<'_>) -> Vec<ContentKind> + Send + Sync,
{
    fn classify(&self, heading: &SectionHeading<'_>) -> Vec<ContentKind> {
        self(heading)
    }
}

/// Classifies by case-insensitive `method` / `property` substrings in the heading.
///
/// The match is literal: "Properties" does not contain `property`. Sites with
/// plural headings pass their own classifier to the indexer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingClassifier;

impl SectionClassifier for HeadingClassifier {
    fn classify(&self, heading: &SectionHeading<'_>) -> Vec<ContentKind> {
        let text = heading.text.to_lowercase();
        let mut kinds = Vec::new();
        if text.contains("method") {
            kinds.push(ContentKind::Methods);
        }
        if text.contains("property") {
            kinds.push(ContentKind::Properties);
        }
        kinds
    }
}

/// Entries extracted from one page.
#[derive(Debug, Clone, Default)]
pub struct PageIndex {
    pub title: String,
    pub entries: Vec<SearchEntry>,
}

/// Collects entries, dropping repeats within the page.
struct PageEntries<'a> {
    page: &'a str,
    context: &'a str,
    keys: AHashSet<super::entry::EntryKey>,
    entries: Vec<SearchEntry>,
}

impl<'a> PageEntries<'a> {
    fn new(page: &'a str, context: &'a str) -> Self {
        Self {
            page,
            context,
            keys: AHashSet::new(),
            entries: Vec::new(),
        }
    }

    fn push(&mut self, kind: EntryKind, title: &str, href: &str) {
        let Some(entry) = build_search_entry(kind, title, href, EntryMeta::context(self.context))
        else {
            return;
        };
        if self.keys.insert(entry.key()) {
            self.entries.push(entry);
        }
    }

    /// One entry per `a.xref` anchor in the block.
    fn push_anchors(&mut self, kind: EntryKind, block: ElementRef<'_>) {
        for anchor in block.select(&XREF_SELECTOR) {
            let text = element_text(anchor);
            if text.is_empty() {
                continue;
            }
            let href = resolve_anchor(self.page, anchor.value().attr("href").unwrap_or_default());
            self.push(kind, &text, &href);
        }
    }

    /// One entry per table row, named by the first cell.
    fn push_method_rows(&mut self, block: ElementRef<'_>) {
        for row in block.select(&ROW_SELECTOR) {
            let Some(name_cell) = row.select(&CELL_SELECTOR).next() else {
                continue;
            };
            let anchor = name_cell.select(&XREF_SELECTOR).next();
            let text = anchor.map_or_else(|| element_text(name_cell), element_text);
            if text.is_empty() {
                continue;
            }
            let raw_href = anchor
                .and_then(|a| a.value().attr("href"))
                .unwrap_or_default();
            let href = resolve_anchor(self.page, raw_href);
            self.push(EntryKind::Method, &text, &href);
        }
    }

    fn push_properties(&mut self, block: ElementRef<'_>, id: Option<&str>) {
        let names = collect_property_names(block);
        if names.is_empty() {
            self.push_anchors(EntryKind::Property, block);
            return;
        }
        let href = match id {
            Some(id) => format!("{}#{}", self.page, id),
            None => self.page.to_string(),
        };
        for name in names {
            self.push(EntryKind::Property, &name, &href);
        }
    }
}

/// Extract the page title and every method/property entry of a page.
///
/// `page` is the normalized reference the document was fetched from; in-page
/// anchors are resolved against it.
pub fn extract_page_index(
    document: &Html,
    page: &str,
    classifier: &dyn SectionClassifier,
) -> PageIndex {
    let title = page_title(document).unwrap_or_else(|| page.to_string());
    let mut collected = PageEntries::new(page, &title);

    for block in document.select(&SECTION_SELECTOR) {
        let Some(header) = HEADING_SELECTORS
            .iter()
            .find_map(|sel| block.select(sel).next())
        else {
            continue;
        };
        let heading_text = element_text(header);
        if heading_text.is_empty() {
            continue;
        }
        let id = block.value().id();
        let heading = SectionHeading {
            text: &heading_text,
            id,
        };

        for kind in classifier.classify(&heading) {
            match kind {
                ContentKind::Methods => {
                    collected.push_anchors(EntryKind::Method, block);
                    collected.push_method_rows(block);
                }
                ContentKind::Properties => collected.push_properties(block, id),
            }
        }
    }

    let entries = collected.entries;
    PageIndex { title, entries }
}

/// Page heading text, trying the most specific heading first.
pub fn page_title(document: &Html) -> Option<String> {
    PAGE_TITLE_SELECTORS
        .iter()
        .find_map(|sel| document.select(sel).next())
        .map(element_text)
        .filter(|title| !title.is_empty())
}

/// Property names of a block, in first-seen order without repeats.
///
/// Each row's first cell names a property (its `.clip_button` label when
/// present). Blocks without rows fall back to every `.clip_button` label.
pub fn collect_property_names(block: ElementRef<'_>) -> Vec<String> {
    let row_names: Vec<String> = block
        .select(&ROW_SELECTOR)
        .filter_map(|row| row.select(&CELL_SELECTOR).next())
        .map(|name_cell| {
            name_cell
                .select(&CLIP_SELECTOR)
                .next()
                .map_or_else(|| element_text(name_cell), element_text)
        })
        .collect();

    let candidates = if row_names.iter().any(|name| !name.is_empty()) {
        row_names
    } else {
        block.select(&CLIP_SELECTOR).map(element_text).collect()
    };
    dedupe_names(candidates)
}

fn dedupe_names(candidates: Vec<String>) -> Vec<String> {
    let mut seen = AHashSet::new();
    candidates
        .into_iter()
        .filter(|name| !name.is_empty() && seen.insert(name.clone()))
        .collect()
}
