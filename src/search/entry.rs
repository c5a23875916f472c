//! Searchable entries and their construction.

use crate::href::normalize_href;
use serde::Serialize;
use std::fmt;

/// What a search entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A navigation item (class, object, topic page).
    Object,
    Method,
    Property,
}

impl EntryKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Method => "method",
            Self::Property => "property",
        }
    }

    /// Capitalized label used in result listings.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Object => "Object",
            Self::Method => "Method",
            Self::Property => "Property",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional metadata attached when building an entry.
#[derive(Debug, Clone, Default)]
pub struct EntryMeta<'a> {
    /// Navigation section, for object entries
    pub section: Option<&'a str>,
    /// Page title, for method and property entries
    pub context: Option<&'a str>,
    /// Extra lowercase-matched words
    pub keywords: Option<&'a str>,
}

impl<'a> EntryMeta<'a> {
    pub const fn section(section: &'a str) -> Self {
        Self {
            section: Some(section),
            context: None,
            keywords: None,
        }
    }

    pub const fn context(context: &'a str) -> Self {
        Self {
            section: None,
            context: Some(context),
            keywords: None,
        }
    }
}

/// Deduplication key: `(kind, lowercase title, href)`.
pub type EntryKey = (EntryKind, String, String);

/// A single searchable object, method or property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchEntry {
    pub kind: EntryKind,
    pub title: String,
    /// Normalized href with fragment reattached
    pub href: String,
    pub section: String,
    pub context: String,
    #[serde(skip)]
    pub title_lower: String,
    #[serde(skip)]
    pub search_blob: String,
}

impl SearchEntry {
    pub fn key(&self) -> EntryKey {
        (self.kind, self.title_lower.clone(), self.href.clone())
    }

    /// Kind label followed by context (or section), joined by ` · `.
    pub fn meta_line(&self) -> String {
        let detail = if !self.context.is_empty() {
            Some(self.context.as_str())
        } else if !self.section.is_empty() {
            Some(self.section.as_str())
        } else {
            None
        };
        match detail {
            Some(detail) => format!("{} · {}", self.kind.label(), detail),
            None => self.kind.label().to_string(),
        }
    }
}

/// Build an entry, or `None` when `title` or `href` is empty.
///
/// The href is normalized like navigation links. A fragment-only href has no
/// document to attach to and is stored as written.
pub fn build_search_entry(
    kind: EntryKind,
    title: &str,
    href: &str,
    meta: EntryMeta<'_>,
) -> Option<SearchEntry> {
    if title.is_empty() || href.is_empty() {
        return None;
    }

    let normalized = normalize_href(href, None);
    let href = if normalized.is_empty() {
        href.to_string()
    } else {
        normalized.to_href()
    };

    let section = meta.section.unwrap_or_default().to_string();
    let context = meta.context.unwrap_or_default().to_string();
    let title_lower = title.to_lowercase();

    let mut blob = vec![title_lower.clone()];
    blob.extend(
        [meta.section, meta.context, meta.keywords]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .map(str::to_lowercase),
    );

    Some(SearchEntry {
        kind,
        title: title.to_string(),
        href,
        section,
        context,
        title_lower,
        search_blob: blob.join(" ").trim().to_string(),
    })
}
