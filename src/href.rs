//! Page reference normalization shared by navigation and search.

use std::fmt;

/// Page loaded when a location has no file component.
pub const DEFAULT_PAGE: &str = "index.html";

/// A page reference split into its document part and optional fragment.
///
/// Examples:
/// - `./Window.html#close` → base=`Window.html`, fragment=`close`
/// - `Window.html` → base=`Window.html`, fragment=None
/// - `#close` (with current page `Window.html`) → base=`Window.html`, fragment=`close`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PageRef {
    /// Document reference without fragment or leading `./`
    pub base: String,
    /// Fragment after the first `#`, if non-empty
    pub fragment: Option<String>,
}

impl PageRef {
    /// Whether the reference names no document.
    pub fn is_empty(&self) -> bool {
        self.base.is_empty()
    }

    /// Reattach the fragment to the base.
    pub fn to_href(&self) -> String {
        match &self.fragment {
            Some(fragment) => format!("{}#{}", self.base, fragment),
            None => self.base.clone(),
        }
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_href())
    }
}

/// Normalize a raw href.
///
/// The fragment is everything after the first `#` (later `#` characters stay
/// in the fragment). A fragment-only href borrows its base from `current`.
pub fn normalize_href(href: &str, current: Option<&str>) -> PageRef {
    if href.is_empty() {
        return PageRef::default();
    }

    let (base, fragment) = match href.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (href, None),
    };

    let mut base = base.to_string();
    if base.is_empty()
        && let Some(current) = current
    {
        base = normalize_href(current, None).base;
    }
    if let Some(stripped) = base.strip_prefix("./") {
        base = stripped.to_string();
    }

    PageRef {
        base,
        fragment: fragment.filter(|f| !f.is_empty()).map(str::to_string),
    }
}

/// Resolve an in-page anchor against the page it was found on.
///
/// `#name` becomes `page#name`, an empty href becomes `page`, anything else is
/// kept as written.
pub fn resolve_anchor(page: &str, href: &str) -> String {
    if href.starts_with('#') {
        format!("{}{}", page, href)
    } else if href.is_empty() {
        page.to_string()
    } else {
        href.to_string()
    }
}

/// Page reference for a browser-style location path plus optional fragment.
///
/// Only the last path segment is kept; an empty segment maps to [`DEFAULT_PAGE`].
pub fn page_from_location(path: &str, fragment: Option<&str>) -> PageRef {
    let file = path.rsplit('/').next().unwrap_or_default();
    let base = if file.is_empty() { DEFAULT_PAGE } else { file };
    PageRef {
        base: base.to_string(),
        fragment: fragment
            .map(|f| f.trim_start_matches('#'))
            .filter(|f| !f.is_empty())
            .map(str::to_string),
    }
}
