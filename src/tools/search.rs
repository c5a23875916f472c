//! Search tool: ranked objects, methods and properties for a query.

use crate::context::SiteContext;
use crate::fetch::PageFetcher;
use crate::search::{SearchEntry, SearchView};
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Search text; at least two characters
    pub query: String,
    /// Maximum number of results to show (default: all, capped at 50)
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Evaluate a query immediately and format the ranked results.
pub async fn handle_search<F: PageFetcher>(
    context: &SiteContext<F>,
    request: SearchRequest,
) -> Result<String, String> {
    if context.navigation().is_none() {
        return Err(
            "No navigation data is available for this site, so there is nothing to search."
                .to_string(),
        );
    }

    let view = context.session().submit(&request.query).await;
    Ok(format_search_view(&view, request.limit))
}

/// Render a result set with its status line.
pub fn format_search_view(view: &SearchView, limit: Option<usize>) -> String {
    let mut output = String::new();
    if view.entries.is_empty() {
        let _ = writeln!(output, "{}", view.status);
        return output;
    }

    let _ = writeln!(output, "Search results for '{}': {}\n", view.query, view.status);
    let shown = limit.unwrap_or(view.entries.len());
    for (idx, entry) in view.entries.iter().take(shown).enumerate() {
        let _ = writeln!(output, "{}. {}", idx + 1, format_entry(entry));
    }
    if shown < view.entries.len() {
        let _ = writeln!(output, "\n({} more not shown)", view.entries.len() - shown);
    }
    output
}

fn format_entry(entry: &SearchEntry) -> String {
    format!("`{}` ({}) -> {}", entry.title, entry.meta_line(), entry.href)
}
