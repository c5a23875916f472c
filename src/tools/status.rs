//! Index status tool.

use crate::context::SiteContext;
use crate::fetch::PageFetcher;
use std::fmt::Write as _;

/// Report navigation origin, registry sizes and indexing progress.
pub async fn handle_index_status<F: PageFetcher>(context: &SiteContext<F>) -> Result<String, String> {
    let session = context.session();
    let view = session.current();
    let state = session.state().await;
    let registry = state.registry();

    let mut output = format!("# {}\n\n", context.product_title());
    let _ = writeln!(output, "Site: {}", context.config().site_root);
    match context.origin() {
        Some(origin) => {
            let _ = writeln!(output, "Navigation: {:?}", origin);
        }
        None => output.push_str("Navigation: unavailable\n"),
    }

    let deep = if state.deep_indexing() {
        "enabled"
    } else {
        "disabled (site is not served over http(s))"
    };
    let _ = writeln!(output, "Deep indexing: {}", deep);
    let _ = writeln!(
        output,
        "Indexing: {}",
        if state.is_indexing() { "in progress" } else { "idle" }
    );
    let _ = writeln!(output, "Pages indexed: {}", state.indexed_pages());
    let _ = writeln!(output, "Pages queued: {}", state.queue_len());
    let _ = writeln!(output, "Object entries: {}", registry.base().len());
    let _ = writeln!(output, "Method/property entries: {}", registry.extra().len());

    if !state.active_query().is_empty() {
        let _ = writeln!(output, "\nActive query: '{}'", state.active_query());
    }
    let _ = writeln!(output, "Status: {}", view.status);
    Ok(output)
}
