//! Navigation tools: section listing and toggling, page loading, history.

use crate::context::SiteContext;
use crate::error::NavigationError;
use crate::fetch::PageFetcher;
use crate::href::normalize_href;
use crate::nav::{NavigationController, PageTransition, SectionState};
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use tokio::sync::MutexGuard;

/// Maximum number of "did you mean" suggestions.
const SUGGESTION_LIMIT: usize = 5;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ToggleSectionRequest {
    /// Section title (case-insensitive) or 1-based position
    pub section: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct OpenPageRequest {
    /// Page reference relative to the site root, optionally with `#anchor`
    pub href: String,
}

async fn controller<F: PageFetcher>(
    context: &SiteContext<F>,
) -> Result<MutexGuard<'_, NavigationController<F>>, String> {
    match context.navigation() {
        Some(navigation) => Ok(navigation.lock().await),
        None => Err("No navigation data is available for this site.".to_string()),
    }
}

/// List sections with their state; expanded sections show their items.
pub async fn handle_list_sections<F: PageFetcher>(context: &SiteContext<F>) -> Result<String, String> {
    let nav = controller(context).await?;
    Ok(format_sections(&nav, context.product_title()))
}

pub async fn handle_toggle_section<F: PageFetcher>(
    context: &SiteContext<F>,
    request: ToggleSectionRequest,
) -> Result<String, String> {
    let mut nav = controller(context).await?;
    let index = find_section(&nav, &request.section).ok_or_else(|| {
        format!(
            "Section '{}' not found. Use list_sections to see available sections.",
            request.section
        )
    })?;
    let state = nav.toggle_section(index).unwrap_or_default();
    let title = &nav.tree().sections[index].title;
    Ok(format!(
        "{} is now {}.\n\n{}",
        title,
        state_label(state),
        format_sections(&nav, context.product_title())
    ))
}

pub async fn handle_toggle_all_sections<F: PageFetcher>(
    context: &SiteContext<F>,
) -> Result<String, String> {
    let mut nav = controller(context).await?;
    let state = nav.toggle_all_sections();
    Ok(format!(
        "All sections are now {}.\n\n{}",
        state_label(state),
        format_sections(&nav, context.product_title())
    ))
}

pub async fn handle_open_page<F: PageFetcher>(
    context: &SiteContext<F>,
    request: OpenPageRequest,
) -> Result<String, String> {
    let mut nav = controller(context).await?;
    let href = request.href.trim();
    match nav.load_page(href, None).await {
        Ok(transition) => Ok(format_transition(&nav, &transition, context)),
        Err(e) => Err(format_load_error(&nav, href, &e)),
    }
}

pub async fn handle_go_back<F: PageFetcher>(context: &SiteContext<F>) -> Result<String, String> {
    let mut nav = controller(context).await?;
    match nav.go_back().await {
        Ok(transition) => Ok(format_transition(&nav, &transition, context)),
        Err(e) => Err(format!("Cannot go back: {}", e)),
    }
}

pub async fn handle_go_forward<F: PageFetcher>(context: &SiteContext<F>) -> Result<String, String> {
    let mut nav = controller(context).await?;
    match nav.go_forward().await {
        Ok(transition) => Ok(format_transition(&nav, &transition, context)),
        Err(e) => Err(format!("Cannot go forward: {}", e)),
    }
}

/// Match a section by 1-based position or case-insensitive title.
fn find_section<F>(nav: &NavigationController<F>, query: &str) -> Option<usize>
where
    F: PageFetcher,
{
    let query = query.trim();
    let sections = &nav.tree().sections;
    if let Ok(position) = query.parse::<usize>() {
        return (1..=sections.len()).contains(&position).then(|| position - 1);
    }
    sections
        .iter()
        .position(|section| section.title.eq_ignore_ascii_case(query))
}

fn state_label(state: SectionState) -> &'static str {
    match state {
        SectionState::Collapsed => "collapsed",
        SectionState::Expanded => "expanded",
    }
}

fn format_sections<F: PageFetcher>(nav: &NavigationController<F>, product_title: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# {}  [{}]", product_title, nav.expand_all_label());
    if let Some(page) = nav.current_page() {
        let _ = writeln!(output, "Current page: {}", page);
    }
    output.push('\n');

    for (idx, section) in nav.tree().sections.iter().enumerate() {
        let state = nav.section_state(idx).unwrap_or_default();
        let marker = if state.is_expanded() { "▾" } else { "▸" };
        let _ = writeln!(
            output,
            "{} {}. {} ({} items)",
            marker,
            idx + 1,
            section.title,
            section.items.len()
        );
        if !state.is_expanded() {
            continue;
        }
        for (item_idx, item) in section.items.iter().enumerate() {
            let selected = nav
                .selected()
                .is_some_and(|id| id.section == idx && id.item == item_idx);
            let _ = writeln!(
                output,
                "   {} {} -> {}",
                if selected { "*" } else { "-" },
                item.title,
                item.href
            );
        }
    }
    output
}

fn format_transition<F: PageFetcher>(
    nav: &NavigationController<F>,
    transition: &PageTransition,
    context: &SiteContext<F>,
) -> String {
    let item_title = |item: Option<crate::nav::ItemId>| {
        item.and_then(|id| nav.tree().item(id))
            .map_or("no navigation item", |item| item.title.as_str())
    };

    match transition {
        PageTransition::FullNavigation { href, item } => format!(
            "Incremental loading is unavailable for this site. Open {}/{} directly ({}).",
            context.config().site_root.trim_end_matches('/'),
            href,
            item_title(*item)
        ),
        PageTransition::Loaded {
            href,
            item,
            anchor,
            anchor_found,
        } => {
            let mut output = format!("Loaded {} ({})\n", href, item_title(*item));
            if let Some(anchor) = anchor {
                let found = if *anchor_found { "found" } else { "not found" };
                let _ = writeln!(output, "Anchor #{} {}", anchor, found);
            }
            if let Some(content) = nav.content() {
                output.push('\n');
                output.push_str(content.html.trim());
                output.push('\n');
            }
            output
        }
    }
}

fn format_load_error<F: PageFetcher>(
    nav: &NavigationController<F>,
    href: &str,
    error: &NavigationError,
) -> String {
    let mut output = format!("Failed to load '{}': {}", href, error);
    if nav.find_item_by_href(href).is_some() {
        return output;
    }

    let base = normalize_href(href, None).base;
    let stem = base.trim_end_matches(".html").trim_end_matches(".htm");
    let suggestions = nav.suggest_items(stem, SUGGESTION_LIMIT);
    if !suggestions.is_empty() {
        output.push_str("\n\nDid you mean one of these?\n");
        for (_, item) in suggestions {
            let _ = writeln!(output, "• {} -> {}", item.title, item.href);
        }
    }
    output
}
