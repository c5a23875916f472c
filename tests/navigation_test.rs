mod common;

use assert2::check;
use common::{INDEX_PAGE, MockSite, TempWorkspace, class_page, open_site, site};
use docnav_mcp::nav::{MemoryStore, NavigationOrigin, SectionState, SnapshotStore};
use docnav_mcp::tools::navigation::{
    OpenPageRequest, ToggleSectionRequest, handle_go_back, handle_go_forward, handle_list_sections,
    handle_open_page, handle_toggle_all_sections, handle_toggle_section,
};
use docnav_mcp::tools::search::{SearchRequest, handle_search};
use docnav_mcp::tools::status::handle_index_status;
use docnav_mcp::{Config, FileFetcher, SiteContext};
use rstest::rstest;
use std::sync::Arc;

fn open(href: &str) -> OpenPageRequest {
    OpenPageRequest {
        href: href.to_string(),
    }
}

#[rstest]
#[tokio::test]
async fn live_listing_is_extracted_and_persisted(site: MockSite) {
    let store = MemoryStore::default();
    let context = SiteContext::open(Config::default(), Arc::new(site), &store, true)
        .await
        .unwrap();

    check!(context.origin() == Some(NavigationOrigin::Live));
    check!(context.product_title() == "ExtendScript API");
    let snapshot = store.load("extendscriptApiNavigationData").unwrap().unwrap();
    check!(snapshot.contains("\"productTitle\":\"ExtendScript API\""));
    check!(snapshot.contains("ScriptUI Classes"));
}

#[rstest]
#[tokio::test]
async fn snapshot_is_reused_when_page_has_no_listing(site: MockSite) {
    let store = MemoryStore::default();
    SiteContext::open(Config::default(), Arc::new(site), &store, true)
        .await
        .unwrap();

    let bare = MockSite::new().with_page("index.html", "<html><body><h1>Home</h1></body></html>");
    let context = SiteContext::open(Config::default(), Arc::new(bare), &store, true)
        .await
        .unwrap();

    check!(context.origin() == Some(NavigationOrigin::Snapshot));
    let nav = context.navigation().unwrap().lock().await;
    check!(nav.tree().sections.len() == 2);
    check!(nav.tree().sections[0].items[0].href == "./Array.html");
}

#[tokio::test]
async fn site_without_navigation_degrades_gracefully() {
    let bare = MockSite::new().with_page("index.html", "<html><body></body></html>");
    let (context, _site) = open_site(bare, true).await;

    check!(context.origin().is_none());
    check!(context.navigation().is_none());
    check!(context.session().state().await.registry().is_empty());

    let err = handle_search(
        &context,
        SearchRequest {
            query: "array".to_string(),
            limit: None,
        },
    )
    .await
    .unwrap_err();
    check!(err.contains("No navigation data"));
    check!(handle_list_sections(&context).await.is_err());
}

#[tokio::test]
async fn unreachable_entry_page_falls_back_to_snapshot() {
    let store = MemoryStore::default();
    SiteContext::open(
        Config::default(),
        Arc::new(MockSite::new().with_page("index.html", INDEX_PAGE)),
        &store,
        true,
    )
    .await
    .unwrap();

    let context = SiteContext::open(Config::default(), Arc::new(MockSite::new()), &store, true)
        .await
        .unwrap();
    check!(context.origin() == Some(NavigationOrigin::Snapshot));
    check!(context.product_title() == "ExtendScript API");
}

#[rstest]
#[tokio::test]
async fn sections_toggle_individually_and_in_bulk(site: MockSite) {
    let (context, _site) = open_site(site, true).await;

    let listing = handle_list_sections(&context).await.unwrap();
    check!(listing.contains("# ExtendScript API  [Expand All]"));
    check!(listing.contains("▸ 1. JavaScript Classes (3 items)"));
    check!(!listing.contains("Array.html"));

    let output = handle_toggle_section(
        &context,
        ToggleSectionRequest {
            section: "scriptui classes".to_string(),
        },
    )
    .await
    .unwrap();
    check!(output.starts_with("ScriptUI Classes is now expanded."));
    check!(output.contains("- Window -> Window.html"));

    // One section still collapsed: expand everything.
    let output = handle_toggle_all_sections(&context).await.unwrap();
    check!(output.starts_with("All sections are now expanded."));
    check!(output.contains("[Collapse All]"));

    // Nothing collapsed: collapse everything.
    let output = handle_toggle_all_sections(&context).await.unwrap();
    check!(output.starts_with("All sections are now collapsed."));

    let nav = context.navigation().unwrap().lock().await;
    check!(nav.section_state(0) == Some(SectionState::Collapsed));
    check!(nav.section_state(1) == Some(SectionState::Collapsed));
}

#[rstest]
#[tokio::test]
async fn unknown_section_is_reported(site: MockSite) {
    let (context, _site) = open_site(site, true).await;
    let err = handle_toggle_section(
        &context,
        ToggleSectionRequest {
            section: "7".to_string(),
        },
    )
    .await
    .unwrap_err();
    check!(err.contains("Section '7' not found"));
}

#[rstest]
#[tokio::test]
async fn open_page_splices_content_and_selects_item(site: MockSite) {
    let (context, site) = open_site(site, true).await;

    let output = handle_open_page(&context, open("./Window.html#show")).await.unwrap();
    check!(output.starts_with("Loaded Window.html#show (Window)"));
    check!(output.contains("Anchor #show found"));
    check!(output.contains("<h1 class=\"title topictitle1\">Window</h1>"));
    check!(!output.contains("Embedded"));
    check!(site.fetch_count("Window.html") == 1);

    let listing = handle_list_sections(&context).await.unwrap();
    check!(listing.contains("Current page: Window.html#show"));
    check!(listing.contains("* Window -> Window.html"));
}

#[rstest]
#[tokio::test]
async fn failed_load_reports_error_and_keeps_page(site: MockSite) {
    let (context, _site) = open_site(site, true).await;
    handle_open_page(&context, open("Array.html")).await.unwrap();

    let err = handle_open_page(&context, open("Missing.html")).await.unwrap_err();
    check!(err.starts_with("Failed to load 'Missing.html'"));
    check!(!err.contains("Did you mean"));

    let nav = context.navigation().unwrap().lock().await;
    check!(nav.current_page() == Some("Array.html"));
    check!(nav.content().unwrap().page == "Array.html");
}

#[rstest]
#[tokio::test]
async fn unknown_page_suggests_similar_items(site: MockSite) {
    let (context, _site) = open_site(site, true).await;
    let err = handle_open_page(&context, open("Windw.html")).await.unwrap_err();
    check!(err.contains("Did you mean one of these?"));
    check!(err.contains("• Window -> Window.html"));
}

#[rstest]
#[tokio::test]
async fn history_replays_without_growing(site: MockSite) {
    let (context, _site) = open_site(site, true).await;

    let err = handle_go_back(&context).await.unwrap_err();
    check!(err == "Cannot go back: no previous history entry");

    handle_open_page(&context, open("Array.html")).await.unwrap();
    handle_open_page(&context, open("File.html")).await.unwrap();

    let output = handle_go_back(&context).await.unwrap();
    check!(output.starts_with("Loaded Array.html (Array)"));
    let output = handle_go_back(&context).await.unwrap();
    check!(output.starts_with("Loaded index.html (no navigation item)"));

    let output = handle_go_forward(&context).await.unwrap();
    check!(output.starts_with("Loaded Array.html (Array)"));

    let nav = context.navigation().unwrap().lock().await;
    check!(nav.history().len() == 3);
    check!(nav.history().can_go_forward());
}

#[rstest]
#[tokio::test]
async fn search_tool_formats_ranked_results(site: MockSite) {
    let (context, _site) = open_site(site, true).await;
    let output = handle_search(
        &context,
        SearchRequest {
            query: "win".to_string(),
            limit: Some(1),
        },
    )
    .await
    .unwrap();

    check!(output.starts_with("Search results for 'win': 2 results"));
    check!(output.contains("1. `Window` (Object · ScriptUI Classes) -> Window.html"));
    check!(output.contains("(1 more not shown)"));

    let status = handle_index_status(&context).await.unwrap();
    check!(status.contains("Navigation: Live"));
    check!(status.contains("Object entries: 5"));
    check!(status.contains("Active query: 'win'"));
}

#[tokio::test]
async fn file_backed_site_uses_full_navigation() {
    let workspace = TempWorkspace::new();
    workspace.create_file("docs/index.html", INDEX_PAGE);
    workspace.create_file("docs/Window.html", &class_page("Window", &["show"], &[]));
    workspace.create_file("cache/.keep", "");

    let config = Config {
        site_root: workspace.path().join("docs").display().to_string(),
        storage_dir: Some(workspace.path().join("cache")),
        ..Config::default()
    };
    check!(!config.is_network_site());

    let context = SiteContext::from_config(config).await.unwrap();
    check!(!context.is_network());
    check!(context.origin() == Some(NavigationOrigin::Live));
    check!(
        workspace
            .path()
            .join("cache/extendscriptApiNavigationData.json")
            .exists()
    );

    let output = handle_open_page(&context, open("Window.html")).await.unwrap();
    check!(output.contains("Incremental loading is unavailable for this site."));
    check!(output.contains("(Window)"));

    let fetcher = FileFetcher::new(workspace.path().join("docs"));
    check!(fetcher.resolve("../secret.html").is_err());
}
