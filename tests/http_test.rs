mod common;

use assert2::check;
use common::{INDEX_PAGE, TempWorkspace, class_page};
use docnav_mcp::config::IndexerConfig;
use docnav_mcp::tools::navigation::{OpenPageRequest, handle_open_page};
use docnav_mcp::{Config, SiteContext};
use mockito::{Mock, Server, ServerGuard};

async fn html_mock(server: &mut ServerGuard, path: &str, body: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(body)
        .expect(1)
        .create_async()
        .await
}

async fn error_mock(server: &mut ServerGuard, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .expect(1)
        .create_async()
        .await
}

fn config(server: &Server, workspace: &TempWorkspace) -> Config {
    Config {
        site_root: server.url(),
        storage_dir: Some(workspace.path().to_path_buf()),
        indexer: IndexerConfig {
            initial_delay_ms: 1,
            tick_delay_ms: 1,
        },
        ..Config::default()
    }
}

#[tokio::test]
async fn http_site_indexes_every_page_once() {
    let mut server = Server::new_async().await;
    let workspace = TempWorkspace::new();

    let mocks = vec![
        html_mock(&mut server, "/index.html", INDEX_PAGE).await,
        html_mock(&mut server, "/Array.html", &class_page("Array", &["push"], &[])).await,
        error_mock(&mut server, "/File.html", 500).await,
        error_mock(&mut server, "/Missing.html", 404).await,
        html_mock(&mut server, "/Window.html", &class_page("Window", &["close"], &["bounds"])).await,
    ];

    let context = SiteContext::from_config(config(&server, &workspace)).await.unwrap();
    check!(context.is_network());
    context.start_indexing();
    context.wait_for_indexing().await;

    for mock in &mocks {
        mock.assert_async().await;
    }

    let state = context.session().state().await;
    check!(state.indexed_pages() == 4);
    check!(state.cached_page("File.html") == Some(&[][..]));
    drop(state);

    let view = context.session().submit("close").await;
    check!(view.entries.len() == 1);
    check!(view.entries[0].href == "Window.html#close");
}

#[tokio::test]
async fn http_site_loads_pages_incrementally() {
    let mut server = Server::new_async().await;
    let workspace = TempWorkspace::new();

    let _index = html_mock(&mut server, "/index.html", INDEX_PAGE).await;
    let window = html_mock(&mut server, "/Window.html", &class_page("Window", &["close"], &[])).await;

    let context = SiteContext::from_config(config(&server, &workspace)).await.unwrap();
    let output = handle_open_page(
        &context,
        OpenPageRequest {
            href: "Window.html#close".to_string(),
        },
    )
    .await
    .unwrap();

    window.assert_async().await;
    check!(output.starts_with("Loaded Window.html#close (Window)"));
    check!(output.contains("Anchor #close found"));
}
