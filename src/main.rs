use docnav_mcp::server::DocNavServer;
use docnav_mcp::{Config, SiteContext};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the MCP protocol
    docnav_mcp::tracing::init();

    let mut config = Config::from_env()?;
    if let Some(site_root) = std::env::args().nth(1) {
        config.site_root = site_root;
    }

    tracing::info!("Starting docnav-mcp for {}", config.site_root);

    let context = Arc::new(SiteContext::from_config(config).await?);
    context.start_indexing();

    let server = DocNavServer::new(Arc::clone(&context));
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    service.waiting().await?;
    context.shutdown().await;

    Ok(())
}
