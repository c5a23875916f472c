//! MCP server exposing navigation and search over one documentation site.

use crate::context::SiteContext;
use crate::fetch::SiteFetcher;
use crate::tools::navigation::{
    OpenPageRequest, ToggleSectionRequest, handle_go_back, handle_go_forward, handle_list_sections,
    handle_open_page, handle_toggle_all_sections, handle_toggle_section,
};
use crate::tools::search::{SearchRequest, handle_search};
use crate::tools::status::handle_index_status;
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for a reference documentation site
#[derive(Clone)]
pub struct DocNavServer {
    /// Opened site: navigation, search session and indexer
    context: Arc<SiteContext<SiteFetcher>>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for DocNavServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocNavServer")
            .field("context", &self.context)
            .finish()
    }
}

#[tool_router]
impl DocNavServer {
    pub fn new(context: Arc<SiteContext<SiteFetcher>>) -> Self {
        Self {
            context,
            tool_router: Self::tool_router(),
        }
    }

    pub fn context(&self) -> &Arc<SiteContext<SiteFetcher>> {
        &self.context
    }

    #[tool(
        description = "Search objects, methods and properties of the documentation site. Object names come from the navigation tree; methods and properties appear as background indexing reaches their pages. Object matches always rank before method/property matches.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.context, request).await
    }

    #[tool(
        description = "List navigation sections with their expanded/collapsed state. Expanded sections show their pages; the selected page is marked with *."
    )]
    async fn list_sections(&self) -> std::result::Result<String, String> {
        handle_list_sections(&self.context).await
    }

    #[tool(
        description = "Expand or collapse one navigation section, by title or 1-based position.",
        input_schema = inline_schema_for_type::<ToggleSectionRequest>()
    )]
    async fn toggle_section(
        &self,
        Parameters(request): Parameters<ToggleSectionRequest>,
    ) -> std::result::Result<String, String> {
        handle_toggle_section(&self.context, request).await
    }

    #[tool(
        description = "Expand all sections, or collapse all of them when every section is already expanded."
    )]
    async fn toggle_all_sections(&self) -> std::result::Result<String, String> {
        handle_toggle_all_sections(&self.context).await
    }

    #[tool(
        description = "Open a documentation page by reference (e.g. 'Window.html' or 'Window.html#show'). Selects its navigation item and returns the page content.",
        input_schema = inline_schema_for_type::<OpenPageRequest>()
    )]
    async fn open_page(
        &self,
        Parameters(request): Parameters<OpenPageRequest>,
    ) -> std::result::Result<String, String> {
        handle_open_page(&self.context, request).await
    }

    #[tool(description = "Return to the previously opened page.")]
    async fn go_back(&self) -> std::result::Result<String, String> {
        handle_go_back(&self.context).await
    }

    #[tool(description = "Move forward again after go_back.")]
    async fn go_forward(&self) -> std::result::Result<String, String> {
        handle_go_forward(&self.context).await
    }

    #[tool(
        description = "Report navigation source, search index sizes and background indexing progress."
    )]
    async fn index_status(&self) -> std::result::Result<String, String> {
        handle_index_status(&self.context).await
    }
}

#[tool_handler]
impl ServerHandler for DocNavServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(format!(
                "docnav-mcp: navigation and search for the {} reference. \
                 Use search to find objects, methods and properties, open_page to read a page, \
                 and list_sections to browse the navigation tree. \
                 Method and property results grow while background indexing runs (see index_status).",
                self.context.product_title()
            ))
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this function sets `inline_subschemas = true`
/// to generate inline definitions instead of $ref patterns.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(rmcp::schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => Arc::new(object),
        Ok(_) | Err(_) => Arc::new(JsonObject::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn request_schemas_are_inline_objects() {
        let schema = inline_schema_for_type::<SearchRequest>();
        check!(schema.get("type").and_then(|t| t.as_str()) == Some("object"));
        let properties = schema.get("properties").and_then(|p| p.as_object());
        check!(properties.is_some_and(|p| p.contains_key("query") && p.contains_key("limit")));
    }
}
