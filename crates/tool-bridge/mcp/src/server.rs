//! MCP server handler backed by ToolRegistry.

use rmcp::model as m;
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use std::sync::Arc;
use tool_bridge_core::matcher::matches_tool;
use tool_bridge_core::{CallToolResponse, ContentElement, ToolContext, ToolEntry, ToolRegistry, canonical};

/// Output mode for tool results.
#[derive(Clone, Copy, Debug, Default)]
pub enum OutputMode {
    /// Return results as text content only. Default.
    #[default]
    Text,
    /// Return structured results alongside text.
    /// - list_tools publishes output_schema (if available)
    /// - call_tool populates structured_content
    Structured,
}

/// MCP server handler backed by a [`ToolRegistry`].
///
/// Features:
/// - Tool listing straight from the registry entries
/// - Optional pattern filtering (`system/`, `system/exec-run`, `*`)
/// - Configurable output mode (text or structured)
/// - Per-call [`ToolContext`], typically built from `BridgeConfig::context`
///
/// # Example
///
/// ```ignore
/// use tool_bridge_core::{BridgeConfig, ToolRegistry};
/// use tool_bridge_mcp::{OutputMode, RegistryServer, ServiceExt, stdio};
/// use std::sync::Arc;
///
/// let cfg = BridgeConfig::from_env()?;
/// let registry = Arc::new(ToolRegistry::new());
/// registry.register_service(&service, &cfg.registry_builder());
///
/// let server = RegistryServer::new(registry)
///     .with_patterns(["system/"])
///     .with_context(cfg.context())
///     .with_output_mode(OutputMode::Structured);
/// server.serve(stdio()).await?.waiting().await?;
/// ```
pub struct RegistryServer {
    registry: Arc<ToolRegistry>,
    patterns: Option<Vec<String>>,
    output_mode: OutputMode,
    context: ToolContext,
    name: String,
    version: String,
}

impl RegistryServer {
    /// Create a new server from a registry.
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            patterns: None,
            output_mode: OutputMode::default(),
            context: ToolContext::default(),
            name: "tool-bridge".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Restrict the server to tools matching any of `patterns`.
    ///
    /// Only matching tools will be visible and callable.
    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the output mode for tool results.
    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    /// Context handed to every dispatched call.
    pub fn with_context(mut self, context: ToolContext) -> Self {
        self.context = context;
        self
    }

    /// Set the server name and version.
    pub fn with_info(mut self, name: &str, version: &str) -> Self {
        self.name = name.to_string();
        self.version = version.to_string();
        self
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the output mode.
    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Get the list of effective tool names (respecting patterns).
    pub fn effective_tool_names(&self) -> Vec<String> {
        self.registry
            .names()
            .into_iter()
            .filter(|n| self.is_allowed(n))
            .collect()
    }

    fn is_allowed(&self, name: &str) -> bool {
        self.patterns
            .as_ref()
            .is_none_or(|patterns| patterns.iter().any(|p| matches_tool(p, name)))
    }

    fn structured(&self) -> bool {
        matches!(self.output_mode, OutputMode::Structured)
    }

    fn tool_model(&self, entry: &ToolEntry) -> m::Tool {
        // Include output_schema only in Structured mode
        let output_schema = if self.structured() {
            entry
                .output_schema
                .as_ref()
                .map(|schema| Arc::new(schema.to_object()))
        } else {
            None
        };

        m::Tool {
            name: entry.name.as_str().to_string().into(),
            title: entry.name.as_str().to_string().into(),
            description: Some(entry.description.clone().into()),
            input_schema: Arc::new(entry.input_schema.to_object()),
            annotations: None,
            output_schema,
            icons: None,
            meta: None,
        }
    }

    fn result_model(&self, response: CallToolResponse, has_schema: bool) -> m::CallToolResult {
        let is_error = response.is_error();
        let structured_content = if self.structured() && has_schema && !is_error {
            response.structured_content
        } else {
            None
        };

        m::CallToolResult {
            content: response.content.into_iter().map(content_model).collect(),
            structured_content,
            is_error: Some(is_error),
            meta: None,
        }
    }
}

/// rmcp content for a bridge element.
///
/// Text wins, then images, then raw data as text. A bare resource is sent
/// as its JSON text.
fn content_model(element: ContentElement) -> m::Content {
    if let Some(text) = element.text {
        return m::Content::text(text);
    }
    match (element.kind.as_str(), element.data, element.mime_type) {
        ("image", Some(data), Some(mime)) => m::Content::image(data, mime),
        (_, Some(data), _) => m::Content::text(data),
        (_, None, _) => m::Content::text(
            element
                .resource
                .map_or_else(String::new, |resource| resource.to_string()),
        ),
    }
}

// Allow manual_async_fn because the trait signature uses `impl Future` return types
#[allow(clippy::manual_async_fn)]
impl ServerHandler for RegistryServer {
    fn initialize(
        &self,
        _params: m::InitializeRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::InitializeResult, m::ErrorData>> + Send + '_
    {
        async move {
            Ok(m::InitializeResult {
                server_info: m::Implementation {
                    name: self.name.clone(),
                    title: self.name.clone().into(),
                    version: self.version.clone(),
                    website_url: None,
                    icons: None,
                },
                capabilities: m::ServerCapabilities::builder().enable_tools().build(),
                ..Default::default()
            })
        }
    }

    fn list_tools(
        &self,
        _req: Option<m::PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::ListToolsResult, m::ErrorData>> + Send + '_
    {
        async move {
            let tools: Vec<m::Tool> = self
                .registry
                .entries()
                .iter()
                .filter(|entry| self.is_allowed(entry.name.as_str()))
                .map(|entry| self.tool_model(entry))
                .collect();
            tracing::debug!(tools = tools.len(), "serving tools/list");
            Ok(m::ListToolsResult {
                tools,
                next_cursor: None,
                meta: None,
            })
        }
    }

    fn call_tool(
        &self,
        req: m::CallToolRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<m::CallToolResult, m::ErrorData>> + Send + '_
    {
        async move {
            let name = canonical(&req.name);
            if !self.is_allowed(&name) && !self.is_allowed(&req.name) {
                return Ok(m::CallToolResult::error(vec![m::Content::text(format!(
                    "Tool '{}' not enabled on this server",
                    req.name
                ))]));
            }

            let has_schema = self
                .registry
                .get(&req.name)
                .is_some_and(|entry| entry.output_schema.is_some());
            let args = req.arguments.unwrap_or_default();

            match self.registry.dispatch(&req.name, args, &self.context).await {
                Ok(response) => Ok(self.result_model(response, has_schema)),
                Err(e) => {
                    tracing::debug!(tool = %req.name, error = %e, "tool call failed");
                    Ok(m::CallToolResult::error(vec![m::Content::text(
                        e.to_string(),
                    )]))
                }
            }
        }
    }
}
