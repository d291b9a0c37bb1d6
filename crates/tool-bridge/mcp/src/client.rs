//! rmcp client peer exposed as a [`ToolClient`].

use rmcp::model as m;
use rmcp::service::{Peer, RunningService, Service};
use rmcp::RoleClient;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tool_bridge_core::coerce::coerce;
use tool_bridge_core::{BoxFuture, BridgeError, CallToolRequest, CallToolResponse, ToolClient, ToolPage};

/// [`ToolClient`] backed by a connected rmcp client.
///
/// rmcp models are translated into the bridge wire types through their JSON
/// form, so unknown content variants survive as [`ContentKind::Other`].
///
/// [`ContentKind::Other`]: tool_bridge_core::ContentKind::Other
///
/// # Example
///
/// ```ignore
/// use tool_bridge_core::{RemoteToolProxy, SchemaCompiler};
/// use tool_bridge_mcp::{RmcpToolClient, ServiceExt};
/// use std::sync::Arc;
///
/// let running = ().serve(transport).await?;
/// let client = Arc::new(RmcpToolClient::from_running(&running));
/// let proxy = RemoteToolProxy::discover("mcpClient", client, &SchemaCompiler::new()).await?;
/// ```
#[derive(Clone)]
pub struct RmcpToolClient {
    peer: Peer<RoleClient>,
}

impl RmcpToolClient {
    pub fn new(peer: Peer<RoleClient>) -> Self {
        Self { peer }
    }

    /// Borrow the peer of a running client service.
    pub fn from_running<S: Service<RoleClient>>(service: &RunningService<RoleClient, S>) -> Self {
        Self::new(service.peer().clone())
    }

    pub fn peer(&self) -> &Peer<RoleClient> {
        &self.peer
    }
}

impl From<Peer<RoleClient>> for RmcpToolClient {
    fn from(peer: Peer<RoleClient>) -> Self {
        Self::new(peer)
    }
}

impl ToolClient for RmcpToolClient {
    fn list_tools(&self, cursor: Option<String>) -> BoxFuture<'_, Result<ToolPage, BridgeError>> {
        Box::pin(async move {
            let result = self
                .peer
                .list_tools(Some(m::PaginatedRequestParam { cursor }))
                .await
                .map_err(BridgeError::remote_call)?;
            tracing::debug!(
                tools = result.tools.len(),
                more = result.next_cursor.is_some(),
                "received tools/list page"
            );
            from_model(result)
        })
    }

    fn call_tool(&self, request: CallToolRequest) -> BoxFuture<'_, Result<CallToolResponse, BridgeError>> {
        Box::pin(async move {
            tracing::debug!(tool = %request.name, "calling remote tool");
            let param = m::CallToolRequestParam {
                name: request.name.into(),
                arguments: Some(request.arguments),
            };
            let result = self
                .peer
                .call_tool(param)
                .await
                .map_err(BridgeError::remote_call)?;
            from_model(result)
        })
    }
}

fn from_model<M, T>(model: M) -> Result<T, BridgeError>
where
    M: Serialize + 'static,
    T: DeserializeOwned + 'static,
{
    coerce(model).map_err(|e| BridgeError::decode(format!("unexpected rmcp payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tool_bridge_core::{ContentKind, Decoded, DestinationShape, decode_response};

    #[test]
    fn list_result_maps_to_page() {
        let page: m::ListToolsResult = serde_json::from_value(json!({
            "tools": [{
                "name": "echo",
                "description": "Echo a message",
                "inputSchema": {"type": "object", "properties": {"message": {"type": "string"}}}
            }],
            "nextCursor": "next"
        }))
        .unwrap();

        let page: ToolPage = from_model(page).unwrap();
        assert_eq!(page.next_cursor.as_deref(), Some("next"));
        assert_eq!(page.tools[0].name, "echo");
        assert_eq!(page.tools[0].description.as_deref(), Some("Echo a message"));
        assert_eq!(page.tools[0].input_schema["properties"]["message"]["type"], "string");
        assert!(page.tools[0].output_schema.is_none());
    }

    #[test]
    fn call_result_maps_mixed_content() {
        let result = m::CallToolResult {
            content: vec![
                m::Content::text("hello"),
                m::Content::image("iVBORw0KGgo=", "image/png"),
            ],
            structured_content: None,
            is_error: Some(false),
            meta: None,
        };

        let response: CallToolResponse = from_model(result).unwrap();
        assert!(!response.is_error());
        assert_eq!(response.content[0].kind, ContentKind::Text);
        assert_eq!(response.content[1].kind, ContentKind::Other("image".into()));
        assert_eq!(response.content[1].mime_type.as_deref(), Some("image/png"));
        assert_eq!(
            decode_response(&response, DestinationShape::Text).unwrap(),
            Decoded::Text("hello".into())
        );
    }

    #[test]
    fn error_result_keeps_message() {
        let result = m::CallToolResult::error(vec![m::Content::text("boom")]);
        let response: CallToolResponse = from_model(result).unwrap();
        assert!(response.is_error());
        assert_eq!(response.error_message(), "boom");
    }
}
