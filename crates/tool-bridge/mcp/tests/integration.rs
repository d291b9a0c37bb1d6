//! Integration tests for the MCP adapters.
//!
//! A RegistryServer and an rmcp client talk over an in-process duplex pipe;
//! the client side is then driven through RmcpToolClient and RemoteToolProxy.

use rmcp::RoleClient;
use rmcp::model::{CallToolRequestParam, ReadResourceRequestParam};
use rmcp::service::RunningService;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tool_bridge_core::{
    BridgeError, Decoded, DestinationShape, LocalService, RegistryBuilder, RemoteToolProxy,
    SchemaCompiler, Service, ToolContext, ToolRegistry,
};
use tool_bridge_mcp::{OutputMode, RegistryServer, RmcpToolClient, ServiceExt};

// =============================================================================
// Test Service
// =============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
struct AddInput {
    a: i64,
    b: i64,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
struct AddOutput {
    sum: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ShoutInput {
    /// Message to upper-case
    message: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct NoInput {}

fn registry() -> Arc<ToolRegistry> {
    let compiler = SchemaCompiler::new();
    let service: Arc<dyn Service> = Arc::new(
        LocalService::new("math", &compiler)
            .with_method("add", "Add two integers", |input: AddInput, _ctx: ToolContext| async move {
                Ok::<_, BridgeError>(AddOutput {
                    sum: input.a + input.b,
                })
            })
            .with_method("shout", "Upper-case a message", |input: ShoutInput, _ctx: ToolContext| async move {
                Ok::<_, BridgeError>(input.message.to_uppercase())
            })
            .with_method("fail", "Always fails", |_input: NoInput, _ctx: ToolContext| async move {
                Err::<String, _>(BridgeError::execution("nope"))
            }),
    );

    let registry = Arc::new(ToolRegistry::new());
    registry.register_service(&service, &RegistryBuilder::default());
    registry
}

type Client = RunningService<RoleClient, ()>;

async fn connect(server: RegistryServer) -> anyhow::Result<Client> {
    let (server_io, client_io) = tokio::io::duplex(4096);
    tokio::spawn(async move {
        if let Ok(running) = server.serve(server_io).await {
            let _ = running.waiting().await;
        }
    });
    Ok(().serve(client_io).await?)
}

async fn proxy(client: &Client) -> RemoteToolProxy {
    let tool_client = Arc::new(RmcpToolClient::from_running(client));
    RemoteToolProxy::discover("remote", tool_client, &SchemaCompiler::new())
        .await
        .unwrap()
}

// =============================================================================
// Server Tests
// =============================================================================

#[tokio::test]
async fn test_server_lists_registry_tools() {
    let client = connect(RegistryServer::new(registry())).await.unwrap();

    let listed = client.list_tools(Default::default()).await.unwrap();
    let names: Vec<&str> = listed.tools.iter().map(|t| t.name.as_ref()).collect();
    assert_eq!(names, vec!["math-add", "math-shout", "math-fail"]);

    let add = &listed.tools[0];
    assert_eq!(add.description.as_deref(), Some("Add two integers"));
    assert_eq!(add.input_schema["required"], json!(["a", "b"]));
    // Text mode never publishes output schemas
    assert!(add.output_schema.is_none());

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_structured_mode_publishes_output_schema() {
    let server = RegistryServer::new(registry()).with_output_mode(OutputMode::Structured);
    let client = connect(server).await.unwrap();

    let listed = client.list_tools(Default::default()).await.unwrap();
    let add = listed.tools.iter().find(|t| t.name == "math-add").unwrap();
    let output = add.output_schema.as_deref().unwrap();
    assert_eq!(output["type"], json!("object"));
    assert_eq!(output["properties"]["sum"]["type"], json!("integer"));

    let result = client
        .call_tool(CallToolRequestParam {
            name: "math-add".into(),
            arguments: json!({"a": 2, "b": 3}).as_object().cloned(),
        })
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(false));
    assert_eq!(result.structured_content, Some(json!({"sum": 5})));

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_patterns_filter_listing_and_calls() {
    let server = RegistryServer::new(registry()).with_patterns(["math-add"]);
    let client = connect(server).await.unwrap();

    let listed = client.list_tools(Default::default()).await.unwrap();
    assert_eq!(listed.tools.len(), 1);
    assert_eq!(listed.tools[0].name, "math-add");

    let result = client
        .call_tool(CallToolRequestParam {
            name: "math-shout".into(),
            arguments: json!({"message": "hi"}).as_object().cloned(),
        })
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
    let text = result.content[0].as_text().map(|t| t.text.clone()).unwrap();
    assert!(text.contains("not enabled"));

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_unknown_tool_is_an_error_result() {
    let client = connect(RegistryServer::new(registry())).await.unwrap();

    let result = client
        .call_tool(CallToolRequestParam {
            name: "math-divide".into(),
            arguments: None,
        })
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
    let text = result.content[0].as_text().map(|t| t.text.clone()).unwrap();
    assert_eq!(text, "unknown tool: math-divide");

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_non_tool_methods_use_handler_defaults() {
    let client = connect(RegistryServer::new(registry())).await.unwrap();

    let info = client.peer_info().unwrap();
    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.prompts.is_none());
    assert!(info.capabilities.resources.is_none());

    let prompts = client.list_prompts(Default::default()).await.unwrap();
    assert!(prompts.prompts.is_empty());
    let resources = client.list_resources(Default::default()).await.unwrap();
    assert!(resources.resources.is_empty());

    let read = client
        .read_resource(ReadResourceRequestParam {
            uri: "file:///missing".into(),
        })
        .await;
    assert!(read.is_err());

    // The session keeps serving tools after a rejected request
    let listed = client.list_tools(Default::default()).await.unwrap();
    assert_eq!(listed.tools.len(), 3);

    client.cancel().await.unwrap();
}

// =============================================================================
// Client + Proxy Tests
// =============================================================================

#[tokio::test]
async fn test_proxy_discovers_remote_signatures() {
    let client = connect(RegistryServer::new(registry())).await.unwrap();
    let proxy = proxy(&client).await;

    assert_eq!(proxy.tool_names(), vec!["math-add", "math-shout", "math-fail"]);
    let shout = proxy.signature("math-shout").unwrap();
    let message = shout.input.as_object().unwrap().field("message").unwrap();
    assert_eq!(message.ident, "Message");
    assert!(!message.optional);

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_proxy_invokes_through_mcp() {
    let server = RegistryServer::new(registry()).with_output_mode(OutputMode::Structured);
    let client = connect(server).await.unwrap();
    let proxy = proxy(&client).await;

    let text = proxy
        .invoke("math-shout", json!({"message": "hello"}), DestinationShape::Text, None)
        .await
        .unwrap();
    assert_eq!(text, Decoded::Text("HELLO".into()));

    let sum: AddOutput = proxy
        .invoke_as("math-add", json!({"a": 20, "b": 22}), None)
        .await
        .unwrap();
    assert_eq!(sum, AddOutput { sum: 42 });

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_proxy_surfaces_remote_errors() {
    let client = connect(RegistryServer::new(registry())).await.unwrap();
    let proxy = proxy(&client).await;

    let err = proxy
        .invoke("math-fail", json!({}), DestinationShape::Text, None)
        .await
        .unwrap_err();
    assert_eq!(err, BridgeError::RemoteTool("execution failed: nope".into()));

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn test_transport_closed_is_remote_call_error() {
    let client = connect(RegistryServer::new(registry())).await.unwrap();
    let tool_client = Arc::new(RmcpToolClient::from_running(&client));
    client.cancel().await.unwrap();

    let err = RemoteToolProxy::discover("remote", tool_client, &SchemaCompiler::new())
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::RemoteCall(_)));
}
