//! Proxy for tools hosted on a remote endpoint.

use crate::coerce;
use crate::content::{Decoded, DestinationShape, decode_response};
use crate::context::{ToolContext, bounded};
use crate::descriptor::{SchemaCompiler, TypeDescriptor};
use crate::error::BridgeError;
use crate::protocol::{CallToolRequest, CallToolResponse, RemoteTool, ToolPage};
use crate::schema::SchemaNode;
use crate::service::{Executable, Service, Signature};
use futures::future::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Transport to a remote tool endpoint.
///
/// Implementations report transport failures as [`BridgeError::RemoteCall`].
pub trait ToolClient: Send + Sync {
    /// Fetch one page of the tool listing.
    fn list_tools(&self, cursor: Option<String>) -> BoxFuture<'_, Result<ToolPage, BridgeError>>;

    /// Invoke a tool once.
    fn call_tool(&self, request: CallToolRequest) -> BoxFuture<'_, Result<CallToolResponse, BridgeError>>;
}

#[derive(Default)]
struct Catalog {
    tools: HashMap<String, RemoteTool>,
    signatures: Vec<Signature>,
}

/// Remote tools exposed as a local [`Service`].
pub struct RemoteToolProxy {
    name: String,
    client: Arc<dyn ToolClient>,
    compiler: SchemaCompiler,
    catalog: RwLock<Catalog>,
}

impl std::fmt::Debug for RemoteToolProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteToolProxy")
            .field("name", &self.name)
            .field("tools", &self.tool_names())
            .finish_non_exhaustive()
    }
}

impl RemoteToolProxy {
    /// Discover the endpoint's tools and build a proxy for them.
    pub async fn discover(
        name: impl Into<String>,
        client: Arc<dyn ToolClient>,
        compiler: &SchemaCompiler,
    ) -> Result<Self, BridgeError> {
        let proxy = Self {
            name: name.into(),
            client,
            compiler: compiler.clone(),
            catalog: RwLock::default(),
        };
        proxy.refresh().await?;
        Ok(proxy)
    }

    /// Re-run discovery, replacing the known tools.
    ///
    /// On failure the previous tools are kept.
    pub async fn refresh(&self) -> Result<(), BridgeError> {
        let tools = self.list_all().await?;
        let mut catalog = Catalog::default();
        for tool in tools {
            let signature = self.signature_for(&tool);
            catalog.signatures.push(signature);
            catalog.tools.insert(tool.name.clone(), tool);
        }
        tracing::info!(
            service = %self.name,
            tools = catalog.signatures.len(),
            "discovered remote tools"
        );
        *self.catalog.write().unwrap_or_else(PoisonError::into_inner) = catalog;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<RemoteTool>, BridgeError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.client.list_tools(cursor.take()).await?;
            tracing::debug!(service = %self.name, count = page.tools.len(), "received tool page");
            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }
        Ok(tools)
    }

    fn signature_for(&self, tool: &RemoteTool) -> Signature {
        let input = self.compiler.compile_value(&tool.input_schema).unwrap_or_else(|e| {
            tracing::warn!(
                service = %self.name,
                tool = %tool.name,
                error = %e,
                "input schema unusable, accepting any arguments"
            );
            TypeDescriptor::Any
        });
        let output = match &tool.output_schema {
            Some(raw) => SchemaNode::from_value(raw)
                .and_then(|node| self.compiler.compile_object(&node))
                .unwrap_or_else(|e| {
                    tracing::warn!(
                        service = %self.name,
                        tool = %tool.name,
                        error = %e,
                        "output schema unusable"
                    );
                    TypeDescriptor::empty_object()
                }),
            None => TypeDescriptor::empty_object(),
        };
        Signature::new(
            &tool.name,
            tool.description.as_deref().unwrap_or_default(),
            input,
            output,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Signatures of all known tools, in discovery order.
    pub fn signatures(&self) -> Vec<Signature> {
        self.read().signatures.clone()
    }

    pub fn signature(&self, tool: &str) -> Option<Signature> {
        self.read().signatures.iter().find(|s| s.name == tool).cloned()
    }

    /// Tool definition as the endpoint advertised it.
    pub fn tool(&self, tool: &str) -> Option<RemoteTool> {
        self.read().tools.get(tool).cloned()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.read().signatures.iter().map(|s| s.name.clone()).collect()
    }

    /// Call a remote tool and decode the result into `shape`.
    pub async fn invoke<A>(
        &self,
        tool: &str,
        args: A,
        shape: DestinationShape,
        timeout: Option<Duration>,
    ) -> Result<Decoded, BridgeError>
    where
        A: Serialize + 'static,
    {
        if !self.read().tools.contains_key(tool) {
            return Err(BridgeError::unknown_tool(tool));
        }
        let arguments = coerce::to_map(args)?;
        let request = CallToolRequest::new(tool, arguments);
        let response = bounded(self.client.call_tool(request), timeout).await?;
        into_decoded(&response, shape)
    }

    /// Call a remote tool and deserialize its structured result into `T`.
    pub async fn invoke_as<A, T>(&self, tool: &str, args: A, timeout: Option<Duration>) -> Result<T, BridgeError>
    where
        A: Serialize + 'static,
        T: DeserializeOwned,
    {
        self.invoke(tool, args, DestinationShape::Structured, timeout)
            .await?
            .into_typed()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Catalog> {
        self.catalog.read().unwrap_or_else(PoisonError::into_inner)
    }
}

fn into_decoded(response: &CallToolResponse, shape: DestinationShape) -> Result<Decoded, BridgeError> {
    if response.is_error() {
        return Err(BridgeError::remote_tool(response.error_message()));
    }
    decode_response(response, shape)
}

impl Service for RemoteToolProxy {
    fn name(&self) -> &str {
        &self.name
    }

    fn methods(&self) -> Vec<Signature> {
        self.signatures()
    }

    fn method(&self, name: &str) -> Result<Executable, BridgeError> {
        if !self.read().tools.contains_key(name) {
            return Err(BridgeError::UnknownOperation {
                service: self.name.clone(),
                method: name.to_string(),
            });
        }
        let client = Arc::clone(&self.client);
        let tool = name.to_string();
        Ok(Arc::new(
            move |args: Value, ctx: ToolContext| -> BoxFuture<'static, Result<Value, BridgeError>> {
                let client = Arc::clone(&client);
                let tool = tool.clone();
                Box::pin(async move {
                    let arguments = coerce::to_map(args)?;
                    let response = ctx
                        .run(client.call_tool(CallToolRequest::new(tool, arguments)))
                        .await?;
                    into_decoded(&response, DestinationShape::Opaque).map(Decoded::into_value)
                })
            },
        ))
    }
}
