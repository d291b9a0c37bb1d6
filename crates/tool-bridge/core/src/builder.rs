//! Advertise services as schema-described tools.

use crate::coerce;
use crate::context::ToolContext;
use crate::descriptor::SchemaSerializer;
use crate::error::BridgeError;
use crate::name::ToolName;
use crate::protocol::{CallToolRequest, CallToolResponse};
use crate::registry::{ToolEntry, ToolHandler};
use crate::schema::{SchemaKind, SchemaNode};
use crate::service::{Service, Signature};
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Group whose tools only get an input schema by default.
pub const DEFAULT_COMPLEX_GROUP: &str = "mcpClient";

/// Turns [`Service`] methods into [`ToolEntry`]s.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    serializer: SchemaSerializer,
    complex_groups: BTreeSet<String>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new(SchemaSerializer::default())
    }
}

impl RegistryBuilder {
    pub fn new(serializer: SchemaSerializer) -> Self {
        Self {
            serializer,
            complex_groups: BTreeSet::from([DEFAULT_COMPLEX_GROUP.to_string()]),
        }
    }

    /// Replace the set of groups that skip full schema generation.
    pub fn with_complex_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.complex_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_complex(&self, group: &str) -> bool {
        self.complex_groups.contains(group)
    }

    /// Entries for every method of every service, in order.
    pub fn build(&self, services: &[Arc<dyn Service>]) -> Vec<ToolEntry> {
        services.iter().flat_map(|s| self.build_service(s)).collect()
    }

    /// Entries for one service's methods.
    pub fn build_service(&self, service: &Arc<dyn Service>) -> Vec<ToolEntry> {
        let group = service.name();
        service
            .methods()
            .into_iter()
            .map(|signature| {
                let name = ToolName::new(group, &signature.name);
                let (input, output) = self.schemas(group, &signature);
                let handler = handler(Arc::clone(service), signature.clone());
                let entry = ToolEntry::new(name, signature.description.clone(), input, handler);
                match output {
                    Some(output) => entry.with_output_schema(output),
                    None => entry,
                }
            })
            .collect()
    }

    fn schemas(&self, group: &str, signature: &Signature) -> (SchemaNode, Option<SchemaNode>) {
        if !self.is_complex(group) {
            let full = self.serializer.serialize(&signature.input).and_then(|input| {
                self.serializer
                    .serialize_output(&signature.output)
                    .map(|output| (input, output))
            });
            match full {
                Ok((input, output)) => return (force_object(input), Some(output)),
                Err(e) => tracing::warn!(
                    group,
                    method = %signature.name,
                    error = %e,
                    "full schema unavailable, advertising input only"
                ),
            }
        }
        let input = match &signature.input_example {
            Some(example) => self.serializer.infer_from_example(example),
            None => self.serializer.shallow(&signature.input),
        };
        (force_object(input), None)
    }
}

fn force_object(mut node: SchemaNode) -> SchemaNode {
    if node.kind != Some(SchemaKind::Object) {
        node = SchemaNode {
            description: node.description,
            ..SchemaNode::object()
        };
    }
    node
}

fn handler(service: Arc<dyn Service>, signature: Signature) -> ToolHandler {
    Arc::new(
        move |request: CallToolRequest,
              ctx: ToolContext|
              -> BoxFuture<'static, Result<CallToolResponse, BridgeError>> {
            let service = Arc::clone(&service);
            let signature = signature.clone();
            Box::pin(async move {
                let exec = service.method(&signature.name)?;
                let args = coerce::conform(Value::Object(request.arguments), &signature.input);
                match exec(args, ctx).await {
                    Ok(output) => Ok(CallToolResponse::from_output(output)),
                    Err(e) => {
                        tracing::debug!(tool = %request.name, error = %e, "tool failed");
                        Ok(CallToolResponse::error(e.to_string()))
                    }
                }
            })
        },
    )
}
