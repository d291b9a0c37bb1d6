//! Services: named groups of callable operations.
//!
//! A [`Service`] is what the registry builder turns into tools and what the
//! [`ServiceCatalog`] executes by canonical tool name. Local Rust functions
//! become services through [`LocalService`]; remote tool endpoints through
//! [`RemoteToolProxy`](crate::RemoteToolProxy).

use crate::context::ToolContext;
use crate::descriptor::{SchemaCompiler, TypeDescriptor};
use crate::error::BridgeError;
use crate::name::ToolName;
use futures::future::BoxFuture;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

/// Description of one callable operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    /// Bare method name, without the service prefix.
    pub name: String,
    pub description: String,
    pub input: TypeDescriptor,
    pub output: TypeDescriptor,
    /// Example input, used to infer a schema when the descriptor cannot be
    /// serialized.
    pub input_example: Option<Value>,
}

impl Signature {
    pub fn new(name: &str, description: &str, input: TypeDescriptor, output: TypeDescriptor) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input,
            output,
            input_example: None,
        }
    }

    pub fn with_example(mut self, example: Value) -> Self {
        self.input_example = Some(example);
        self
    }
}

/// Executable body of an operation.
pub type Executable =
    Arc<dyn Fn(Value, ToolContext) -> BoxFuture<'static, Result<Value, BridgeError>> + Send + Sync>;

/// A named group of operations.
pub trait Service: Send + Sync {
    /// Hierarchical group name, e.g. `system/exec`.
    fn name(&self) -> &str;

    fn methods(&self) -> Vec<Signature>;

    /// Executable for a method, [`BridgeError::UnknownOperation`] if absent.
    fn method(&self, name: &str) -> Result<Executable, BridgeError>;

    fn signature(&self, name: &str) -> Option<Signature> {
        self.methods().into_iter().find(|s| s.name == name)
    }
}

// ============================================================================
// Local services
// ============================================================================

/// Service backed by in-process Rust functions.
pub struct LocalService {
    name: String,
    compiler: SchemaCompiler,
    methods: Vec<(Signature, Executable)>,
}

impl std::fmt::Debug for LocalService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalService")
            .field("name", &self.name)
            .field(
                "methods",
                &self.methods.iter().map(|(s, _)| s.name.as_str()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl LocalService {
    /// Empty service; method types are compiled with `compiler`.
    pub fn new(name: impl Into<String>, compiler: &SchemaCompiler) -> Self {
        Self {
            name: name.into(),
            compiler: compiler.clone(),
            methods: Vec::new(),
        }
    }

    /// Add a typed method.
    ///
    /// Input and output descriptors come from the types' schemars schemas.
    /// A type whose schema cannot be compiled falls back to an empty object
    /// (input) or `Any` (output).
    pub fn with_method<I, O, F, Fut>(mut self, name: &str, description: &str, handler: F) -> Self
    where
        I: DeserializeOwned + JsonSchema + Send + 'static,
        O: Serialize + JsonSchema + Send + 'static,
        F: Fn(I, ToolContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, BridgeError>> + Send + 'static,
    {
        let input = self.compiler.descriptor_for::<I>().unwrap_or_else(|e| {
            tracing::warn!(service = %self.name, method = name, error = %e, "input type has no usable schema");
            TypeDescriptor::empty_object()
        });
        let output = self.compiler.descriptor_for::<O>().unwrap_or_else(|e| {
            tracing::warn!(service = %self.name, method = name, error = %e, "output type has no usable schema");
            TypeDescriptor::Any
        });

        let handler = Arc::new(handler);
        let exec: Executable = Arc::new(
            move |args: Value, ctx: ToolContext| -> BoxFuture<'static, Result<Value, BridgeError>> {
                let handler = Arc::clone(&handler);
                Box::pin(async move {
                    let input: I = serde_json::from_value(args)
                        .map_err(|e| BridgeError::coercion(format!("invalid arguments: {e}")))?;
                    let output = handler(input, ctx).await?;
                    serde_json::to_value(output).map_err(BridgeError::coercion)
                })
            },
        );
        self.methods
            .push((Signature::new(name, description, input, output), exec));
        self
    }

    /// Add a method with a hand-built signature.
    pub fn with_raw_method(mut self, signature: Signature, exec: Executable) -> Self {
        self.methods.push((signature, exec));
        self
    }
}

impl Service for LocalService {
    fn name(&self) -> &str {
        &self.name
    }

    fn methods(&self) -> Vec<Signature> {
        self.methods.iter().map(|(s, _)| s.clone()).collect()
    }

    fn method(&self, name: &str) -> Result<Executable, BridgeError> {
        self.methods
            .iter()
            .find(|(s, _)| s.name == name)
            .map(|(_, exec)| Arc::clone(exec))
            .ok_or_else(|| BridgeError::UnknownOperation {
                service: self.name.clone(),
                method: name.to_string(),
            })
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Services keyed by group name, executable by canonical tool name.
#[derive(Default)]
pub struct ServiceCatalog {
    services: RwLock<BTreeMap<String, Arc<dyn Service>>>,
}

impl std::fmt::Debug for ServiceCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCatalog")
            .field("services", &self.names())
            .finish()
    }
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service. Group names are unique.
    pub fn register(&self, service: Arc<dyn Service>) -> Result<(), BridgeError> {
        let mut services = self.services.write().unwrap_or_else(PoisonError::into_inner);
        let name = service.name().to_string();
        if services.contains_key(&name) {
            return Err(BridgeError::DuplicateService(name));
        }
        tracing::debug!(service = %name, "registered service");
        services.insert(name, service);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map(Arc::clone)
    }

    /// All services, ordered by name.
    pub fn services(&self) -> Vec<Arc<dyn Service>> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Arc::clone)
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Execute an operation by tool name (any form [`ToolName::parse`] accepts).
    ///
    /// The service and method are validated before anything runs.
    pub async fn execute(
        &self,
        tool_name: &str,
        args: Value,
        ctx: &ToolContext,
    ) -> Result<Value, BridgeError> {
        let name = ToolName::parse(tool_name);
        let service_name = name.service();
        let service = self
            .lookup(&service_name)
            .ok_or_else(|| BridgeError::UnknownService(service_name.clone()))?;
        let method = name.method();
        if service.signature(method).is_none() {
            return Err(BridgeError::UnknownOperation {
                service: service_name,
                method: method.to_string(),
            });
        }
        let exec = service.method(method)?;
        tracing::debug!(tool = %name, "executing");
        ctx.run(exec(args, ctx.clone())).await
    }
}
