//! Dynamic schema/type bridge and remote tool proxy.
//!
//! This crate provides:
//! - [`SchemaNode`]: lenient model of the JSON Schema subset tools use
//! - [`SchemaCompiler`] / [`SchemaSerializer`]: schema to [`TypeDescriptor`] and back
//! - [`coerce`]: generic value coercion through serde
//! - [`RemoteToolProxy`]: remote tools behind a [`ToolClient`], exposed as a [`Service`]
//! - [`content`]: classification and decoding of multi-format tool results
//! - [`RegistryBuilder`] / [`ToolRegistry`]: local services advertised as tools
//! - [`BridgeConfig`]: configuration wiring the above

pub mod builder;
pub mod coerce;
pub mod config;
pub mod content;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod matcher;
pub mod name;
pub mod protocol;
pub mod proxy;
pub mod registry;
pub mod schema;
pub mod service;
pub mod types;
pub mod value;

pub use builder::RegistryBuilder;
pub use config::BridgeConfig;
pub use content::{
    ContentElement, ContentKind, Decoded, DestinationShape, ResultBuckets, classify, decode,
    decode_response,
};
pub use context::ToolContext;
pub use descriptor::{
    Annotations, Field, ObjectType, SchemaCompiler, SchemaSerializer, TimeFormat, TypeDescriptor,
};
pub use error::BridgeError;
pub use name::{ToolName, canonical};
pub use protocol::{CallToolRequest, CallToolResponse, RemoteTool, ToolPage};
pub use proxy::{RemoteToolProxy, ToolClient};
pub use registry::{ToolDescriptor, ToolEntry, ToolHandler, ToolRegistry};
pub use schema::{SchemaKind, SchemaNode};
pub use service::{Executable, LocalService, Service, ServiceCatalog, Signature};
pub use types::TypeRegistry;
pub use value::{DynamicValue, Record};

// Re-export BoxFuture so ToolClient implementors need not depend on futures directly
pub use futures::future::BoxFuture;
