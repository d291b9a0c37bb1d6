//! Unified error type for the tool bridge.

use std::time::Duration;
use thiserror::Error;

/// Error type returned by bridge operations.
///
/// Every variant is attributable to exactly one tool or operation; nothing is
/// aggregated across calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// A schema node could not be compiled or serialized.
    #[error("schema conversion failed: {0}")]
    SchemaConversion(String),

    /// A value could not be coerced into the requested destination.
    #[error("coercion failed: {0}")]
    Coercion(String),

    /// No tool with this name is registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// No service (tool group) with this name is registered.
    #[error("unknown service: {0}")]
    UnknownService(String),

    /// A service with this name is already registered.
    #[error("service already registered: {0}")]
    DuplicateService(String),

    /// The service exists but does not expose the method.
    #[error("unknown method: {method} in service {service}")]
    UnknownOperation { service: String, method: String },

    /// The remote endpoint could not be reached.
    #[error("remote call failed: {0}")]
    RemoteCall(String),

    /// The remote endpoint reported a tool failure.
    ///
    /// Displays exactly the message extracted from the response.
    #[error("{0}")]
    RemoteTool(String),

    /// No content bucket is compatible with the requested destination.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The caller-supplied timeout elapsed before the call completed.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A local operation failed while executing.
    #[error("execution failed: {0}")]
    Execution(String),
}

impl BridgeError {
    /// Create a schema conversion error.
    pub fn schema<S: ToString>(s: S) -> Self {
        BridgeError::SchemaConversion(s.to_string())
    }

    /// Create a coercion error.
    pub fn coercion<S: ToString>(s: S) -> Self {
        BridgeError::Coercion(s.to_string())
    }

    /// Create an unknown tool error.
    pub fn unknown_tool<S: ToString>(s: S) -> Self {
        BridgeError::UnknownTool(s.to_string())
    }

    /// Create a transport-level error.
    pub fn remote_call<S: ToString>(s: S) -> Self {
        BridgeError::RemoteCall(s.to_string())
    }

    /// Create a remote tool error carrying the remote message verbatim.
    pub fn remote_tool<S: ToString>(s: S) -> Self {
        BridgeError::RemoteTool(s.to_string())
    }

    /// Create a decode error.
    pub fn decode<S: ToString>(s: S) -> Self {
        BridgeError::Decode(s.to_string())
    }

    /// Create an execution error.
    pub fn execution<S: ToString>(s: S) -> Self {
        BridgeError::Execution(s.to_string())
    }

    /// Whether the error means the name was not found in a registry.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BridgeError::UnknownTool(_)
                | BridgeError::UnknownService(_)
                | BridgeError::UnknownOperation { .. }
        )
    }
}
