//! MCP integration for the tool-bridge family.
//!
//! This crate provides:
//! - [`RmcpToolClient`]: an rmcp client peer usable as a [`ToolClient`](tool_bridge_core::ToolClient)
//! - [`RegistryServer`]: an rmcp server handler publishing a
//!   [`ToolRegistry`](tool_bridge_core::ToolRegistry), with optional pattern filtering

mod client;
mod server;

pub use client::RmcpToolClient;
pub use server::{OutputMode, RegistryServer};

// Re-export rmcp types for convenience
pub use rmcp::transport::stdio;
pub use rmcp::{ClientHandler, ServerHandler, service::ServiceExt};
