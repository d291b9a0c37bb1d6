//! Tool registry for dynamic dispatch by canonical name.

use crate::builder::RegistryBuilder;
use crate::context::ToolContext;
use crate::error::BridgeError;
use crate::matcher;
use crate::name::{ToolName, canonical};
use crate::protocol::{CallToolRequest, CallToolResponse};
use crate::schema::SchemaNode;
use crate::service::Service;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Handler invoked for a tool call.
pub type ToolHandler = Arc<
    dyn Fn(CallToolRequest, ToolContext) -> BoxFuture<'static, Result<CallToolResponse, BridgeError>>
        + Send
        + Sync,
>;

/// A registered tool: advertised definition plus handler.
#[derive(Clone)]
pub struct ToolEntry {
    pub name: ToolName,
    pub description: String,
    pub input_schema: SchemaNode,
    pub output_schema: Option<SchemaNode>,
    handler: ToolHandler,
}

impl std::fmt::Debug for ToolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .field("output_schema", &self.output_schema)
            .finish_non_exhaustive()
    }
}

impl ToolEntry {
    pub fn new(
        name: ToolName,
        description: impl Into<String>,
        input_schema: SchemaNode,
        handler: ToolHandler,
    ) -> Self {
        Self {
            name,
            description: description.into(),
            input_schema,
            output_schema: None,
            handler,
        }
    }

    pub fn with_output_schema(mut self, schema: SchemaNode) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Invoke the handler.
    pub fn call(
        &self,
        request: CallToolRequest,
        ctx: ToolContext,
    ) -> BoxFuture<'static, Result<CallToolResponse, BridgeError>> {
        (self.handler)(request, ctx)
    }
}

/// Name and description of a registered tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

#[derive(Default)]
struct Inner {
    entries: Vec<Arc<ToolEntry>>,
    index: HashMap<String, usize>,
}

/// Registry of tools, safe to share across tasks.
///
/// Names are unique; the first registration of a name wins. Entries keep
/// their registration order.
#[derive(Default)]
pub struct ToolRegistry {
    inner: RwLock<Inner>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append entries, skipping names already present. Returns how many were
    /// added.
    pub fn add_entries(&self, entries: impl IntoIterator<Item = ToolEntry>) -> usize {
        let mut inner = self.write();
        let mut added = 0;
        for entry in entries {
            let key = entry.name.as_str().to_string();
            if inner.index.contains_key(&key) {
                tracing::warn!(tool = %key, "tool already registered, keeping the first");
                continue;
            }
            let idx = inner.entries.len();
            inner.entries.push(Arc::new(entry));
            inner.index.insert(key, idx);
            added += 1;
        }
        tracing::debug!(added, total = inner.entries.len(), "registered tools");
        added
    }

    /// Add one entry. Returns false when the name was taken.
    pub fn register(&self, entry: ToolEntry) -> bool {
        self.add_entries([entry]) == 1
    }

    /// Build and add the tools of one service.
    pub fn register_service(&self, service: &Arc<dyn Service>, builder: &RegistryBuilder) -> usize {
        self.add_entries(builder.build_service(service))
    }

    /// Look up a tool by canonical name or any form [`canonical`] accepts.
    pub fn get(&self, name: &str) -> Option<Arc<ToolEntry>> {
        let inner = self.read();
        let idx = inner
            .index
            .get(name)
            .or_else(|| inner.index.get(&canonical(name)))?;
        Some(Arc::clone(&inner.entries[*idx]))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Snapshot of all entries in registration order.
    pub fn entries(&self) -> Vec<Arc<ToolEntry>> {
        self.read().entries.clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.read()
            .entries
            .iter()
            .map(|e| e.name.to_string())
            .collect()
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.read()
            .entries
            .iter()
            .map(|e| ToolDescriptor {
                name: e.name.to_string(),
                description: e.description.clone(),
            })
            .collect()
    }

    /// Entries whose names match a user-facing pattern (see
    /// [`matcher::matches_tool`]).
    pub fn match_tools(&self, pattern: &str) -> Vec<Arc<ToolEntry>> {
        self.read()
            .entries
            .iter()
            .filter(|e| matcher::matches_tool(pattern, e.name.as_str()))
            .map(Arc::clone)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.write();
        inner.entries.clear();
        inner.index.clear();
    }

    /// Run a tool in-process through its handler.
    pub async fn dispatch(
        &self,
        name: &str,
        args: Map<String, Value>,
        ctx: &ToolContext,
    ) -> Result<CallToolResponse, BridgeError> {
        let entry = self.get(name).ok_or_else(|| BridgeError::unknown_tool(name))?;
        let request = CallToolRequest::new(entry.name.as_str(), args);
        ctx.run(entry.call(request, ctx.clone())).await
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, description: &str) -> ToolEntry {
        let reply = description.to_string();
        let handler: ToolHandler = Arc::new(
            move |_req: CallToolRequest,
                  _ctx: ToolContext|
                  -> BoxFuture<'static, Result<CallToolResponse, BridgeError>> {
                let reply = reply.clone();
                Box::pin(async move { Ok(CallToolResponse::text(reply)) })
            },
        );
        ToolEntry::new(ToolName::from(name), description, SchemaNode::object(), handler)
    }

    fn reply_text(response: &CallToolResponse) -> Option<&str> {
        response.content.first().and_then(|c| c.text.as_deref())
    }

    #[tokio::test]
    async fn duplicate_names_keep_first() {
        let registry = ToolRegistry::new();
        let mut schema = SchemaNode::object();
        schema.description = Some("first schema".into());
        let first = ToolEntry { input_schema: schema.clone(), ..entry("a-x", "first") };
        let added = registry.add_entries([first, entry("a-x", "second"), entry("a-y", "y")]);
        assert_eq!(added, 2);
        assert_eq!(registry.len(), 2);
        assert!(!registry.register(entry("a-y", "again")));

        let kept = registry.get("a-x").unwrap();
        assert_eq!(kept.description, "first");
        assert_eq!(kept.input_schema, schema);
        let response = kept
            .call(CallToolRequest::new("a-x", Map::new()), ToolContext::new())
            .await
            .unwrap();
        assert_eq!(reply_text(&response), Some("first"));

        let other = registry.get("a-y").unwrap();
        let response = other
            .call(CallToolRequest::new("a-y", Map::new()), ToolContext::new())
            .await
            .unwrap();
        assert_eq!(reply_text(&response), Some("y"));
    }

    #[tokio::test]
    async fn concurrent_registration_keeps_one_entry_per_name() {
        const WRITERS: usize = 8;
        const NAMES: usize = 16;
        let registry = Arc::new(ToolRegistry::new());

        let added: usize = std::thread::scope(|scope| {
            let readers: Vec<_> = (0..WRITERS)
                .map(|_| {
                    let registry = Arc::clone(&registry);
                    scope.spawn(move || {
                        for i in 0..NAMES {
                            if let Some(found) = registry.get(&format!("a-t{i}")) {
                                assert_eq!(found.name.as_str(), format!("a-t{i}"));
                            }
                        }
                    })
                })
                .collect();
            let writers: Vec<_> = (0..WRITERS)
                .map(|w| {
                    let registry = Arc::clone(&registry);
                    scope.spawn(move || {
                        let batch: Vec<_> = (0..NAMES)
                            .map(|i| entry(&format!("a-t{i}"), &format!("writer{w}")))
                            .collect();
                        registry.add_entries(batch)
                    })
                })
                .collect();
            for reader in readers {
                reader.join().unwrap();
            }
            writers.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(added, NAMES);
        assert_eq!(registry.len(), NAMES);
        let mut names = registry.names();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), NAMES);

        // Each name answers with the handler of the writer that registered it.
        for i in 0..NAMES {
            let name = format!("a-t{i}");
            let kept = registry.get(&name).unwrap();
            let response = kept
                .call(CallToolRequest::new(name.as_str(), Map::new()), ToolContext::new())
                .await
                .unwrap();
            assert_eq!(reply_text(&response), Some(kept.description.as_str()));
            assert!(kept.description.starts_with("writer"));
        }
    }

    #[test]
    fn names_keep_registration_order() {
        let registry = ToolRegistry::new();
        registry.add_entries([entry("b-two", ""), entry("a-one", "")]);
        assert_eq!(registry.names(), vec!["b-two", "a-one"]);
    }

    #[test]
    fn get_accepts_hierarchical_forms() {
        let registry = ToolRegistry::new();
        registry.register(entry("system_exec-run", "run"));
        assert!(registry.get("system/exec.run").is_some());
        assert!(registry.get("system/exec/run").is_some());
        assert!(registry.get("system/exec.stop").is_none());
    }

    #[test]
    fn match_tools_by_prefix_and_wildcard() {
        let registry = ToolRegistry::new();
        registry.add_entries([
            entry("system-run", ""),
            entry("system_exec-run", ""),
            entry("other-run", ""),
        ]);
        assert_eq!(registry.match_tools("*").len(), 3);
        let names: Vec<_> = registry
            .match_tools("system/")
            .iter()
            .map(|e| e.name.to_string())
            .collect();
        assert_eq!(names, vec!["system-run"]);
        assert_eq!(registry.match_tools("system/exec/").len(), 1);
        assert_eq!(registry.match_tools("other/run").len(), 0);
        assert_eq!(registry.match_tools("other-run").len(), 1);
    }

    #[tokio::test]
    async fn dispatch_runs_handler() {
        let registry = ToolRegistry::new();
        registry.register(entry("a-x", "hello"));
        let response = registry
            .dispatch("a-x", Map::new(), &ToolContext::new())
            .await
            .unwrap();
        assert_eq!(response.content[0].text.as_deref(), Some("hello"));

        let err = registry
            .dispatch("a-missing", Map::new(), &ToolContext::new())
            .await
            .unwrap_err();
        assert_eq!(err, BridgeError::UnknownTool("a-missing".into()));
    }

    #[test]
    fn clear_removes_everything() {
        let registry = ToolRegistry::new();
        registry.register(entry("a-x", ""));
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.get("a-x").is_none());
    }
}
