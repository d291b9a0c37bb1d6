//! Bridge configuration.
//!
//! Loading:
//! 1. Start from defaults
//! 2. Overlay the JSON config file, if it exists
//! 3. Apply env var overrides (highest precedence)

use crate::builder::{DEFAULT_COMPLEX_GROUP, RegistryBuilder};
use crate::context::ToolContext;
use crate::descriptor::{DEFAULT_MAX_DEPTH, SchemaCompiler, SchemaSerializer};
use crate::types::TypeRegistry;
use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Env var overriding [`BridgeConfig::invoke_timeout_secs`].
pub const ENV_INVOKE_TIMEOUT: &str = "TOOL_BRIDGE_INVOKE_TIMEOUT_SECS";

/// Env var overriding [`BridgeConfig::dedup_types`].
pub const ENV_DEDUP_TYPES: &str = "TOOL_BRIDGE_DEDUP_TYPES";

/// Env var overriding [`BridgeConfig::complex_groups`] (comma-separated).
pub const ENV_COMPLEX_GROUPS: &str = "TOOL_BRIDGE_COMPLEX_GROUPS";

/// Default invocation timeout: 15 minutes.
pub const DEFAULT_INVOKE_TIMEOUT_SECS: u64 = 900;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BridgeConfig {
    /// Upper bound on a single tool invocation, in seconds. 0 disables it.
    pub invoke_timeout_secs: u64,

    /// Share structurally identical synthesized types.
    pub dedup_types: bool,

    /// Tool groups advertised with an input schema only.
    pub complex_groups: Vec<String>,

    /// Deepest descriptor the schema serializer accepts.
    pub max_schema_depth: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            invoke_timeout_secs: DEFAULT_INVOKE_TIMEOUT_SECS,
            dedup_types: false,
            complex_groups: vec![DEFAULT_COMPLEX_GROUP.to_string()],
            max_schema_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl BridgeConfig {
    /// Load from `path` (defaults when missing), then apply env overrides.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = read_json_object_or_empty(path)?;
        let mut cfg: Self = serde_json::from_value(raw)
            .with_context(|| format!("Failed to deserialize bridge config {}", path.display()))?;
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    /// Defaults plus env overrides.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(v) = env_trimmed(ENV_INVOKE_TIMEOUT) {
            self.invoke_timeout_secs = v
                .parse()
                .with_context(|| format!("{ENV_INVOKE_TIMEOUT} must be a whole number of seconds"))?;
        }
        if let Some(v) = env_trimmed(ENV_DEDUP_TYPES) {
            self.dedup_types = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(v) = env_trimmed(ENV_COMPLEX_GROUPS) {
            self.complex_groups = v
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string)
                .collect();
        }
        Ok(())
    }

    /// Invocation timeout, `None` when disabled.
    pub fn invoke_timeout(&self) -> Option<Duration> {
        (self.invoke_timeout_secs > 0).then(|| Duration::from_secs(self.invoke_timeout_secs))
    }

    /// Context carrying the invocation timeout.
    pub fn context(&self) -> ToolContext {
        match self.invoke_timeout() {
            Some(timeout) => ToolContext::with_timeout(timeout),
            None => ToolContext::new(),
        }
    }

    /// Compiler with a fresh type registry.
    pub fn compiler(&self) -> SchemaCompiler {
        SchemaCompiler::with_registry(Arc::new(TypeRegistry::with_dedup(self.dedup_types)))
    }

    pub fn serializer(&self) -> SchemaSerializer {
        SchemaSerializer::new(self.max_schema_depth)
    }

    pub fn registry_builder(&self) -> RegistryBuilder {
        RegistryBuilder::new(self.serializer()).with_complex_groups(self.complex_groups.iter().cloned())
    }
}

fn env_trimmed(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_json_object_or_empty(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(Value::Object(Default::default()));
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let v: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid JSON in {}", path.display()))?;

    match v {
        Value::Object(_) => Ok(v),
        _ => anyhow::bail!("Config root must be a JSON object: {}", path.display()),
    }
}
