//! Canonical tool names.
//!
//! A canonical name is `<group path with "/" replaced by "_">-<method>`, e.g.
//! `system_exec-execute` for the hierarchical pair `system/exec` + `execute`.
//! Parsing is best effort: input that cannot be split is echoed back
//! unchanged, so callers must treat an unchanged echo as "could not
//! canonicalize" rather than success.

use std::fmt;

/// Separator between the group and the method in canonical form.
pub const METHOD_SEPARATOR: char = '-';

/// Separator between group path segments in canonical form.
pub const PATH_SEPARATOR: char = '_';

/// Separator between group path segments in hierarchical form.
pub const HIERARCHY_SEPARATOR: char = '/';

/// Convert a user-facing tool name into canonical form.
///
/// Supported inputs, highest precedence first:
/// 1. canonical form itself (`system_exec-execute`), returned unchanged
/// 2. `system/exec.execute`, split at the last dot
/// 3. `system/exec-execute`, split at the last dash when a slash is present
/// 4. `system/exec/execute`, split at the last slash
///
/// Anything else is returned unchanged.
pub fn canonical(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    if raw.contains(METHOD_SEPARATOR) && !raw.contains(['/', '.']) {
        return raw.to_string();
    }

    let split = if let Some(idx) = raw.rfind('.') {
        Some(idx)
    } else if raw.contains(HIERARCHY_SEPARATOR) {
        raw.rfind(METHOD_SEPARATOR)
            .or_else(|| raw.rfind(HIERARCHY_SEPARATOR))
    } else {
        None
    };

    let Some(idx) = split else {
        return raw.to_string();
    };

    // All separators are single-byte ASCII, so idx + 1 is a char boundary.
    let (service, method) = (&raw[..idx], &raw[idx + 1..]);
    format!(
        "{}{}{}",
        service.replace(HIERARCHY_SEPARATOR, "_"),
        METHOD_SEPARATOR,
        method
    )
}

/// A tool name in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToolName(String);

impl ToolName {
    /// Build a canonical name from a hierarchical group and a method.
    pub fn new(service: &str, method: &str) -> Self {
        Self(format!(
            "{}{}{}",
            service.replace(HIERARCHY_SEPARATOR, "_"),
            METHOD_SEPARATOR,
            method
        ))
    }

    /// Canonicalize a raw user-facing name (see [`canonical`]).
    pub fn parse(raw: &str) -> Self {
        Self(canonical(raw))
    }

    /// Group path in hierarchical form.
    ///
    /// Without a method separator the whole name is returned.
    pub fn service(&self) -> String {
        match self.0.rfind(METHOD_SEPARATOR) {
            Some(idx) => self.0[..idx].replace(PATH_SEPARATOR, "/"),
            None => self.0.clone(),
        }
    }

    /// Bare method name. Empty without a method separator.
    pub fn method(&self) -> &str {
        match self.0.rfind(METHOD_SEPARATOR) {
            Some(idx) => &self.0[idx + 1..],
            None => "",
        }
    }

    /// Name with every hierarchy separator flattened.
    pub fn tool_name(&self) -> String {
        self.0.replace(HIERARCHY_SEPARATOR, "_")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToolName {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for ToolName {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl AsRef<str> for ToolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
