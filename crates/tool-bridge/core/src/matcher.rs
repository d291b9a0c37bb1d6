//! Tool name pattern matching.

use crate::name::{HIERARCHY_SEPARATOR, METHOD_SEPARATOR, PATH_SEPARATOR};

/// Report whether `name` satisfies `pattern`.
///
/// - `""` or `"*"` matches everything.
/// - A pattern ending in `/`, `_` or `-` is a prefix; the separator is kept so
///   that `sys/` does not match `system/exec`.
/// - Anything else must equal the full name.
pub fn matches(pattern: &str, name: &str) -> bool {
    if pattern.is_empty() || pattern == "*" {
        return true;
    }
    if pattern.ends_with([HIERARCHY_SEPARATOR, PATH_SEPARATOR, METHOD_SEPARATOR]) {
        return name.starts_with(pattern);
    }
    name == pattern
}

/// Normalize a user-facing tool pattern to canonical tool-name form.
///
/// `system/` becomes the service prefix `system-`, `system/exec/` becomes
/// `system_exec-`, and exact names have their slashes flattened.
pub fn normalize_tool_pattern(pattern: &str) -> String {
    let norm = pattern.replace(HIERARCHY_SEPARATOR, "_");
    if pattern.ends_with(HIERARCHY_SEPARATOR) {
        let trimmed = norm.strip_suffix(PATH_SEPARATOR).unwrap_or(&norm);
        return format!("{trimmed}{METHOD_SEPARATOR}");
    }
    norm
}

/// Match a user-facing pattern against a canonical tool name.
pub fn matches_tool(pattern: &str, tool_name: &str) -> bool {
    matches(&normalize_tool_pattern(pattern), tool_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_and_empty_match_everything() {
        assert!(matches("*", "system/exec"));
        assert!(matches("", "anything"));
    }

    #[test]
    fn prefix_keeps_boundary() {
        assert!(matches("system/", "system/exec"));
        assert!(!matches("sys/", "system/exec"));
        assert!(matches("system_", "system_exec"));
    }

    #[test]
    fn exact_match_otherwise() {
        assert!(matches("system/exec", "system/exec"));
        assert!(!matches("system/exec", "system/exec2"));
    }

    #[test]
    fn tool_patterns_are_normalized() {
        assert_eq!(normalize_tool_pattern("system/"), "system-");
        assert_eq!(normalize_tool_pattern("system/exec/"), "system_exec-");
        assert_eq!(normalize_tool_pattern("system/exec-run"), "system_exec-run");
        assert!(matches_tool("system/", "system-run"));
        assert!(matches_tool("system/exec/", "system_exec-run"));
        assert!(!matches_tool("system/", "system_exec-run"));
    }
}
