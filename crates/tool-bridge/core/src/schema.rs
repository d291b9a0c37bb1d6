//! JSON-Schema-like shape descriptions.
//!
//! [`SchemaNode`] covers the subset of JSON Schema the bridge consumes and
//! produces: `type`, `format`, `description`, `enum`, `properties`,
//! `required` and `items`. Parsing is lenient about the forms real servers
//! and schemars emit (type arrays, nullable `anyOf` branches, `$defs`
//! references) and strict about structure.

use crate::error::BridgeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Primitive kind of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl SchemaKind {
    /// Parse a JSON Schema `type` keyword. `null` and unknown names yield `None`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

/// Recursive description of a value's shape.
///
/// `kind == None` means "any value" and serializes without a `type` keyword.
/// `properties` and `required` are only populated for objects, `items` only
/// for arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaNode {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<SchemaKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaNode>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
}

impl SchemaNode {
    /// Node accepting any value.
    pub fn any() -> Self {
        Self::default()
    }

    /// Node of the given primitive kind.
    pub fn of(kind: SchemaKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    /// Object node with no properties.
    pub fn object() -> Self {
        Self::of(SchemaKind::Object)
    }

    /// Array node with the given element schema.
    pub fn array(items: SchemaNode) -> Self {
        Self {
            kind: Some(SchemaKind::Array),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    /// Add a property, marking it required when `required` is set.
    pub fn with_property(mut self, name: &str, node: SchemaNode, required: bool) -> Self {
        self.kind = Some(SchemaKind::Object);
        self.properties.insert(name.to_string(), node);
        if required && !self.required.iter().any(|r| r == name) {
            self.required.push(name.to_string());
        }
        self
    }

    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn is_object(&self) -> bool {
        self.kind == Some(SchemaKind::Object)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Parse a schema document.
    ///
    /// `$ref`s are resolved against the document's `$defs` (or legacy
    /// `definitions`). A reference cycle is reported as an error because the
    /// bridge's descriptors are finite trees.
    pub fn from_value(value: &Value) -> Result<Self, BridgeError> {
        let mut resolver = Resolver {
            root: value,
            active: Vec::new(),
        };
        resolver.node(value)
    }

    /// Serialize to a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }

    /// Serialize to a JSON object map, as MCP tool definitions carry schemas.
    pub fn to_object(&self) -> Map<String, Value> {
        match self.to_value() {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// Derive a schema from an example value.
    ///
    /// Object keys with non-null example values are marked required; strings
    /// in RFC 3339 form get the `date-time` format.
    pub fn infer_from_example(example: &Value) -> Self {
        match example {
            Value::Null => Self::any(),
            Value::Bool(_) => Self::of(SchemaKind::Boolean),
            Value::Number(n) if n.is_i64() || n.is_u64() => Self::of(SchemaKind::Integer),
            Value::Number(_) => Self::of(SchemaKind::Number),
            Value::String(s) => {
                let node = Self::of(SchemaKind::String);
                if chrono::DateTime::parse_from_rfc3339(s).is_ok() {
                    node.with_format("date-time")
                } else {
                    node
                }
            }
            Value::Array(items) => match items.first() {
                Some(first) => Self::array(Self::infer_from_example(first)),
                None => Self::of(SchemaKind::Array),
            },
            Value::Object(map) => {
                let mut node = Self::object();
                for (key, value) in map {
                    node = node.with_property(key, Self::infer_from_example(value), !value.is_null());
                }
                node.required.sort();
                node
            }
        }
    }
}

impl<'de> Deserialize<'de> for SchemaNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        SchemaNode::from_value(&value).map_err(serde::de::Error::custom)
    }
}

struct Resolver<'a> {
    root: &'a Value,
    active: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn node(&mut self, value: &'a Value) -> Result<SchemaNode, BridgeError> {
        let obj = match value {
            Value::Object(obj) => obj,
            // `true` is the JSON Schema spelling of "anything".
            Value::Bool(true) => return Ok(SchemaNode::any()),
            other => {
                return Err(BridgeError::schema(format!(
                    "expected a schema object, found {}",
                    json_kind(other)
                )));
            }
        };

        if let Some(Value::String(reference)) = obj.get("$ref") {
            let mut node = self.reference(reference)?;
            overlay_annotations(&mut node, obj);
            return Ok(node);
        }

        if let Some(branch) = single_branch(obj) {
            let mut node = self.node(branch)?;
            overlay_annotations(&mut node, obj);
            return Ok(node);
        }

        let mut node = SchemaNode {
            kind: parse_kind(obj.get("type")),
            format: string_field(obj, "format"),
            description: string_field(obj, "description"),
            enum_values: parse_enum(obj.get("enum")),
            ..SchemaNode::default()
        };

        match obj.get("properties") {
            None | Some(Value::Null) => {}
            Some(Value::Object(props)) => {
                for (name, prop) in props {
                    let child = self.node(prop).map_err(|e| {
                        BridgeError::schema(format!("property {name:?}: {}", strip_prefix(&e)))
                    })?;
                    node.properties.insert(name.clone(), child);
                }
            }
            Some(other) => {
                return Err(BridgeError::schema(format!(
                    "properties must be an object, found {}",
                    json_kind(other)
                )));
            }
        }

        match obj.get("required") {
            None | Some(Value::Null) => {}
            Some(Value::Array(names)) => {
                for name in names {
                    match name {
                        Value::String(s) => node.required.push(s.clone()),
                        other => {
                            return Err(BridgeError::schema(format!(
                                "required entries must be strings, found {}",
                                json_kind(other)
                            )));
                        }
                    }
                }
            }
            Some(other) => {
                return Err(BridgeError::schema(format!(
                    "required must be an array, found {}",
                    json_kind(other)
                )));
            }
        }

        match obj.get("items") {
            None | Some(Value::Null) => {}
            Some(items @ (Value::Object(_) | Value::Bool(true))) => {
                node.items = Some(Box::new(self.node(items)?));
            }
            Some(other) => {
                return Err(BridgeError::schema(format!(
                    "items must be a schema object, found {}",
                    json_kind(other)
                )));
            }
        }

        if node.kind.is_none() {
            if !node.properties.is_empty() {
                node.kind = Some(SchemaKind::Object);
            } else if node.items.is_some() {
                node.kind = Some(SchemaKind::Array);
            }
        }
        if node.kind != Some(SchemaKind::Object) {
            node.properties.clear();
            node.required.clear();
        }
        if node.kind != Some(SchemaKind::Array) {
            node.items = None;
        }
        Ok(node)
    }

    fn reference(&mut self, reference: &str) -> Result<SchemaNode, BridgeError> {
        let (section, name) = if let Some(name) = reference.strip_prefix("#/$defs/") {
            ("$defs", name)
        } else if let Some(name) = reference.strip_prefix("#/definitions/") {
            ("definitions", name)
        } else if reference == "#" {
            return Err(BridgeError::schema("recursive schema reference: #"));
        } else {
            return Err(BridgeError::schema(format!(
                "unsupported schema reference: {reference}"
            )));
        };

        if self.active.iter().any(|n| n == name) {
            return Err(BridgeError::schema(format!(
                "recursive schema reference: {reference}"
            )));
        }

        let root = self.root;
        let target = root
            .get(section)
            .and_then(|defs| defs.get(name))
            .ok_or_else(|| {
                BridgeError::schema(format!("unresolved schema reference: {reference}"))
            })?;

        self.active.push(name.to_string());
        let result = self.node(target);
        self.active.pop();
        result
    }
}

/// Collapse `anyOf`/`oneOf`/`allOf` with exactly one non-null branch.
fn single_branch(obj: &Map<String, Value>) -> Option<&Value> {
    for key in ["anyOf", "oneOf", "allOf"] {
        let Some(Value::Array(branches)) = obj.get(key) else {
            continue;
        };
        let mut non_null = branches.iter().filter(|b| !is_null_branch(b));
        if let (Some(only), None) = (non_null.next(), non_null.next()) {
            return Some(only);
        }
    }
    None
}

fn is_null_branch(branch: &Value) -> bool {
    branch.get("type").and_then(Value::as_str) == Some("null")
        || branch.get("const").is_some_and(Value::is_null)
}

fn overlay_annotations(node: &mut SchemaNode, obj: &Map<String, Value>) {
    if let Some(description) = string_field(obj, "description") {
        node.description = Some(description);
    }
}

fn parse_kind(raw: Option<&Value>) -> Option<SchemaKind> {
    match raw? {
        Value::String(s) => SchemaKind::from_keyword(s),
        Value::Array(kinds) => kinds
            .iter()
            .filter_map(Value::as_str)
            .find_map(SchemaKind::from_keyword),
        _ => None,
    }
}

fn parse_enum(raw: Option<&Value>) -> Option<Vec<String>> {
    let Value::Array(values) = raw? else {
        return None;
    };
    Some(
        values
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn strip_prefix(err: &BridgeError) -> String {
    match err {
        BridgeError::SchemaConversion(msg) => msg.clone(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Schemas for local Rust types
// ============================================================================

/// Schema generation for local Rust types via schemars.
///
/// Uses Draft 2020-12 with `AddNullable` and `RestrictFormats`, then
/// normalizes the result into a [`SchemaNode`]. Results are cached per type
/// on the current thread.
pub mod local {
    use super::SchemaNode;
    use crate::error::BridgeError;
    use schemars::JsonSchema;
    use schemars::generate::SchemaSettings;
    use schemars::transform::{AddNullable, RestrictFormats};
    use std::any::TypeId;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::sync::Arc;

    thread_local! {
        static CACHE: RefCell<HashMap<TypeId, Result<Arc<SchemaNode>, BridgeError>>> =
            RefCell::new(HashMap::new());
    }

    fn settings() -> SchemaSettings {
        SchemaSettings::draft2020_12()
            .with_transform(AddNullable::default())
            .with_transform(RestrictFormats::default())
    }

    /// Schema node describing `T`.
    ///
    /// Fails for recursive types, since their definitions reference themselves.
    pub fn node_for<T: JsonSchema + 'static>() -> Result<Arc<SchemaNode>, BridgeError> {
        CACHE.with(|cache| {
            if let Some(hit) = cache.borrow().get(&TypeId::of::<T>()) {
                return hit.clone();
            }
            let root = settings().into_generator().into_root_schema_for::<T>();
            let result = serde_json::to_value(&root)
                .map_err(BridgeError::schema)
                .and_then(|v| SchemaNode::from_value(&v))
                .map(Arc::new);
            cache
                .borrow_mut()
                .insert(TypeId::of::<T>(), result.clone());
            result
        })
    }
}
