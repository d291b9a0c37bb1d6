//! Type descriptors and the schema compiler/serializer pair.
//!
//! A [`TypeDescriptor`] is the bridge's runtime stand-in for a concrete Rust
//! type: [`SchemaCompiler`] builds one from a [`SchemaNode`] and
//! [`SchemaSerializer`] turns one back into a schema.

use crate::error::BridgeError;
use crate::schema::{SchemaKind, SchemaNode, local};
use crate::types::TypeRegistry;
use schemars::JsonSchema;
use std::collections::HashSet;
use std::sync::Arc;

/// Default nesting limit for [`SchemaSerializer`].
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Textual encoding of a timestamp field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFormat {
    /// RFC 3339 date-time (`format: date-time`).
    DateTime,
    /// Calendar date `YYYY-MM-DD` (`format: date`).
    Date,
}

impl TimeFormat {
    pub fn from_format(format: &str) -> Option<Self> {
        match format {
            "date-time" => Some(Self::DateTime),
            "date" => Some(Self::Date),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateTime => "date-time",
            Self::Date => "date",
        }
    }
}

/// Runtime description of a value's type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Text,
    Integer,
    Number,
    Boolean,
    Timestamp(TimeFormat),
    /// Accepts any JSON value unchanged.
    Any,
    Array(Box<TypeDescriptor>),
    Object(Arc<ObjectType>),
    /// A descriptor with annotations from its schema.
    ///
    /// Object fields keep their own annotations; this wraps roots and
    /// array items.
    Annotated(Box<TypeDescriptor>, Annotations),
}

/// Schema annotations that leave the accepted shape unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    pub description: Option<String>,
    pub enum_values: Option<Vec<String>>,
}

impl Annotations {
    /// Annotations declared on `node`.
    pub fn of(node: &SchemaNode) -> Self {
        Self {
            description: node.description.clone(),
            enum_values: node.enum_values.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.enum_values.is_none()
    }

    fn apply(&self, node: &mut SchemaNode) {
        node.description.clone_from(&self.description);
        node.enum_values.clone_from(&self.enum_values);
    }
}

impl TypeDescriptor {
    /// Object descriptor with no fields.
    pub fn empty_object() -> Self {
        Self::Object(Arc::new(ObjectType::default()))
    }

    /// Attach `annotations`; empty annotations leave the descriptor as is.
    pub fn annotated(self, annotations: Annotations) -> Self {
        if annotations.is_empty() {
            return self;
        }
        match self {
            Self::Annotated(inner, _) => Self::Annotated(inner, annotations),
            other => Self::Annotated(Box::new(other), annotations),
        }
    }

    /// The descriptor with annotations stripped.
    pub fn base(&self) -> &Self {
        match self {
            Self::Annotated(inner, _) => inner.base(),
            other => other,
        }
    }

    pub fn annotations(&self) -> Option<&Annotations> {
        match self {
            Self::Annotated(_, annotations) => Some(annotations),
            _ => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.base(), Self::Object(_))
    }

    pub fn as_object(&self) -> Option<&ObjectType> {
        match self.base() {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Text => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Timestamp(_) => "timestamp",
            Self::Any => "any",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Annotated(inner, _) => inner.kind_name(),
        }
    }

    /// Nesting depth; scalars are depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Self::Array(inner) => 1 + inner.depth(),
            Self::Object(obj) => 1 + obj.fields.iter().map(|f| f.ty.depth()).max().unwrap_or(0),
            Self::Annotated(inner, _) => inner.depth(),
            _ => 1,
        }
    }

    /// Deterministic structural signature.
    ///
    /// Two descriptors with equal signatures accept and produce the same JSON.
    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    fn write_signature(&self, out: &mut String) {
        match self {
            Self::Text => out.push_str("string"),
            Self::Integer => out.push_str("integer"),
            Self::Number => out.push_str("number"),
            Self::Boolean => out.push_str("boolean"),
            Self::Timestamp(format) => {
                out.push_str("string:");
                out.push_str(format.as_str());
            }
            Self::Any => out.push_str("any"),
            Self::Array(inner) => {
                out.push('[');
                inner.write_signature(out);
                out.push(']');
            }
            Self::Object(obj) => obj.write_signature(out),
            Self::Annotated(inner, _) => inner.write_signature(out),
        }
    }
}

/// A synthesized record type.
///
/// Fields are ordered lexicographically by their source property name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectType {
    fields: Vec<Field>,
}

impl ObjectType {
    /// Build an object type, sorting fields by name.
    ///
    /// Fails when two fields share a name. Colliding identifiers are made
    /// unique in name order with a numeric suffix (`FooBar`, `FooBar_2`).
    pub fn new(mut fields: Vec<Field>) -> Result<Self, BridgeError> {
        fields.sort_by(|a, b| a.name.cmp(&b.name));
        for pair in fields.windows(2) {
            if pair[0].name == pair[1].name {
                return Err(BridgeError::schema(format!(
                    "duplicate property {:?}",
                    pair[0].name
                )));
            }
        }
        let mut taken: HashSet<String> = HashSet::with_capacity(fields.len());
        for field in &mut fields {
            if taken.contains(&field.ident) {
                let mut n = 2;
                while taken.contains(&format!("{}_{n}", field.ident)) {
                    n += 1;
                }
                field.ident = format!("{}_{n}", field.ident);
            }
            taken.insert(field.ident.clone());
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .binary_search_by(|f| f.name.as_str().cmp(name))
            .ok()
            .map(|idx| &self.fields[idx])
    }

    /// Position of the field matching `key`, exact name first, then
    /// case-insensitively against name or identifier.
    pub fn position(&self, key: &str) -> Option<usize> {
        if let Ok(idx) = self.fields.binary_search_by(|f| f.name.as_str().cmp(key)) {
            return Some(idx);
        }
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(key) || f.ident.eq_ignore_ascii_case(key))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn signature(&self) -> String {
        let mut out = String::new();
        self.write_signature(&mut out);
        out
    }

    fn write_signature(&self, out: &mut String) {
        out.push('{');
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            out.push_str(&format!("{:?}", field.name));
            if field.optional {
                out.push('?');
            }
            out.push(':');
            field.ty.write_signature(out);
        }
        out.push('}');
    }
}

/// One field of an [`ObjectType`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Source property name, used as the JSON key.
    pub name: String,
    /// Title-cased identifier derived from `name`.
    pub ident: String,
    pub ty: TypeDescriptor,
    /// Absent from the schema's `required` list; omitted when empty.
    pub optional: bool,
    pub description: Option<String>,
    pub enum_values: Option<Vec<String>>,
}

impl Field {
    pub fn required(name: &str, ty: TypeDescriptor) -> Self {
        Self {
            name: name.to_string(),
            ident: identifier(name),
            ty,
            optional: false,
            description: None,
            enum_values: None,
        }
    }

    pub fn optional(name: &str, ty: TypeDescriptor) -> Self {
        Self {
            optional: true,
            ..Self::required(name, ty)
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Title-case a property name into an identifier.
///
/// The first letter of every word is upper-cased; characters that cannot
/// appear in an identifier become `_`.
pub fn identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    let mut word_start = true;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
            word_start = false;
        } else {
            out.push('_');
            word_start = ch != '_';
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

// ============================================================================
// Compiler
// ============================================================================

/// Builds [`TypeDescriptor`]s from schemas.
///
/// Every synthesized object type is recorded in the compiler's registry.
#[derive(Debug, Clone, Default)]
pub struct SchemaCompiler {
    registry: Arc<TypeRegistry>,
}

impl SchemaCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Compile a parsed schema node.
    ///
    /// Missing or unrecognized kinds compile to [`TypeDescriptor::Any`], an
    /// array without `items` to an array of `Any`. A `description` or `enum`
    /// on the node wraps the result in [`TypeDescriptor::Annotated`].
    pub fn compile(&self, node: &SchemaNode) -> Result<TypeDescriptor, BridgeError> {
        Ok(self.shape(node)?.annotated(Annotations::of(node)))
    }

    fn shape(&self, node: &SchemaNode) -> Result<TypeDescriptor, BridgeError> {
        Ok(match node.kind {
            None => TypeDescriptor::Any,
            Some(SchemaKind::String) => match node.format.as_deref().and_then(TimeFormat::from_format) {
                Some(format) => TypeDescriptor::Timestamp(format),
                None => TypeDescriptor::Text,
            },
            Some(SchemaKind::Integer) => TypeDescriptor::Integer,
            Some(SchemaKind::Number) => TypeDescriptor::Number,
            Some(SchemaKind::Boolean) => TypeDescriptor::Boolean,
            Some(SchemaKind::Array) => {
                let items = match node.items.as_deref() {
                    Some(items) => self.compile(items)?,
                    None => TypeDescriptor::Any,
                };
                TypeDescriptor::Array(Box::new(items))
            }
            Some(SchemaKind::Object) => TypeDescriptor::Object(self.object(node)?),
        })
    }

    /// Parse a raw schema document and compile it.
    pub fn compile_value(&self, value: &serde_json::Value) -> Result<TypeDescriptor, BridgeError> {
        self.compile(&SchemaNode::from_value(value)?)
    }

    /// Compile a tool input or output schema, which is always an object.
    ///
    /// A schema without properties yields an empty object type whatever its
    /// declared kind.
    pub fn compile_object(&self, node: &SchemaNode) -> Result<TypeDescriptor, BridgeError> {
        if node.is_object() {
            return self.compile(node);
        }
        let empty = self.registry.register(ObjectType::default());
        Ok(TypeDescriptor::Object(empty))
    }

    /// Descriptor for a local Rust type, derived through its schemars schema.
    pub fn descriptor_for<T: JsonSchema + 'static>(&self) -> Result<TypeDescriptor, BridgeError> {
        let node = local::node_for::<T>()?;
        self.compile(&node)
    }

    fn object(&self, node: &SchemaNode) -> Result<Arc<ObjectType>, BridgeError> {
        let mut fields = Vec::with_capacity(node.properties.len());
        for (name, prop) in &node.properties {
            let ty = self.shape(prop).map_err(|e| match e {
                BridgeError::SchemaConversion(msg) => {
                    BridgeError::schema(format!("property {name:?}: {msg}"))
                }
                other => other,
            })?;
            fields.push(Field {
                name: name.clone(),
                ident: identifier(name),
                ty,
                optional: !node.is_required(name),
                description: prop.description.clone(),
                enum_values: prop.enum_values.clone(),
            });
        }
        let ty = ObjectType::new(fields)?;
        Ok(self.registry.register(ty))
    }
}

// ============================================================================
// Serializer
// ============================================================================

/// Turns [`TypeDescriptor`]s back into schemas.
#[derive(Debug, Clone, Copy)]
pub struct SchemaSerializer {
    max_depth: usize,
}

impl Default for SchemaSerializer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl SchemaSerializer {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Structural inverse of [`SchemaCompiler::compile`].
    pub fn serialize(&self, ty: &TypeDescriptor) -> Result<SchemaNode, BridgeError> {
        self.node(ty, 1)
    }

    /// Serialize an output schema, whose root must be an object.
    pub fn serialize_output(&self, ty: &TypeDescriptor) -> Result<SchemaNode, BridgeError> {
        if !ty.is_object() {
            return Err(BridgeError::schema(format!(
                "output schema root must be an object, found {}",
                ty.kind_name()
            )));
        }
        self.serialize(ty)
    }

    /// One-level input schema: field names, kinds and required flags only.
    ///
    /// Nested objects and arrays appear without their inner structure.
    /// Non-object descriptors yield a bare object schema.
    pub fn shallow(&self, ty: &TypeDescriptor) -> SchemaNode {
        let Some(obj) = ty.as_object() else {
            return SchemaNode::object();
        };
        let mut node = SchemaNode::object();
        for field in obj.fields() {
            let mut child = match field.ty.base() {
                TypeDescriptor::Object(_) => SchemaNode::object(),
                TypeDescriptor::Array(_) => SchemaNode::of(SchemaKind::Array),
                scalar => scalar_node(scalar),
            };
            child.description.clone_from(&field.description);
            child.enum_values.clone_from(&field.enum_values);
            node = node.with_property(&field.name, child, !field.optional);
        }
        node
    }

    /// Derive a schema from an example value.
    pub fn infer_from_example(&self, example: &serde_json::Value) -> SchemaNode {
        SchemaNode::infer_from_example(example)
    }

    fn node(&self, ty: &TypeDescriptor, depth: usize) -> Result<SchemaNode, BridgeError> {
        if depth > self.max_depth {
            return Err(BridgeError::schema(format!(
                "descriptor nesting exceeds maximum depth of {}",
                self.max_depth
            )));
        }
        match ty {
            TypeDescriptor::Annotated(inner, annotations) => {
                let mut node = self.node(inner, depth)?;
                annotations.apply(&mut node);
                Ok(node)
            }
            TypeDescriptor::Array(inner) => Ok(SchemaNode::array(self.node(inner, depth + 1)?)),
            TypeDescriptor::Object(obj) => {
                let mut node = SchemaNode::object();
                for field in obj.fields() {
                    let mut child = self.node(&field.ty, depth + 1)?;
                    child.description.clone_from(&field.description);
                    child.enum_values.clone_from(&field.enum_values);
                    node = node.with_property(&field.name, child, !field.optional);
                }
                Ok(node)
            }
            scalar => Ok(scalar_node(scalar)),
        }
    }
}

fn scalar_node(ty: &TypeDescriptor) -> SchemaNode {
    match ty {
        TypeDescriptor::Text => SchemaNode::of(SchemaKind::String),
        TypeDescriptor::Integer => SchemaNode::of(SchemaKind::Integer),
        TypeDescriptor::Number => SchemaNode::of(SchemaKind::Number),
        TypeDescriptor::Boolean => SchemaNode::of(SchemaKind::Boolean),
        TypeDescriptor::Timestamp(format) => {
            SchemaNode::of(SchemaKind::String).with_format(format.as_str())
        }
        TypeDescriptor::Array(_) => SchemaNode::of(SchemaKind::Array),
        TypeDescriptor::Object(_) => SchemaNode::object(),
        TypeDescriptor::Any => SchemaNode::any(),
        TypeDescriptor::Annotated(inner, _) => scalar_node(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn round_trip(raw: serde_json::Value) {
        let compiler = SchemaCompiler::new();
        let ty = compiler.compile_value(&raw).unwrap();
        let back = SchemaSerializer::default().serialize(&ty).unwrap();
        assert_eq!(back.to_value(), raw);
    }

    #[test]
    fn scalars_round_trip() {
        round_trip(json!({"type": "string"}));
        round_trip(json!({"type": "integer"}));
        round_trip(json!({"type": "number"}));
        round_trip(json!({"type": "boolean"}));
        round_trip(json!({"type": "string", "format": "date-time"}));
        round_trip(json!({"type": "string", "format": "date"}));
        round_trip(json!({}));
    }

    #[test]
    fn nested_objects_round_trip() {
        round_trip(json!({
            "type": "object",
            "properties": {
                "tags": {"type": "array", "items": {"type": "string"}},
                "user": {
                    "type": "object",
                    "description": "owner",
                    "properties": {
                        "id": {"type": "integer"},
                        "email": {"type": "string"}
                    },
                    "required": ["id"]
                }
            },
            "required": ["tags", "user"]
        }));
    }

    #[test]
    fn optionality_follows_required() {
        let ty = SchemaCompiler::new()
            .compile_value(&json!({
                "type": "object",
                "properties": {"a": {"type": "string"}, "b": {"type": "string"}},
                "required": ["b"]
            }))
            .unwrap();
        let obj = ty.as_object().unwrap();
        assert!(obj.field("a").unwrap().optional);
        assert!(!obj.field("b").unwrap().optional);
    }

    #[test]
    fn fields_sorted_and_title_cased() {
        let ty = SchemaCompiler::new()
            .compile_value(&json!({
                "properties": {"zeta": {"type": "string"}, "alpha_beta": {"type": "integer"}}
            }))
            .unwrap();
        let idents: Vec<_> = ty.as_object().unwrap().fields().iter().map(|f| f.ident.as_str()).collect();
        assert_eq!(idents, vec!["Alpha_beta", "Zeta"]);
    }

    #[test]
    fn identifier_handles_awkward_names() {
        assert_eq!(identifier("foo"), "Foo");
        assert_eq!(identifier("foo-bar"), "Foo_Bar");
        assert_eq!(identifier("user_id"), "User_id");
        assert_eq!(identifier("2fa"), "_2fa");
        assert_eq!(identifier(""), "_");
    }

    #[test]
    fn colliding_identifiers_get_suffixes() {
        let ty = SchemaCompiler::new()
            .compile_value(&json!({
                "properties": {
                    "fooBar": {"type": "string"},
                    "FooBar": {"type": "integer"},
                    "a-b": {"type": "string"},
                    "a.b": {"type": "string"}
                }
            }))
            .unwrap();
        let obj = ty.as_object().unwrap();
        assert_eq!(obj.field("FooBar").unwrap().ident, "FooBar");
        assert_eq!(obj.field("fooBar").unwrap().ident, "FooBar_2");
        assert_eq!(obj.field("a-b").unwrap().ident, "A_B");
        assert_eq!(obj.field("a.b").unwrap().ident, "A_B_2");

        // Decoding still goes by JSON key.
        let value = ty.decode(&json!({"fooBar": "x", "FooBar": 3})).unwrap();
        assert_eq!(value.to_json(), json!({"FooBar": 3, "fooBar": "x"}));
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let err = ObjectType::new(vec![
            Field::required("x", TypeDescriptor::Text),
            Field::optional("x", TypeDescriptor::Integer),
        ])
        .unwrap_err();
        assert!(matches!(err, BridgeError::SchemaConversion(_)));
    }

    #[test]
    fn item_annotations_round_trip() {
        round_trip(json!({"type": "array", "items": {"type": "string", "enum": ["a", "b"]}}));
        round_trip(json!({
            "type": "object",
            "properties": {
                "tags": {
                    "type": "array",
                    "description": "labels",
                    "items": {"type": "string", "enum": ["red", "blue"], "description": "one label"}
                }
            }
        }));
    }

    #[test]
    fn root_annotations_round_trip() {
        round_trip(json!({"type": "string", "enum": ["low", "high"], "description": "level"}));
        round_trip(json!({"type": "array", "description": "matrix", "items": {"type": "array", "items": {"type": "integer"}}}));

        let ty = SchemaCompiler::new()
            .compile_value(&json!({
                "type": "object",
                "description": "request",
                "properties": {"id": {"type": "integer"}}
            }))
            .unwrap();
        assert_eq!(ty.annotations().and_then(|a| a.description.as_deref()), Some("request"));
        assert!(ty.is_object());
        assert_eq!(ty.as_object().unwrap().field("id").unwrap().ty, TypeDescriptor::Integer);
        assert_eq!(ty.kind_name(), "object");
    }

    #[test]
    fn annotations_do_not_change_shape() {
        let compiler = SchemaCompiler::new();
        let plain = compiler.compile_value(&json!({"type": "array", "items": {"type": "string"}})).unwrap();
        let tagged = compiler
            .compile_value(&json!({"type": "array", "items": {"type": "string", "enum": ["a"]}}))
            .unwrap();
        assert_ne!(plain, tagged);
        assert_eq!(plain.signature(), tagged.signature());
        assert_eq!(
            tagged.decode(&json!(["a"])).unwrap().to_json(),
            json!(["a"])
        );
    }

    #[test]
    fn array_without_items_is_array_of_any() {
        let ty = SchemaCompiler::new().compile_value(&json!({"type": "array"})).unwrap();
        assert_eq!(ty, TypeDescriptor::Array(Box::new(TypeDescriptor::Any)));
    }

    #[test]
    fn compile_object_defaults_to_empty_struct() {
        let compiler = SchemaCompiler::new();
        let ty = compiler.compile_object(&SchemaNode::any()).unwrap();
        assert_eq!(ty.as_object().map(ObjectType::len), Some(0));
        assert_eq!(compiler.registry().len(), 1);
    }

    #[test]
    fn nested_types_are_registered() {
        let compiler = SchemaCompiler::new();
        compiler
            .compile_value(&json!({
                "properties": {"inner": {"properties": {"x": {"type": "integer"}}}}
            }))
            .unwrap();
        assert_eq!(compiler.registry().len(), 2);
    }

    #[test]
    fn serialize_output_requires_object_root() {
        let serializer = SchemaSerializer::default();
        assert!(serializer.serialize_output(&TypeDescriptor::Text).is_err());
        assert!(serializer.serialize_output(&TypeDescriptor::empty_object()).is_ok());
    }

    #[test]
    fn serializer_enforces_max_depth() {
        let mut ty = TypeDescriptor::Text;
        for _ in 0..4 {
            ty = TypeDescriptor::Array(Box::new(ty));
        }
        assert!(SchemaSerializer::new(4).serialize(&ty).is_err());
        assert!(SchemaSerializer::new(5).serialize(&ty).is_ok());
    }

    #[test]
    fn shallow_keeps_one_level() {
        let ty = SchemaCompiler::new()
            .compile_value(&json!({
                "properties": {
                    "when": {"type": "string", "format": "date-time"},
                    "inner": {"properties": {"x": {"type": "integer"}}},
                    "list": {"type": "array", "items": {"type": "string"}}
                },
                "required": ["when"]
            }))
            .unwrap();
        let node = SchemaSerializer::default().shallow(&ty);
        assert_eq!(
            node.to_value(),
            json!({
                "type": "object",
                "properties": {
                    "inner": {"type": "object"},
                    "list": {"type": "array"},
                    "when": {"type": "string", "format": "date-time"}
                },
                "required": ["when"]
            })
        );
    }

    #[test]
    fn signature_reflects_structure() {
        let compiler = SchemaCompiler::new();
        let a = compiler
            .compile_value(&json!({"properties": {"x": {"type": "integer"}}, "required": ["x"]}))
            .unwrap();
        let b = compiler
            .compile_value(&json!({"properties": {"x": {"type": "integer"}}}))
            .unwrap();
        assert_eq!(a.signature(), r#"{"x":integer}"#);
        assert_eq!(b.signature(), r#"{"x"?:integer}"#);
    }

    #[derive(schemars::JsonSchema)]
    #[expect(dead_code)]
    struct Args {
        path: String,
        recursive: Option<bool>,
    }

    #[test]
    fn descriptor_for_local_type() {
        let ty = SchemaCompiler::new().descriptor_for::<Args>().unwrap();
        let obj = ty.as_object().unwrap();
        assert_eq!(obj.field("path").unwrap().ty, TypeDescriptor::Text);
        assert!(obj.field("recursive").unwrap().optional);
        assert_eq!(obj.field("recursive").unwrap().ty, TypeDescriptor::Boolean);
    }
}
