//! Values of synthesized types.
//!
//! [`TypeDescriptor::decode`] reads JSON into a [`DynamicValue`] shaped by
//! the descriptor; [`DynamicValue::to_json`] writes it back. Absent optional
//! fields are omitted on output.

use crate::descriptor::{ObjectType, TimeFormat, TypeDescriptor};
use crate::error::BridgeError;
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use serde_json::{Map, Number, Value};
use std::sync::Arc;

/// A value conforming to some [`TypeDescriptor`].
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Null,
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
    Any(Value),
    Array(Vec<DynamicValue>),
    Object(Record),
}

/// Instance of an [`ObjectType`]: one optional slot per field.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    ty: Arc<ObjectType>,
    values: Vec<Option<DynamicValue>>,
}

impl Record {
    /// Record with every field absent.
    pub fn empty(ty: Arc<ObjectType>) -> Self {
        let values = vec![None; ty.len()];
        Self { ty, values }
    }

    pub fn object_type(&self) -> &Arc<ObjectType> {
        &self.ty
    }

    /// Value of the field with this property name.
    pub fn get(&self, name: &str) -> Option<&DynamicValue> {
        let idx = self.ty.fields().iter().position(|f| f.name == name)?;
        self.values[idx].as_ref()
    }

    /// Value of the field with this title-cased identifier.
    pub fn get_by_ident(&self, ident: &str) -> Option<&DynamicValue> {
        let idx = self.ty.fields().iter().position(|f| f.ident == ident)?;
        self.values[idx].as_ref()
    }

    /// Set a field by property name. Returns false for unknown names.
    pub fn set(&mut self, name: &str, value: DynamicValue) -> bool {
        match self.ty.fields().iter().position(|f| f.name == name) {
            Some(idx) => {
                self.values[idx] = Some(value);
                true
            }
            None => false,
        }
    }

    /// Present fields in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DynamicValue)> {
        self.ty
            .fields()
            .iter()
            .zip(&self.values)
            .filter_map(|(f, v)| v.as_ref().map(|v| (f.name.as_str(), v)))
    }
}

impl TypeDescriptor {
    /// Decode JSON into a value of this type.
    ///
    /// Object keys match field names exactly, then case-insensitively;
    /// unknown keys are ignored and missing or `null` fields stay absent.
    pub fn decode(&self, value: &Value) -> Result<DynamicValue, BridgeError> {
        if value.is_null() {
            return Ok(DynamicValue::Null);
        }
        match (self, value) {
            (Self::Annotated(inner, _), v) => inner.decode(v),
            (Self::Any, v) => Ok(DynamicValue::Any(v.clone())),
            (Self::Text, Value::String(s)) => Ok(DynamicValue::Text(s.clone())),
            (Self::Integer, Value::Number(n)) => n
                .as_i64()
                .map(DynamicValue::Integer)
                .ok_or_else(|| BridgeError::decode(format!("{n} is not a 64-bit integer"))),
            (Self::Number, Value::Number(n)) => n
                .as_f64()
                .map(DynamicValue::Number)
                .ok_or_else(|| BridgeError::decode(format!("{n} is not a number"))),
            (Self::Boolean, Value::Bool(b)) => Ok(DynamicValue::Boolean(*b)),
            (Self::Timestamp(format), Value::String(s)) => parse_time(*format, s),
            (Self::Array(inner), Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    inner
                        .decode(item)
                        .map_err(|e| BridgeError::decode(format!("[{i}]: {}", message(&e))))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(DynamicValue::Array),
            (Self::Object(ty), Value::Object(map)) => decode_record(ty, map).map(DynamicValue::Object),
            (expected, found) => Err(BridgeError::decode(format!(
                "expected {}, found {}",
                expected.kind_name(),
                json_kind(found)
            ))),
        }
    }
}

fn decode_record(ty: &Arc<ObjectType>, map: &Map<String, Value>) -> Result<Record, BridgeError> {
    let mut record = Record::empty(Arc::clone(ty));
    for (key, raw) in map {
        let Some(idx) = ty.position(key) else {
            continue;
        };
        if raw.is_null() {
            continue;
        }
        let field = &ty.fields()[idx];
        let value = field
            .ty
            .decode(raw)
            .map_err(|e| BridgeError::decode(format!("field {:?}: {}", field.name, message(&e))))?;
        record.values[idx] = Some(value);
    }
    Ok(record)
}

fn parse_time(format: TimeFormat, raw: &str) -> Result<DynamicValue, BridgeError> {
    match format {
        TimeFormat::DateTime => DateTime::parse_from_rfc3339(raw)
            .map(DynamicValue::DateTime)
            .map_err(|e| BridgeError::decode(format!("invalid date-time {raw:?}: {e}"))),
        TimeFormat::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
            .map(DynamicValue::Date)
            .map_err(|e| BridgeError::decode(format!("invalid date {raw:?}: {e}"))),
    }
}

impl DynamicValue {
    /// Encode back to JSON.
    ///
    /// Integral numbers are written without a fractional part; UTC
    /// timestamps use the `Z` suffix.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(s) => Value::String(s.clone()),
            Self::Integer(i) => Value::from(*i),
            Self::Number(f) => number(*f),
            Self::Boolean(b) => Value::Bool(*b),
            Self::DateTime(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            Self::Any(v) => v.clone(),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Object(record) => Value::Object(
                record
                    .iter()
                    .map(|(name, v)| (name.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Any(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Object(record) => Some(record),
            _ => None,
        }
    }
}

fn number(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
        return Value::from(f as i64);
    }
    Number::from_f64(f).map_or(Value::Null, Value::Number)
}

fn message(err: &BridgeError) -> String {
    match err {
        BridgeError::Decode(msg) => msg.clone(),
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
