//! Generic value coercion between serde types.

use crate::descriptor::TypeDescriptor;
use crate::error::BridgeError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::any::Any;

/// Move `input` into `out`, converting through JSON when the types differ.
///
/// - `out == None` is an error.
/// - `input == None` leaves `out` untouched.
/// - When `I` and `O` are the same type the value is moved directly.
pub fn convert<I, O>(input: Option<I>, out: Option<&mut O>) -> Result<(), BridgeError>
where
    I: Serialize + 'static,
    O: DeserializeOwned + 'static,
{
    let Some(out) = out else {
        return Err(BridgeError::coercion("target must be present"));
    };
    let Some(input) = input else {
        return Ok(());
    };

    *out = coerce(input)?;
    Ok(())
}

/// Convert `input` into a fresh `O`.
pub fn coerce<I, O>(input: I) -> Result<O, BridgeError>
where
    I: Serialize + 'static,
    O: DeserializeOwned + 'static,
{
    let boxed: Box<dyn Any> = Box::new(input);
    match boxed.downcast::<O>() {
        Ok(same) => Ok(*same),
        Err(boxed) => {
            let input = boxed
                .downcast::<I>()
                .map_err(|_| BridgeError::coercion("input lost its type during conversion"))?;
            let value = serde_json::to_value(&*input).map_err(BridgeError::coercion)?;
            serde_json::from_value(value).map_err(BridgeError::coercion)
        }
    }
}

/// Convert arbitrary arguments into a JSON object map.
///
/// `null` yields an empty map; anything else that is not an object fails.
pub fn to_map<I>(input: I) -> Result<Map<String, Value>, BridgeError>
where
    I: Serialize + 'static,
{
    match coerce::<I, Value>(input)? {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(BridgeError::coercion(format!(
            "arguments must be an object, found {}",
            kind(&other)
        ))),
    }
}

/// Nudge a JSON value toward the shape of `ty`.
///
/// Numeric strings become numbers, `"true"`/`"false"` become booleans,
/// scalars become strings for text fields, a lone value for an array field is
/// wrapped, and object keys unknown to a typed object are dropped. Values
/// that cannot be nudged are returned unchanged. Objects without declared
/// fields pass through.
pub fn conform(value: Value, ty: &TypeDescriptor) -> Value {
    match (ty, value) {
        (_, Value::Null) => Value::Null,
        (TypeDescriptor::Annotated(inner, _), v) => conform(v, inner),
        (TypeDescriptor::Any | TypeDescriptor::Timestamp(_), v) => v,
        (TypeDescriptor::Text, Value::Number(n)) => Value::String(n.to_string()),
        (TypeDescriptor::Text, Value::Bool(b)) => Value::String(b.to_string()),
        (TypeDescriptor::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Value::from(i),
            Err(_) => Value::String(s),
        },
        (TypeDescriptor::Integer, Value::Number(n)) => match n.as_f64() {
            Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 => integral(f).unwrap_or(Value::Number(n)),
            _ => Value::Number(n),
        },
        (TypeDescriptor::Number, Value::String(s)) => {
            match s.trim().parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                Some(n) => Value::Number(n),
                None => Value::String(s),
            }
        }
        (TypeDescriptor::Boolean, Value::String(s)) => {
            if s.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if s.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                Value::String(s)
            }
        }
        (TypeDescriptor::Array(inner), Value::Array(items)) => {
            Value::Array(items.into_iter().map(|v| conform(v, inner)).collect())
        }
        (TypeDescriptor::Array(inner), scalar) if !scalar.is_object() || inner.is_object() => {
            Value::Array(vec![conform(scalar, inner)])
        }
        (TypeDescriptor::Object(obj), Value::Object(map)) if !obj.is_empty() => {
            let mut out = Map::new();
            for (key, v) in map {
                if let Some(idx) = obj.position(&key) {
                    let field = &obj.fields()[idx];
                    out.insert(field.name.clone(), conform(v, &field.ty));
                }
            }
            Value::Object(out)
        }
        (_, v) => v,
    }
}

fn integral(f: f64) -> Option<Value> {
    (f.abs() < 9_007_199_254_740_992.0).then(|| Value::from(f as i64))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
