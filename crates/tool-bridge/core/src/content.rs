//! Classification and decoding of tool response content.
//!
//! A response carries a list of heterogeneous [`ContentElement`]s.
//! [`classify`] sorts them into [`ResultBuckets`] by payload format and
//! [`decode`] picks the best bucket for the shape the caller asked for.

use crate::error::BridgeError;
use crate::protocol::CallToolResponse;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared variant of a content element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContentKind {
    Text,
    /// Raw data; `jsondata` is accepted as a legacy spelling.
    Data,
    Resource,
    /// No `type` given.
    #[default]
    Unspecified,
    Other(String),
}

impl ContentKind {
    pub fn is_unspecified(&self) -> bool {
        matches!(self, Self::Unspecified)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Data => "data",
            Self::Resource => "resource",
            Self::Unspecified => "",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ContentKind {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "data" | "jsondata" => Self::Data,
            "resource" => Self::Resource,
            "" => Self::Unspecified,
            _ => Self::Other(raw),
        }
    }
}

impl From<ContentKind> for String {
    fn from(kind: ContentKind) -> Self {
        kind.as_str().to_string()
    }
}

/// One element of a response's `content` list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentElement {
    #[serde(rename = "type", default, skip_serializing_if = "ContentKind::is_unspecified")]
    pub kind: ContentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
}

impl ContentElement {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Text,
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn data(mime_type: &str, data: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Data,
            mime_type: Some(mime_type.to_string()),
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// Inline image; `data` is base64.
    pub fn image(mime_type: &str, data: impl Into<String>) -> Self {
        Self {
            kind: ContentKind::Other("image".to_string()),
            mime_type: Some(mime_type.to_string()),
            data: Some(data.into()),
            ..Self::default()
        }
    }

    fn mime(&self) -> String {
        self.mime_type.as_deref().unwrap_or_default().to_ascii_lowercase()
    }
}

/// Response content grouped by payload format, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultBuckets {
    pub json: Vec<String>,
    pub xml: Vec<String>,
    pub csv: Vec<String>,
    pub text: Vec<String>,
    pub images_base64: Vec<String>,
    pub others: Vec<ContentElement>,
}

impl ResultBuckets {
    pub fn is_empty(&self) -> bool {
        self.json.is_empty()
            && self.xml.is_empty()
            && self.csv.is_empty()
            && self.text.is_empty()
            && self.images_base64.is_empty()
            && self.others.is_empty()
    }
}

/// Sort content elements into buckets.
///
/// An `image/*` MIME type wins over the declared kind: with data the element
/// is an image, without it the element goes to `others`. Data elements route
/// by MIME type, defaulting to JSON.
pub fn classify(content: &[ContentElement]) -> ResultBuckets {
    let mut buckets = ResultBuckets::default();
    for element in content {
        let mime = element.mime();
        if mime.starts_with("image/") {
            match element.data.as_ref().filter(|d| !d.is_empty()) {
                Some(data) => buckets.images_base64.push(data.clone()),
                None => buckets.others.push(element.clone()),
            }
            continue;
        }
        match &element.kind {
            ContentKind::Unspecified => {
                if let Some(data) = element.data.as_ref().filter(|d| !d.is_empty()) {
                    buckets.json.push(data.clone());
                } else if let Some(text) = &element.text {
                    buckets.text.push(text.clone());
                }
            }
            ContentKind::Data => {
                let payload = element
                    .data
                    .clone()
                    .or_else(|| element.text.clone())
                    .unwrap_or_default();
                match mime.as_str() {
                    "application/xml" | "text/xml" => buckets.xml.push(payload),
                    "text/csv" => buckets.csv.push(payload),
                    _ => buckets.json.push(payload),
                }
            }
            ContentKind::Text => buckets
                .text
                .push(element.text.clone().unwrap_or_default()),
            ContentKind::Resource | ContentKind::Other(_) => buckets.others.push(element.clone()),
        }
    }
    buckets
}

/// Shape the caller wants a response decoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationShape {
    /// A string.
    Text,
    /// Raw bytes.
    Binary,
    /// Any JSON value, taken as is.
    Opaque,
    /// A JSON value destined for a typed structure.
    Structured,
}

/// A decoded response payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Text(String),
    Binary(Vec<u8>),
    Opaque(Value),
    Structured(Value),
}

impl Decoded {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// JSON view of the payload. Bytes become a base64 string.
    pub fn into_value(self) -> Value {
        match self {
            Self::Text(s) => Value::String(s),
            Self::Binary(bytes) => Value::String(STANDARD.encode(bytes)),
            Self::Opaque(v) | Self::Structured(v) => v,
        }
    }

    /// Deserialize the payload into `T`.
    pub fn into_typed<T: serde::de::DeserializeOwned>(self) -> Result<T, BridgeError> {
        serde_json::from_value(self.into_value()).map_err(BridgeError::decode)
    }
}

/// Decode classified content into the requested shape.
pub fn decode(buckets: &ResultBuckets, shape: DestinationShape) -> Result<Decoded, BridgeError> {
    match shape {
        DestinationShape::Text => Ok(Decoded::Text(decode_text(buckets))),
        DestinationShape::Binary => decode_binary(buckets).map(Decoded::Binary),
        DestinationShape::Opaque => decode_opaque(buckets).map(Decoded::Opaque),
        DestinationShape::Structured => decode_structured(buckets).map(Decoded::Structured),
    }
}

/// Decode a full response, preferring `structuredContent` when present.
pub fn decode_response(
    response: &CallToolResponse,
    shape: DestinationShape,
) -> Result<Decoded, BridgeError> {
    let Some(structured) = &response.structured_content else {
        return decode(&classify(&response.content), shape);
    };
    Ok(match shape {
        DestinationShape::Structured => Decoded::Structured(structured.clone()),
        DestinationShape::Opaque => Decoded::Opaque(structured.clone()),
        DestinationShape::Text => Decoded::Text(structured.to_string()),
        DestinationShape::Binary => Decoded::Binary(structured.to_string().into_bytes()),
    })
}

fn decode_text(buckets: &ResultBuckets) -> String {
    if !buckets.text.is_empty() {
        return buckets.text.concat();
    }
    if !buckets.json.is_empty() {
        return buckets.json.concat();
    }
    if let Some(image) = buckets.images_base64.first() {
        return image.clone();
    }
    if !buckets.xml.is_empty() {
        return buckets.xml.concat();
    }
    buckets.csv.concat()
}

fn decode_binary(buckets: &ResultBuckets) -> Result<Vec<u8>, BridgeError> {
    if let Some(image) = buckets.images_base64.first() {
        return STANDARD
            .decode(image)
            .map_err(|e| BridgeError::decode(format!("invalid base64 image data: {e}")));
    }
    buckets
        .json
        .first()
        .or_else(|| buckets.xml.first())
        .or_else(|| buckets.csv.first())
        .map(|payload| payload.as_bytes().to_vec())
        .ok_or_else(|| BridgeError::decode("no binary-compatible payload found"))
}

fn decode_opaque(buckets: &ResultBuckets) -> Result<Value, BridgeError> {
    if let Some(json) = buckets.json.first() {
        return serde_json::from_str(json)
            .map_err(|e| BridgeError::decode(format!("invalid JSON payload: {e}")));
    }
    if let Some(image) = buckets.images_base64.first() {
        return Ok(Value::String(image.clone()));
    }
    if !buckets.text.is_empty() {
        return Ok(Value::String(buckets.text.concat()));
    }
    serde_json::to_value(buckets).map_err(BridgeError::decode)
}

fn decode_structured(buckets: &ResultBuckets) -> Result<Value, BridgeError> {
    let payload = buckets
        .json
        .first()
        .or_else(|| buckets.text.first())
        .ok_or_else(|| BridgeError::decode("no structured payload found"))?;
    serde_json::from_str(payload)
        .map_err(|e| BridgeError::decode(format!("invalid JSON payload: {e}")))
}
