//! Wire types for the tool-invocation boundary.

use crate::content::ContentElement;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tool as advertised by a remote endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "empty_object_schema")]
    pub input_schema: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
}

fn empty_object_schema() -> Value {
    serde_json::json!({"type": "object"})
}

/// One page of a tool listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolPage {
    #[serde(default)]
    pub tools: Vec<RemoteTool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallToolRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl CallToolRequest {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResponse {
    #[serde(default)]
    pub content: Vec<ContentElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResponse {
    /// Successful response with one text element.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentElement::text(text)],
            ..Self::default()
        }
    }

    /// Successful response carrying a tool's output value.
    ///
    /// Strings are returned verbatim, other values as JSON text. Objects are
    /// also attached as structured content.
    pub fn from_output(output: Value) -> Self {
        let text = match &output {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self {
            content: vec![ContentElement::text(text)],
            structured_content: output.is_object().then_some(output),
            is_error: None,
        }
    }

    /// Failed response with the message as its only text element.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentElement::text(message)],
            structured_content: None,
            is_error: Some(true),
        }
    }

    pub fn is_error(&self) -> bool {
        self.is_error.unwrap_or(false)
    }

    /// Message describing a failed response.
    ///
    /// The first element's non-empty text if it has one, otherwise that
    /// element as JSON, or a fixed message when there is no content.
    pub fn error_message(&self) -> String {
        let Some(first) = self.content.first() else {
            return "tool returned error without content".to_string();
        };
        if let Some(text) = first.text.as_ref().filter(|t| !t.is_empty()) {
            return text.clone();
        }
        serde_json::to_string(first).unwrap_or_else(|_| format!("{first:?}"))
    }
}
