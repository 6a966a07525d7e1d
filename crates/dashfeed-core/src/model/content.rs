// ── Content documents ──
//
// Parsed form of the payload carried by `message` feed events. The body
// is kept as opaque view components for whoever renders it.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Separator between title components.
const TITLE_SEPARATOR: &str = " / ";

/// Why a content payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("payload is not valid JSON: {0}")]
    Json(String),

    #[error("payload has no `content` object")]
    MissingContent,

    #[error("`{field}` must be {expected}")]
    UnexpectedShape {
        field: &'static str,
        expected: &'static str,
    },
}

/// An immutable content document, replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentDocument {
    title: String,
    body: Vec<Value>,
    valid: bool,
}

impl ContentDocument {
    /// Build a document; validity is derived from the view components.
    pub fn new(title: impl Into<String>, body: Vec<Value>) -> Self {
        let valid = body.iter().all(has_component_type);
        Self {
            title: title.into(),
            body,
            valid,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// View components, in display order.
    pub fn body(&self) -> &[Value] {
        &self.body
    }

    /// `false` when a view component lacks a `metadata.type`, meaning a
    /// renderer cannot dispatch on it.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Parse a raw `message` payload.
///
/// Pure and deterministic. Expected shape:
/// `{"content": {"title": [<text component>...], "viewComponents": [...]}}`
pub fn parse(raw: &str) -> Result<ContentDocument, ParseError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| ParseError::Json(e.to_string()))?;

    let content = value
        .get("content")
        .and_then(Value::as_object)
        .ok_or(ParseError::MissingContent)?;

    let title = match content.get("title") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(components)) => components
            .iter()
            .filter_map(|c| c.pointer("/config/value").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(TITLE_SEPARATOR),
        Some(_) => {
            return Err(ParseError::UnexpectedShape {
                field: "content.title",
                expected: "an array of text components",
            });
        }
    };

    let body = match content.get("viewComponents") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(components)) => components.clone(),
        Some(_) => {
            return Err(ParseError::UnexpectedShape {
                field: "content.viewComponents",
                expected: "an array",
            });
        }
    };

    Ok(ContentDocument::new(title, body))
}

fn has_component_type(component: &Value) -> bool {
    component
        .pointer("/metadata/type")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.is_empty())
}
