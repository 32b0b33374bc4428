//! Free-text JSON fields.
//!
//! Operators type JSON into plain text boxes (custom sections, component content and
//! props, setting values). Text that does not parse is never an error: it is simply
//! not applied, and the last value that did parse stays in force.

use serde_json::Value;

/// Parses `text`, returning `None` for anything that is not valid JSON.
pub fn parse_lenient(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Setting values are "JSON or plain string": valid JSON is stored as-is, anything
/// else is stored as a JSON string holding the raw text.
pub fn parse_or_string(text: &str) -> Value {
    parse_lenient(text).unwrap_or_else(|| Value::String(text.to_string()))
}

/// Renders a value the way the text boxes show it.
pub fn to_editable_text(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// A text box bound to a JSON value.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonField {
    text: String,
    value: Value,
}

impl JsonField {
    pub fn new(value: Value) -> Self {
        Self {
            text: to_editable_text(&value),
            value,
        }
    }

    /// Records what the operator typed. Returns true when the text parsed and became
    /// the field's value.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        self.text = text.into();
        match parse_lenient(&self.text) {
            Some(value) => {
                self.value = value;
                true
            }
            None => false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The last successfully parsed value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl Default for JsonField {
    fn default() -> Self {
        Self::new(Value::Object(serde_json::Map::new()))
    }
}
