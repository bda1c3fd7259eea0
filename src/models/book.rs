use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A book entry as returned by the backend.
///
/// The record is passed through untouched; accessors only read. Personalized
/// entries may wrap the book as `{"book": {...}, "reason": "..."}`, so the
/// accessors look one level down as well.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Book(Map<String, Value>);

impl Book {
    /// Raw backend fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    fn field(&self, name: &str) -> Option<&Value> {
        self.0
            .get(name)
            .or_else(|| self.0.get("book")?.as_object()?.get(name))
    }

    pub fn id(&self) -> Option<u64> {
        self.field("id").and_then(Value::as_u64)
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title").and_then(Value::as_str)
    }

    /// Recommendation rationale, when the backend supplies one.
    pub fn reason(&self) -> Option<&str> {
        self.0.get("reason").and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for Book {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
