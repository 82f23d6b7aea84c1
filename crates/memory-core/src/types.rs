//! # Core Types
//!
//! ## Namespace
//!
//! Hierarchical scope of a memory, e.g. `("memories", "user-42")`. Labels are non-empty
//! and must not contain `.` because the dotted form is used as the storage prefix.
//!
//! ## NamespaceTemplate
//!
//! A namespace whose labels may carry `{name}` placeholders, resolved per run from the
//! configurable values (e.g. `user_id`).
//!
//! ## Item / SearchItem
//!
//! A stored JSON document and its search result wrapper.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::MemoryError;

/// Default page size of [`SearchRequest`].
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Hierarchical memory scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(Vec<String>);

impl Namespace {
    /// Builds a namespace, validating every label.
    pub fn new<I, S>(labels: I) -> Result<Self, MemoryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(MemoryError::InvalidNamespace(
                "namespace must have at least one label".to_string(),
            ));
        }
        for label in &labels {
            if label.is_empty() {
                return Err(MemoryError::InvalidNamespace(format!(
                    "empty label in {:?}",
                    labels
                )));
            }
            if label.contains('.') {
                return Err(MemoryError::InvalidNamespace(format!(
                    "label {:?} must not contain '.'",
                    label
                )));
            }
        }
        Ok(Self(labels))
    }

    /// Parses the dotted storage form (`"a.b.c"`).
    pub fn from_dotted(s: &str) -> Result<Self, MemoryError> {
        Self::new(s.split('.'))
    }

    /// Returns the dotted storage form.
    pub fn dotted(&self) -> String {
        self.0.join(".")
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `self` starts with every label of `prefix`.
    pub fn starts_with(&self, prefix: &Namespace) -> bool {
        self.0.len() >= prefix.0.len() && self.0.iter().zip(prefix.0.iter()).all(|(a, b)| a == b)
    }

    /// Returns the namespace cut to at most `depth` labels.
    pub fn truncated(&self, depth: usize) -> Namespace {
        Namespace(self.0.iter().take(depth.max(1)).cloned().collect())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// Namespace with `{name}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceTemplate(Vec<String>);

impl NamespaceTemplate {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    /// Resolves every placeholder from `values`.
    pub fn resolve(&self, values: &HashMap<String, String>) -> Result<Namespace, MemoryError> {
        let mut labels = Vec::with_capacity(self.0.len());
        for label in &self.0 {
            labels.push(fill_placeholders(label, values)?);
        }
        Namespace::new(labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }
}

impl From<Namespace> for NamespaceTemplate {
    fn from(ns: Namespace) -> Self {
        Self(ns.0)
    }
}

fn fill_placeholders(label: &str, values: &HashMap<String, String>) -> Result<String, MemoryError> {
    let mut out = String::with_capacity(label.len());
    let mut rest = label;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| MemoryError::InvalidNamespace(format!("unclosed '{{' in {:?}", label)))?;
        let name = &after[..end];
        let value = values
            .get(name)
            .ok_or_else(|| MemoryError::UnresolvedPlaceholder(name.to_string()))?;
        out.push_str(value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// A stored memory document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub namespace: Namespace,
    pub key: String,
    pub value: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the display text of the memory: `value.content` (string or nested `content`),
    /// then `text`, then `message`, else the JSON of the whole value.
    pub fn content_text(&self) -> String {
        content_text(&self.value)
    }
}

/// Extracts readable text from a memory value.
pub fn content_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            for field in ["content", "text", "message"] {
                match map.get(field) {
                    Some(Value::String(s)) if !s.is_empty() => return s.clone(),
                    Some(inner @ Value::Object(_)) => return content_text(inner),
                    _ => {}
                }
            }
            value.to_string()
        }
        other => other.to_string(),
    }
}

/// Search hit; `score` is the cosine similarity when the query was embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
    #[serde(flatten)]
    pub item: Item,
    pub score: Option<f32>,
}

/// Parameters of [`crate::MemoryStore::search`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub namespace_prefix: Namespace,
    pub query: Option<String>,
    pub filter: Option<Map<String, Value>>,
    pub limit: usize,
    pub offset: usize,
}

impl SearchRequest {
    pub fn new(namespace_prefix: Namespace) -> Self {
        Self {
            namespace_prefix,
            query: None,
            filter: None,
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if query.trim().is_empty() { None } else { Some(query) };
        self
    }

    pub fn with_filter(mut self, filter: Map<String, Value>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn namespace_rejects_dots_and_empty_labels() {
        assert!(Namespace::new(["memories"]).is_ok());
        assert!(matches!(
            Namespace::new(["a.b"]),
            Err(MemoryError::InvalidNamespace(_))
        ));
        assert!(matches!(
            Namespace::new([""]),
            Err(MemoryError::InvalidNamespace(_))
        ));
        assert!(Namespace::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn namespace_prefix_is_label_wise() {
        let ns = Namespace::new(["memories", "alice"]).unwrap();
        assert!(ns.starts_with(&Namespace::new(["memories"]).unwrap()));
        assert!(!ns.starts_with(&Namespace::new(["mem"]).unwrap()));
        assert_eq!(ns.dotted(), "memories.alice");
        assert_eq!(Namespace::from_dotted("memories.alice").unwrap(), ns);
    }

    #[test]
    fn template_resolves_placeholders() {
        let template = NamespaceTemplate::new(["memories", "{user_id}"]);
        let mut values = HashMap::new();
        values.insert("user_id".to_string(), "u1".to_string());
        let ns = template.resolve(&values).unwrap();
        assert_eq!(ns.labels(), &["memories".to_string(), "u1".to_string()]);

        let err = template.resolve(&HashMap::new()).unwrap_err();
        assert_eq!(err, MemoryError::UnresolvedPlaceholder("user_id".to_string()));
    }

    #[test]
    fn content_text_prefers_content_field() {
        assert_eq!(content_text(&json!({"content": "dark mode"})), "dark mode");
        assert_eq!(
            content_text(&json!({"content": {"content": "nested"}})),
            "nested"
        );
        assert_eq!(content_text(&json!({"text": "t"})), "t");
        assert_eq!(content_text(&json!({"x": 1})), r#"{"x":1}"#);
    }

    #[test]
    fn blank_query_is_dropped() {
        let req = SearchRequest::new(Namespace::new(["m"]).unwrap()).with_query("  ");
        assert!(req.query.is_none());
        assert_eq!(req.limit, DEFAULT_SEARCH_LIMIT);
    }
}
