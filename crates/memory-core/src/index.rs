//! Vector index helpers shared by the store backends.
//!
//! Backends keep one optional embedding per item. The text that gets embedded is
//! selected by [`IndexConfig::fields`]; ranking is plain cosine similarity.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::error::MemoryError;
use crate::types::{Item, SearchItem, SearchRequest};

/// Field selector meaning "the whole value".
pub const WHOLE_VALUE: &str = "$";

/// Configuration of the embedding index of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    /// Expected embedding length. `None` accepts whatever the embedding model returns.
    pub dims: Option<usize>,
    /// Value paths to embed (dotted paths, or `"$"` for the whole value).
    pub fields: Vec<String>,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dims: None,
            fields: vec![WHOLE_VALUE.to_string()],
        }
    }
}

impl IndexConfig {
    pub fn with_dims(mut self, dims: usize) -> Self {
        self.dims = Some(dims);
        self
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Checks an embedding against `dims`.
    pub fn check_dims(&self, embedding: &[f32]) -> Result<(), MemoryError> {
        match self.dims {
            Some(expected) if expected != embedding.len() => Err(MemoryError::DimensionMismatch {
                expected,
                got: embedding.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// Returns the text to embed for `value`, or `None` when no selected field is present.
pub fn index_text(value: &Value, fields: &[String]) -> Option<String> {
    let mut parts = Vec::new();
    for field in fields {
        let selected = if field == WHOLE_VALUE {
            Some(value)
        } else {
            field.split('.').try_fold(value, |v, seg| v.get(seg))
        };
        match selected {
            Some(Value::String(s)) if !s.trim().is_empty() => parts.push(s.clone()),
            Some(Value::String(_)) | Some(Value::Null) | None => {}
            Some(other) => parts.push(other.to_string()),
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}

/// Calculates cosine similarity between two vectors.
/// Empty, zero or length-mismatched vectors score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// True when every filter entry equals the top-level field of the value.
pub fn matches_filter(value: &Value, filter: Option<&Map<String, Value>>) -> bool {
    match filter {
        None => true,
        Some(filter) => filter.iter().all(|(k, expected)| value.get(k) == Some(expected)),
    }
}

/// Filters, ranks and pages candidate items for a search request.
///
/// `candidates` pairs each item with its stored embedding. With a query embedding the
/// result is ordered by similarity (items without a vector last); otherwise by
/// `updated_at` descending.
pub fn rank_items(
    candidates: Vec<(Item, Option<Vec<f32>>)>,
    request: &SearchRequest,
    query_embedding: Option<&[f32]>,
) -> Vec<SearchItem> {
    let mut hits: Vec<SearchItem> = candidates
        .into_iter()
        .filter(|(item, _)| item.namespace.starts_with(&request.namespace_prefix))
        .filter(|(item, _)| matches_filter(&item.value, request.filter.as_ref()))
        .map(|(item, embedding)| {
            let score = match (query_embedding, embedding.as_deref()) {
                (Some(q), Some(e)) => Some(cosine_similarity(q, e)),
                _ => None,
            };
            SearchItem { item, score }
        })
        .collect();

    if query_embedding.is_some() {
        hits.sort_by(|a, b| match (a.score, b.score) {
            (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.item.updated_at.cmp(&a.item.updated_at),
        });
    } else {
        hits.sort_by(|a, b| b.item.updated_at.cmp(&a.item.updated_at));
    }

    hits.into_iter()
        .skip(request.offset)
        .take(request.limit)
        .collect()
}
