//! Per-invocation configuration.

use std::collections::HashMap;

use memory_core::{MemoryError, Namespace, NamespaceTemplate};

/// Thread id plus free-form values used to resolve namespace templates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    pub thread_id: String,
    pub configurable: HashMap<String, String>,
}

impl RunConfig {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            configurable: HashMap::new(),
        }
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.configurable.insert(key.into(), value.into());
        self
    }

    /// Resolves `{name}` placeholders from `configurable`; `{thread_id}` is always available.
    pub fn resolve(&self, template: &NamespaceTemplate) -> Result<Namespace, MemoryError> {
        let mut values = self.configurable.clone();
        values
            .entry("thread_id".to_string())
            .or_insert_with(|| self.thread_id.clone());
        template.resolve(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_configurable_and_thread_id() {
        let config = RunConfig::new("t-1").with_value("user_id", "alice");
        let ns = config
            .resolve(&NamespaceTemplate::new(["memories", "{user_id}", "{thread_id}"]))
            .unwrap();
        assert_eq!(ns.dotted(), "memories.alice.t-1");
    }

    #[test]
    fn test_resolve_missing_value_fails() {
        let config = RunConfig::new("t-1");
        let err = config
            .resolve(&NamespaceTemplate::new(["memories", "{user_id}"]))
            .unwrap_err();
        assert!(matches!(err, MemoryError::UnresolvedPlaceholder(_)));
    }
}
