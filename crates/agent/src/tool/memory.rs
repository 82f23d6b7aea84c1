//! `manage_memory` and `search_memory` tools over the agent's store.

use anyhow::Result;
use async_trait::async_trait;
use memory_core::{NamespaceTemplate, SearchRequest, DEFAULT_SEARCH_LIMIT};
use prompt::ToolSpec;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use super::{optional_usize, required_str, Tool, ToolContext};
use crate::ToolError;

pub const MANAGE_MEMORY_TOOL_NAME: &str = "manage_memory";
pub const SEARCH_MEMORY_TOOL_NAME: &str = "search_memory";

const MANAGE_DESCRIPTION: &str = "Create, update, or delete a memory to persist across conversations.\n\
Include the MEMORY ID when updating or deleting a MEMORY. Omit the MEMORY ID when creating a new MEMORY, it will be created for you.\n\
Proactively call this tool when you:\n\
1. Identify a new USER preference.\n\
2. Receive an explicit USER request to remember something or otherwise alter your behavior.\n\
3. Are working and want to record important context.\n\
4. Identify that an existing MEMORY is incorrect or outdated.";

const SEARCH_DESCRIPTION: &str = "Search your long-term memories for information relevant to your current context.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    fn parse(args: &Value) -> Result<Self, ToolError> {
        match args.get("action").and_then(Value::as_str).unwrap_or("create") {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(ToolError::InvalidAction(format!(
                "Invalid action {:?}. Must be one of create, update, delete.",
                other
            ))),
        }
    }
}

/// Creates, updates and deletes memories under a (templated) namespace.
///
/// Values are stored as `{"content": <content>}` under a generated UUID key.
#[derive(Debug, Clone)]
pub struct ManageMemoryTool {
    name: String,
    namespace: NamespaceTemplate,
    schema: Option<Value>,
}

impl ManageMemoryTool {
    pub fn new(namespace: impl Into<NamespaceTemplate>) -> Self {
        Self {
            name: MANAGE_MEMORY_TOOL_NAME.to_string(),
            namespace: namespace.into(),
            schema: None,
        }
    }

    /// Requires `content` to be an object matching `schema` (a JSON schema object).
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Overrides the tool name, e.g. when one agent manages several namespaces.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn content_schema(&self) -> Value {
        match &self.schema {
            Some(schema) => schema.clone(),
            None => json!({"type": "string"}),
        }
    }

    fn check_content(&self, content: &Value) -> Result<(), ToolError> {
        match &self.schema {
            Some(schema) => validate_against_schema(content, schema),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Tool for ManageMemoryTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            description: MANAGE_DESCRIPTION.to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "content": self.content_schema(),
                    "action": {
                        "type": "string",
                        "enum": ["create", "update", "delete"],
                        "default": "create"
                    },
                    "id": {"type": "string", "description": "MEMORY ID, required for update and delete"}
                }
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<String> {
        let store = ctx.require_store()?;
        let namespace = ctx.config.resolve(&self.namespace)?;
        let action = Action::parse(&args)?;
        let id = match args.get("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        let content = args.get("content").filter(|v| !v.is_null());

        match action {
            Action::Create | Action::Update => {
                if action == Action::Create && id.is_some() {
                    return Err(ToolError::InvalidAction(
                        "You cannot provide a MEMORY ID when creating a MEMORY. Please try again, omitting the id argument."
                            .to_string(),
                    )
                    .into());
                }
                if action == Action::Update && id.is_none() {
                    return Err(ToolError::InvalidAction(
                        "You must provide a MEMORY ID when updating a MEMORY.".to_string(),
                    )
                    .into());
                }
                let content = content.ok_or_else(|| ToolError::MissingArgument("content".to_string()))?;
                self.check_content(content)?;

                let key = id.unwrap_or_else(|| Uuid::new_v4().to_string());
                store
                    .put(&namespace, &key, json!({ "content": content }))
                    .await?;
                let verb = if action == Action::Create { "created" } else { "updated" };
                info!(tool = %self.name, namespace = %namespace, key = %key, "{} memory", verb);
                Ok(format!("{} memory {}", verb, key))
            }
            Action::Delete => {
                let key = id.ok_or_else(|| {
                    ToolError::InvalidAction("You must provide a MEMORY ID when deleting a MEMORY.".to_string())
                })?;
                store.delete(&namespace, &key).await?;
                info!(tool = %self.name, namespace = %namespace, key = %key, "deleted memory");
                Ok(format!("deleted memory {}", key))
            }
        }
    }
}

/// Searches memories under a (templated) namespace prefix.
#[derive(Debug, Clone)]
pub struct SearchMemoryTool {
    name: String,
    namespace: NamespaceTemplate,
}

impl SearchMemoryTool {
    pub fn new(namespace: impl Into<NamespaceTemplate>) -> Self {
        Self {
            name: SEARCH_MEMORY_TOOL_NAME.to_string(),
            namespace: namespace.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl Tool for SearchMemoryTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            description: SEARCH_DESCRIPTION.to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "limit": {"type": "integer", "default": DEFAULT_SEARCH_LIMIT},
                    "offset": {"type": "integer", "default": 0},
                    "filter": {"type": "object"}
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Value, ctx: &ToolContext) -> Result<String> {
        let store = ctx.require_store()?;
        let namespace = ctx.config.resolve(&self.namespace)?;
        let query = required_str(&args, "query")?;
        let limit = optional_usize(&args, "limit")?.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let offset = optional_usize(&args, "offset")?.unwrap_or(0);

        let mut request = SearchRequest::new(namespace.clone())
            .with_query(query)
            .with_limit(limit)
            .with_offset(offset);
        match args.get("filter") {
            None | Some(Value::Null) => {}
            Some(Value::Object(filter)) => request = request.with_filter(filter.clone()),
            Some(_) => {
                return Err(ToolError::InvalidArguments("'filter' must be an object".to_string()).into())
            }
        }

        let results = store.search(request).await?;
        info!(tool = %self.name, namespace = %namespace, count = results.len(), "searched memories");
        Ok(serde_json::to_string(&results)?)
    }
}

/// Checks `content` against a JSON schema: object type, `required` keys and simple
/// property `type`s. `anyOf` properties pass when any branch type matches.
fn validate_against_schema(content: &Value, schema: &Value) -> Result<(), ToolError> {
    let obj = content
        .as_object()
        .ok_or_else(|| ToolError::Schema(format!("expected an object, got {}", content)))?;

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(key) {
                return Err(ToolError::Schema(format!("missing required field '{}'", key)));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        for (key, value) in obj {
            if let Some(prop) = properties.get(key) {
                if !matches_property(value, prop) {
                    return Err(ToolError::Schema(format!(
                        "field '{}' has the wrong type: {}",
                        key, value
                    )));
                }
            }
        }
    }
    Ok(())
}

fn matches_property(value: &Value, prop: &Value) -> bool {
    if let Some(branches) = prop.get("anyOf").and_then(Value::as_array) {
        return branches.iter().any(|b| matches_property(value, b));
    }
    match prop.get("type").and_then(Value::as_str) {
        Some("string") => value.is_string(),
        Some("object") => value.is_object(),
        Some("array") => value.is_array(),
        Some("boolean") => value.is_boolean(),
        Some("integer") => value.is_i64() || value.is_u64(),
        Some("number") => value.is_number(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "task": {"type": "string"},
                "action": {"type": "string"},
                "result": {"anyOf": [{"type": "string"}, {"type": "object"}]}
            },
            "required": ["task", "action", "result"]
        })
    }

    #[test]
    fn test_schema_requires_fields() {
        let schema = shared_schema();
        assert!(validate_against_schema(
            &json!({"task": "t", "action": "a", "result": {"employees": 1}}),
            &schema
        )
        .is_ok());
        assert!(matches!(
            validate_against_schema(&json!({"task": "t", "action": "a"}), &schema),
            Err(ToolError::Schema(_))
        ));
        assert!(validate_against_schema(&json!("text"), &schema).is_err());
        assert!(validate_against_schema(
            &json!({"task": 1, "action": "a", "result": "r"}),
            &schema
        )
        .is_err());
    }

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::parse(&json!({})).unwrap(), Action::Create);
        assert_eq!(Action::parse(&json!({"action": "delete"})).unwrap(), Action::Delete);
        assert!(Action::parse(&json!({"action": "merge"})).is_err());
    }
}
