//! Parsing of the model's extraction reply.

use serde::{Deserialize, Serialize};

use crate::ManagerError;

/// One requested change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum MemoryOp {
    Create { content: String },
    Update { id: String, content: String },
    Delete { id: String },
}

/// `{"memories": [...], "done": bool}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Extraction {
    #[serde(default)]
    pub memories: Vec<MemoryOp>,
    #[serde(default)]
    pub done: bool,
}

/// Parses the reply, accepting a fenced code block or JSON surrounded by prose.
pub fn parse_extraction(text: &str) -> Result<Extraction, ManagerError> {
    let body = fenced_block(text).unwrap_or(text).trim();
    if let Ok(extraction) = serde_json::from_str::<Extraction>(body) {
        return Ok(extraction);
    }
    let start = body.find('{');
    let end = body.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&body[start..=end])
            .map_err(|e| ManagerError::Parse(format!("{}: {}", e, truncate(body)))),
        _ => Err(ManagerError::Parse(format!("no JSON object in reply: {}", truncate(body)))),
    }
}

fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    // Skip the info string (e.g. `json`).
    let body_start = after.find('\n')? + 1;
    let body = &after[body_start..];
    let close = body.find("```")?;
    Some(&body[..close])
}

fn truncate(text: &str) -> String {
    const MAX: usize = 200;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(MAX).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let parsed = parse_extraction(r#"{"memories": [{"action": "create", "content": "Alice has a dog"}], "done": true}"#).unwrap();
        assert_eq!(
            parsed.memories,
            vec![MemoryOp::Create { content: "Alice has a dog".to_string() }]
        );
        assert!(parsed.done);
    }

    #[test]
    fn test_parse_fenced_block_with_prose() {
        let text = "Here are the changes:\n```json\n{\"memories\": [{\"action\": \"delete\", \"id\": \"k1\"}]}\n```\nLet me know.";
        let parsed = parse_extraction(text).unwrap();
        assert_eq!(parsed.memories, vec![MemoryOp::Delete { id: "k1".to_string() }]);
        assert!(!parsed.done);
    }

    #[test]
    fn test_parse_json_inside_prose() {
        let text = "Sure! {\"memories\": [{\"action\": \"update\", \"id\": \"k\", \"content\": \"x\"}], \"done\": false} Thanks.";
        let parsed = parse_extraction(text).unwrap();
        assert!(matches!(&parsed.memories[0], MemoryOp::Update { id, .. } if id == "k"));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(parse_extraction("nothing to remember"), Err(ManagerError::Parse(_))));
        assert!(parse_extraction(r#"{"memories": [{"action": "rename"}]}"#).is_err());
    }
}
