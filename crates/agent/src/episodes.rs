//! Episode records for episodic memory and the shared-workspace entry schema.

use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn now() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// One remembered event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub timestamp: String,
    pub event: String,
}

impl Episode {
    /// Text the episodic agent is asked to remember.
    pub fn remember_prompt(&self) -> String {
        format!("Remember this event: {} (at {})", self.event, self.timestamp)
    }
}

pub fn make_episode(event: impl Into<String>) -> Episode {
    Episode {
        timestamp: now(),
        event: event.into(),
    }
}

/// Outcome of one plan review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningEpisode {
    pub timestamp: String,
    pub plan: String,
    pub approved: bool,
    pub feedback: String,
    /// `"approved"` or `"rejected"`.
    pub outcome: String,
}

pub fn make_planning_episode(
    plan: impl Into<String>,
    approved: bool,
    feedback: impl Into<String>,
) -> PlanningEpisode {
    PlanningEpisode {
        timestamp: now(),
        plan: plan.into(),
        approved,
        feedback: feedback.into(),
        outcome: if approved { "approved" } else { "rejected" }.to_string(),
    }
}

/// Structured entry agents write to a shared workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedEntry {
    pub task: String,
    pub action: String,
    /// Free text or structured data.
    pub result: Value,
}

/// JSON schema for [`SharedEntry`], for `ManageMemoryTool::with_schema`.
pub fn shared_entry_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "task": {"type": "string", "description": "The task or objective being worked on"},
            "action": {"type": "string", "description": "The specific action taken or being requested"},
            "result": {
                "anyOf": [{"type": "string"}, {"type": "object"}],
                "description": "The outcome, data, or result of the action"
            }
        },
        "required": ["task", "action", "result"]
    })
}
