//! Planner agent: drafts numbered task plans and loops on human feedback until approved.

use std::sync::Arc;

use llm_client::LlmClient;

use crate::prompt_source::StaticPrompt;
use crate::react::ReactAgent;
use crate::tool::{HumanFeedback, HumanFeedbackTool};
use crate::AgentError;

pub const PLANNING_AGENT_NAME: &str = "planning_agent";

pub const PLANNING_PROMPT: &str = "\
You are a planning agent in a multi-agent team. You write plans; you never carry them out.

Break the request into small numbered tasks and give each task to exactly one of these agents:
- Coding Agent: writes Python code
- Terminal Agent: runs shell and OS commands
- Network Analysis Agent: investigates network traffic
- Registry Entries Agent: analyses Windows registry changes
- System Log Agent: analyses operating system and application logs
- Recent Files Agent: inspects recently modified or accessed files
- General Assistant Agent: anything the others do not cover

Format each line as `Task N: [For <Agent>] <what to do>` and keep the tasks in execution order.

Workflow:
1. Draft the plan and call human_feedback(plan=...) once.
2. If the answer approves it (yes, proceed, approve, ok, good, fine), reply with the plan text and stop.
3. Otherwise revise the plan using the feedback and call human_feedback again.

Never call human_feedback after an approval and never route tasks to agents yourself.";

const NEGATIVE: &[&str] = &["no", "not", "don't", "dont", "reject", "rejected", "change", "revise", "wrong"];
const POSITIVE: &[&str] = &[
    "yes", "y", "proceed", "approve", "approved", "ok", "okay", "good", "fine", "lgtm", "sure",
];

/// Whether a human answer approves the plan. Any negative word wins over positive ones.
pub fn is_approval(answer: &str) -> bool {
    let words: Vec<String> = answer
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();
    if words.iter().any(|w| NEGATIVE.contains(&w.as_str())) {
        return false;
    }
    words.iter().any(|w| POSITIVE.contains(&w.as_str()))
}

/// Planner agent wired to a feedback source.
pub fn planning_agent(
    llm: Arc<dyn LlmClient>,
    feedback: Arc<dyn HumanFeedback>,
) -> Result<ReactAgent, AgentError> {
    ReactAgent::builder(PLANNING_AGENT_NAME, llm)
        .description("Breaks requests into numbered tasks and gets them approved")
        .prompt(StaticPrompt::new(PLANNING_PROMPT))
        .tool(HumanFeedbackTool::new(feedback))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_approval() {
        assert!(is_approval("yes"));
        assert!(is_approval("  Proceed."));
        assert!(is_approval("looks good to me"));
        assert!(is_approval("OK"));
        assert!(!is_approval("no, add a testing task"));
        assert!(!is_approval("not good"));
        assert!(!is_approval("add more detail"));
        assert!(!is_approval(""));
    }
}
