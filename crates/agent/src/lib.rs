//! # Agent
//!
//! Memory-aware ReAct agents.
//!
//! - [`tool`]: the [`Tool`] trait, [`ToolSet`], function tools, memory tools
//!   (`manage_memory`, `search_memory`), hand-off and human-feedback tools
//! - [`prompt_source`]: static and memory-injecting system prompts
//! - [`checkpoint`]: per-thread conversation state (`InMemorySaver`, `SqliteSaver`)
//! - [`react`]: the [`ReactAgent`] loop
//! - [`supervisor`]: a ReAct agent that routes work to member agents
//! - [`planning`], [`episodes`]: planner prompt, approval recognition, episode records
//!
//! ## Loop
//!
//! ```text
//! checkpoint history + input
//!   → system prompt (may search the store)
//!   → LLM turn
//!   → tool calls? run each, append results, repeat
//!   → final reply: save checkpoint
//! ```

pub mod checkpoint;
pub mod config;
pub mod episodes;
pub mod error;
pub mod planning;
pub mod prompt_source;
pub mod react;
pub mod supervisor;
pub mod tool;

pub use checkpoint::{Checkpoint, Checkpointer, InMemorySaver, SqliteSaver, DEFAULT_HISTORY_LIMIT};
pub use config::RunConfig;
pub use error::{AgentError, ToolError};
pub use prompt_source::{MemoryPrompt, PromptSource, StaticPrompt};
pub use react::{AgentRun, ReactAgent, ReactAgentBuilder, DEFAULT_MAX_STEPS};
pub use episodes::{make_episode, make_planning_episode, shared_entry_schema, Episode, PlanningEpisode, SharedEntry};
pub use planning::{is_approval, planning_agent, PLANNING_PROMPT};
pub use supervisor::{Supervisor, SupervisorBuilder};
pub use tool::{
    required_f64, required_str, FunctionTool, HandoffTool, HumanFeedback, HumanFeedbackTool,
    LineFeedback, ManageMemoryTool, ScriptedFeedback, SearchMemoryTool, StdinFeedback, Tool, ToolContext,
    ToolSet,
};
