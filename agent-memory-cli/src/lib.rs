//! # agent-memory-cli
//!
//! Runtime wiring (logging, env config, stores) and the demo commands behind the
//! `agent-memory` binary.

pub mod cli;
pub mod commands;
pub mod display;
pub mod logger;
pub mod setup;
pub mod tools;

pub use cli::{BackgroundScenario, Cli, Commands};
