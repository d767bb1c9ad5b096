//! Reasoning agent for operations incidents
//!
//! A ReAct loop over an LLM provider, with remote automation tools exposed
//! through a registry and guarded by a retry policy.

use thiserror::Error;

pub mod context;
pub mod loop_agent;
pub mod retry;
pub mod tools;

pub use context::ContextBuilder;
pub use loop_agent::{AgentOutcome, AgentSettings, OpsAgent};
pub use retry::{RetryPolicy, RetryingTool};
pub use tools::{ToolError, ToolRegistry, ToolTrait};

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("TOOL NOT FOUND: {0}")]
    ToolNotFound(String),

    #[error("LLM FAILURE: {0}")]
    Provider(#[from] ops_assistant_provider::ProviderError),

    #[error("MAX ITERATIONS EXCEEDED ({0})")]
    MaxIterations(u32),
}

pub type Result<T> = std::result::Result<T, AgentError>;
