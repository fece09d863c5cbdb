//! Tool-using answer agent
//!
//! The pipeline only needs [`Agent::answer`]: hand over a prompt and a tool
//! set, get back one answer string. [`ReactAgent`] is the shipped
//! implementation, a zero-shot ReAct loop over any [`ChatModel`].
//!
//! [`ChatModel`]: crate::llm::ChatModel

mod parser;
mod react;
mod tool;

pub use parser::{parse_step, AgentStep};
pub use react::{AgentConfig, ReactAgent, ITERATION_LIMIT_ANSWER};
pub use tool::{GraphQueryTool, Tool, GRAPH_QUERY_DESCRIPTION, GRAPH_QUERY_TOOL};

use crate::llm::LlmError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// Model output that is neither an action nor a final answer
    #[error("Could not parse model output ({reason}): {output}")]
    Parse { output: String, reason: String },
}

#[async_trait]
pub trait Agent: Send + Sync {
    /// Produce a final answer for `prompt`, calling `tools` as needed
    async fn answer(&self, prompt: &str, tools: &[Arc<dyn Tool>]) -> Result<String, AgentError>;
}
