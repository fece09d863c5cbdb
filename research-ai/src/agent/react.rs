use super::parser::{parse_step, AgentStep};
use super::{Agent, AgentError, Tool};
use crate::llm::{ChatMessage, ChatModel};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Returned when the loop runs out of iterations without a final answer
pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit or time limit.";

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub max_iterations: usize,
    /// Feed unparseable replies back to the model instead of failing
    pub handle_parsing_errors: bool,
    /// Log every thought, action and observation at info level
    pub verbose: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            handle_parsing_errors: true,
            verbose: true,
        }
    }
}

/// Zero-shot ReAct agent
///
/// Each turn the model either names a tool and its input, or gives the
/// final answer. Tool results come back as `Observation:` messages.
pub struct ReactAgent {
    model: Arc<dyn ChatModel>,
    config: AgentConfig,
}

impl ReactAgent {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self::with_config(model, AgentConfig::default())
    }

    pub fn with_config(model: Arc<dyn ChatModel>, config: AgentConfig) -> Self {
        Self { model, config }
    }

    fn instructions(tools: &[Arc<dyn Tool>]) -> String {
        let descriptions = tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            "Answer the following question as best you can. You have access to the following tools:\n\n\
             {}\n\n\
             Use the following format:\n\n\
             Question: the input question you must answer\n\
             Thought: you should always think about what to do\n\
             Action: the action to take, should be one of [{}]\n\
             Action Input: the input to the action\n\
             Observation: the result of the action\n\
             ... (this Thought/Action/Action Input/Observation can repeat N times)\n\
             Thought: I now know the final answer\n\
             Final Answer: the final answer to the original input question\n\n\
             Begin!",
            descriptions,
            tool_names(tools)
        )
    }

    fn trace(&self, label: &str, text: &str) {
        if self.config.verbose {
            info!("{}: {}", label, text);
        } else {
            debug!("{}: {}", label, text);
        }
    }

    async fn observe(&self, tools: &[Arc<dyn Tool>], name: &str, input: &str) -> String {
        let Some(tool) = tools.iter().find(|t| t.name() == name) else {
            return format!(
                "{} is not a valid tool, try one of [{}].",
                name,
                tool_names(tools)
            );
        };

        match tool.call(input).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Tool {} failed: {:#}", name, e);
                format!("Error: {:#}", e)
            }
        }
    }
}

fn tool_names(tools: &[Arc<dyn Tool>]) -> String {
    tools.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
}

#[async_trait]
impl Agent for ReactAgent {
    async fn answer(&self, prompt: &str, tools: &[Arc<dyn Tool>]) -> Result<String, AgentError> {
        let mut messages = vec![
            ChatMessage::system(Self::instructions(tools)),
            ChatMessage::user(format!("Question: {}", prompt)),
        ];

        for iteration in 1..=self.config.max_iterations {
            let reply = self.model.chat(&messages).await?;
            self.trace(&format!("Step {}", iteration), reply.trim());

            let observation = match parse_step(&reply) {
                Ok(AgentStep::Finish(answer)) => return Ok(answer),
                Ok(AgentStep::Action { tool, input }) => self.observe(tools, &tool, &input).await,
                Err(reason) if self.config.handle_parsing_errors => {
                    warn!("Unparseable model output, asking again: {}", reason);
                    format!("Invalid Format: {}", reason)
                }
                Err(reason) => {
                    return Err(AgentError::Parse {
                        output: reply,
                        reason,
                    })
                }
            };

            self.trace("Observation", &observation);
            messages.push(ChatMessage::assistant(reply));
            messages.push(ChatMessage::user(format!("Observation: {}", observation)));
        }

        warn!(
            "Agent reached {} iterations without a final answer",
            self.config.max_iterations
        );
        Ok(ITERATION_LIMIT_ANSWER.to_string())
    }
}
