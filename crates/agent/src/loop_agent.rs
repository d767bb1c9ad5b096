//! ReAct loop: reason with the model, act through tools, repeat

use std::sync::Arc;
use tracing::{debug, info, warn};

use ops_assistant_config::Config;
use ops_assistant_provider::{ChatParams, Message, Provider, ToolChoice};

use crate::context::ContextBuilder;
use crate::tools::ToolRegistry;
use crate::{AgentError, Result};

const EMPTY_ANSWER: &str = "No response generated";

/// Model parameters and limits for one agent
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_iterations: u32,
    pub tool_choice: ToolChoice,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.0,
            max_tokens: 4096,
            max_iterations: 10,
            tool_choice: ToolChoice::Auto,
        }
    }
}

impl AgentSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.model.name.clone(),
            temperature: config.model.temperature,
            max_tokens: config.model.max_tokens,
            max_iterations: config.agent.max_iterations,
            tool_choice: config
                .agent
                .tool_choice
                .parse()
                .unwrap_or(ToolChoice::Auto),
        }
    }
}

/// Result of answering one question
#[derive(Debug, Clone, PartialEq)]
pub struct AgentOutcome {
    pub answer: String,
    /// Names of the tools invoked, in call order
    pub tool_calls: Vec<String>,
    /// Model turns taken
    pub iterations: u32,
}

/// Operations agent driving a provider through the tool registry
pub struct OpsAgent<P: Provider> {
    provider: Arc<P>,
    settings: AgentSettings,
    context: ContextBuilder,
    tools: ToolRegistry,
}

impl<P: Provider> OpsAgent<P> {
    pub fn new(provider: P, settings: AgentSettings, tools: ToolRegistry) -> Self {
        Self {
            provider: Arc::new(provider),
            settings,
            context: ContextBuilder::new(),
            tools,
        }
    }

    pub fn with_context(mut self, context: ContextBuilder) -> Self {
        self.context = context;
        self
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Answer a question, calling tools as the model asks for them
    pub async fn run(&self, question: &str) -> Result<AgentOutcome> {
        info!("◆ QUESTION: {}", question);
        debug!("◆ TOOLS: {:?}", self.tools.names());

        let mut messages = self.context.build_messages(question);
        let mut tool_calls = Vec::new();
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.settings.max_iterations {
                warn!("◆ GAVE UP AFTER {} ITERATIONS", self.settings.max_iterations);
                return Err(AgentError::MaxIterations(self.settings.max_iterations));
            }

            debug!("◆ ITERATION {}", iteration);

            let response = self.provider.chat(self.params(&messages)).await?;

            if !response.has_tool_calls() {
                let answer = response
                    .content
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| EMPTY_ANSWER.to_string());

                info!(
                    "◆ ANSWERED IN {} ITERATIONS WITH {} TOOL CALLS",
                    iteration,
                    tool_calls.len()
                );
                return Ok(AgentOutcome {
                    answer,
                    tool_calls,
                    iterations: iteration,
                });
            }

            let names: Vec<&str> = response.tool_calls.iter().map(|c| c.name.as_str()).collect();
            info!("◆ STEP {}: TOOL CALLS = {:?}", iteration, names);

            ContextBuilder::add_assistant_message(
                &mut messages,
                response.content.as_deref(),
                &response.tool_calls,
            );

            for call in &response.tool_calls {
                let result = self
                    .tools
                    .execute(&call.name, call.arguments.clone())
                    .await
                    .unwrap_or_else(|e| format!("Error: {}", e));

                debug!("◆ {} RETURNED {} BYTES", call.name, result.len());
                ContextBuilder::add_tool_result(&mut messages, &call.id, &call.name, &result);
                tool_calls.push(call.name.clone());
            }
        }
    }

    fn params(&self, messages: &[Message]) -> ChatParams {
        ChatParams {
            model: self.settings.model.clone(),
            messages: messages.to_vec(),
            tools: self.tools.definitions(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            tool_choice: self.settings.tool_choice.clone(),
        }
    }
}
