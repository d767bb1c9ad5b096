//! Prompt assembly for the reasoning loop

use chrono::Local;

use ops_assistant_provider::{Message, ToolCall};

/// Operating instructions for the assistant
pub const SYSTEM_PROMPT: &str = "You are an operations assistant for RHEL server management.
You are connected to Ansible Automation Platform via MCP tools:
- get_job_templates - list available automation
- launch_job_template - run automation
- get_job_status - check status of a job
- get_job_output - get output of a job
- get_host_inventories - get host inventories

RULES:
1. MUST use tools - never answer without them
2. ONLY provide info from actual tool calls

Never make up template/job IDs.";

/// Builds the conversation (system prompt + messages) for the agent
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    system_prompt: String,
    show_time: bool,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self {
            system_prompt: SYSTEM_PROMPT.to_string(),
            show_time: true,
        }
    }

    /// Replace the operating instructions
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Toggle the current-time section
    pub fn with_time(mut self, show_time: bool) -> Self {
        self.show_time = show_time;
        self
    }

    pub fn build_system_prompt(&self) -> String {
        if !self.show_time {
            return self.system_prompt.clone();
        }

        let now = Local::now().format("%Y-%m-%d %H:%M (%A)");
        format!("{}\n\n## Current Time\n{}", self.system_prompt, now)
    }

    /// Opening conversation for a question
    pub fn build_messages(&self, question: &str) -> Vec<Message> {
        vec![
            Message::system(self.build_system_prompt()),
            Message::user(question),
        ]
    }

    pub fn add_tool_result(
        messages: &mut Vec<Message>,
        tool_call_id: &str,
        name: &str,
        result: &str,
    ) {
        messages.push(Message::tool(tool_call_id, name, result));
    }

    /// Add the assistant turn that requested `calls`
    pub fn add_assistant_message(
        messages: &mut Vec<Message>,
        content: Option<&str>,
        calls: &[ToolCall],
    ) {
        messages.push(Message::assistant_tool_calls(
            content.map(str::to_string),
            calls,
        ));
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
