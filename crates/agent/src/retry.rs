//! Retry and failure classification for tool calls
//!
//! Every outcome of a guarded call is text the model can read: the tool
//! output on success, or an `ERROR: ...` string describing why the call
//! ended. Nothing propagates past [`RetryPolicy::run`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use ops_assistant_config::RetryConfig;
use ops_assistant_mcp::{classify_message, FailureClass, McpError};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::tools::{ToolError, ToolTrait};

/// Exponential backoff for transient tool failures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Policy described by the config, or `None` when retries are disabled
    pub fn from_config(config: &RetryConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        Some(Self::new(config.max_retries, config.initial_delay()))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Run a tool callable under this policy.
    ///
    /// `None` stands for a tool with nothing bound to it and yields a setup
    /// error without any attempt.
    pub async fn run<F, Fut, E>(&self, tool_name: &str, call: Option<F>) -> String
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<String, E>>,
        E: Into<ToolError>,
    {
        let Some(call) = call else {
            error!("◆ TOOL {} HAS NO CALLABLE", tool_name);
            return not_configured(tool_name);
        };

        let max_attempts = self.max_attempts();
        let mut delay = self.initial_delay;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let err: ToolError = match call().await {
                Ok(output) => {
                    if attempt > 1 {
                        info!("◆ TOOL {} SUCCEEDED ON ATTEMPT {}", tool_name, attempt);
                    }
                    return output;
                }
                Err(e) => e.into(),
            };
            let message = err.to_string();

            match classify(err.as_ref()) {
                FailureClass::Parameter => {
                    warn!("◆ TOOL {} REJECTED ITS ARGUMENTS: {}", tool_name, message);
                    return parameter_error(tool_name, &message);
                }
                FailureClass::Retryable if attempt < max_attempts => {
                    warn!(
                        "◆ TOOL {} FAILED (ATTEMPT {}/{}): {}. RETRYING IN {:?}",
                        tool_name, attempt, max_attempts, message, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                }
                class => {
                    error!(
                        "◆ TOOL {} FAILED AFTER {} ATTEMPTS ({:?}): {}",
                        tool_name, attempt, class, message
                    );
                    return exhausted(attempt, &message);
                }
            }
        }
    }
}

/// Class of a tool failure, preferring the structured client error
pub fn classify(err: &(dyn std::error::Error + Send + Sync + 'static)) -> FailureClass {
    match err.downcast_ref::<McpError>() {
        Some(mcp) => mcp.class(),
        None => classify_message(&err.to_string()),
    }
}

fn parameter_error(tool_name: &str, message: &str) -> String {
    format!(
        "ERROR: Parameter/Type Error in tool '{tool_name}': {message}\n\n\
         Please check that:\n\
         1. All required parameters are provided\n\
         2. Parameter types are correct (e.g., integers vs strings)\n\
         3. Parameter names match the tool's input schema\n\n\
         Retry the tool call with corrected parameters."
    )
}

fn exhausted(attempts: u32, message: &str) -> String {
    format!("ERROR: Tool execution failed after {attempts} attempts: {message}")
}

fn not_configured(tool_name: &str) -> String {
    format!(
        "ERROR: Tool '{tool_name}' is not properly configured (no callable is bound). \
         This is a setup error, not a remote failure."
    )
}

/// Wraps a tool so that every call goes through a [`RetryPolicy`]
pub struct RetryingTool<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: ToolTrait> RetryingTool<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: ToolTrait> ToolTrait for RetryingTool<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn description(&self) -> &str {
        self.inner.description()
    }

    fn parameters(&self) -> Value {
        self.inner.parameters()
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let inner = &self.inner;
        let call = || inner.execute(args.clone());
        Ok(self.policy.run(inner.name(), Some(call)).await)
    }
}
