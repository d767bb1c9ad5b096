//! Environment variable overrides

use std::str::FromStr;

use crate::{check_delay, Config, ConfigError, Result};

pub const MCP_SERVER_URL: &str = "MCP_SERVER_URL";
pub const MCP_VERIFY_SSL: &str = "MCP_VERIFY_SSL";
pub const MCP_TIMEOUT_SECS: &str = "MCP_TIMEOUT_SECS";
pub const MODEL_NAME: &str = "MODEL_NAME";
pub const MODEL_TEMPERATURE: &str = "MODEL_TEMPERATURE";
pub const MODEL_MAX_TOKENS: &str = "MODEL_MAX_TOKENS";
pub const OPENAI_API_BASE: &str = "OPENAI_API_BASE";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const WEBHOOK_PATH: &str = "WEBHOOK_PATH";
pub const SERVER_HOST: &str = "SERVER_HOST";
pub const SERVER_PORT: &str = "SERVER_PORT";
pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const MAX_ITERATIONS: &str = "MAX_ITERATIONS";
pub const MAX_TOOL_RETRIES: &str = "MAX_TOOL_RETRIES";
pub const TOOL_RETRY_ENABLED: &str = "TOOL_RETRY_ENABLED";
pub const TOOL_RETRY_INITIAL_DELAY: &str = "TOOL_RETRY_INITIAL_DELAY";
pub const TOOL_CHOICE: &str = "TOOL_CHOICE";

/// `true`, `1` and `yes` (any case) enable a flag; anything else disables it
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

pub(crate) fn apply<F>(config: &mut Config, lookup: &F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup(MCP_SERVER_URL) {
        config.mcp.server_url = v;
    }
    if let Some(v) = lookup(MCP_VERIFY_SSL) {
        config.mcp.verify_ssl = parse_bool(&v);
    }
    if let Some(v) = lookup(MCP_TIMEOUT_SECS) {
        config.mcp.timeout_secs = parse_number(MCP_TIMEOUT_SECS, &v)?;
    }

    if let Some(v) = lookup(MODEL_NAME) {
        config.model.name = v;
    }
    if let Some(v) = lookup(MODEL_TEMPERATURE) {
        config.model.temperature = parse_number(MODEL_TEMPERATURE, &v)?;
    }
    if let Some(v) = lookup(MODEL_MAX_TOKENS) {
        config.model.max_tokens = parse_number(MODEL_MAX_TOKENS, &v)?;
    }
    if let Some(v) = lookup(OPENAI_API_BASE) {
        config.model.api_base = v;
    }
    if let Some(v) = lookup(OPENAI_API_KEY) {
        config.model.api_key = v;
    }

    if let Some(v) = lookup(WEBHOOK_PATH) {
        config.server.webhook_path = v;
    }
    if let Some(v) = lookup(SERVER_HOST) {
        config.server.host = v;
    }
    if let Some(v) = lookup(SERVER_PORT) {
        config.server.port = parse_number(SERVER_PORT, &v)?;
    }

    if let Some(v) = lookup(LOG_LEVEL) {
        config.logging.level = v.to_ascii_lowercase();
    }

    if let Some(v) = lookup(MAX_ITERATIONS) {
        config.agent.max_iterations = parse_number(MAX_ITERATIONS, &v)?;
    }
    if let Some(v) = lookup(TOOL_CHOICE) {
        config.agent.tool_choice = v;
    }

    if let Some(v) = lookup(TOOL_RETRY_ENABLED) {
        config.retry.enabled = parse_bool(&v);
    }
    if let Some(v) = lookup(MAX_TOOL_RETRIES) {
        config.retry.max_retries = parse_number(MAX_TOOL_RETRIES, &v)?;
    }
    if let Some(v) = lookup(TOOL_RETRY_INITIAL_DELAY) {
        let delay: f64 = parse_number(TOOL_RETRY_INITIAL_DELAY, &v)?;
        check_delay(TOOL_RETRY_INITIAL_DELAY, &v, delay)?;
        config.retry.initial_delay_secs = delay;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(parse_bool(" yes "));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool("on"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn test_parse_number_error_names_key() {
        let err = parse_number::<u16>(SERVER_PORT, "http").unwrap_err();
        let display = err.to_string();
        assert!(display.contains("SERVER_PORT"));
        assert!(display.contains("http"));
    }
}
