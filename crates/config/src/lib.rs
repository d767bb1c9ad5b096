//! Configuration management for the ops assistant
//!
//! Settings are layered: built-in defaults, then an optional JSON file,
//! then environment variables (seeded from `.env` when present).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub mod env;
pub mod paths;

pub use env::parse_bool;
pub use paths::{config_path, data_dir};

/// Errors in configuration loading
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("CONFIG IO ERROR: {0}")]
    Io(#[from] std::io::Error),

    #[error("CONFIG PARSE FAILED: {0}")]
    Json(#[from] serde_json::Error),

    #[error("INVALID VALUE FOR {key}: {value:?} ({reason})")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Remote tool service connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    #[serde(default = "default_mcp_url")]
    pub server_url: String,
    #[serde(default = "default_true")]
    pub verify_ssl: bool,
    #[serde(default = "default_mcp_timeout")]
    pub timeout_secs: u64,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            server_url: default_mcp_url(),
            verify_ssl: true,
            timeout_secs: default_mcp_timeout(),
        }
    }
}

fn default_mcp_url() -> String {
    "http://localhost:3000/mcp".to_string()
}

fn default_mcp_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

/// LLM endpoint and sampling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub name: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            api_base: default_api_base(),
            api_key: String::new(),
        }
    }
}

fn default_model() -> String {
    "DeepSeek-R1-Distill-Qwen-14B-W4A16".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Webhook server binding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_path: default_webhook_path(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5678
}

fn default_webhook_path() -> String {
    "7d1a79c6-2189-47d5-92c6-dfbac5b1fa59".to_string()
}

/// Reasoning loop parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default = "default_tool_choice")]
    pub tool_choice: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tool_choice: default_tool_choice(),
        }
    }
}

fn default_max_iterations() -> u32 {
    10
}

fn default_tool_choice() -> String {
    "auto".to_string()
}

/// Tool call retry policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: default_max_retries(),
            initial_delay_secs: default_initial_delay(),
        }
    }
}

impl RetryConfig {
    /// First backoff delay, saturating at zero and `Duration::MAX`
    pub fn initial_delay(&self) -> Duration {
        match Duration::try_from_secs_f64(self.initial_delay_secs) {
            Ok(delay) => delay,
            Err(_) if self.initial_delay_secs > 0.0 => Duration::MAX,
            Err(_) => Duration::ZERO,
        }
    }
}

/// Reject delays that are not a representable, non-negative duration
pub(crate) fn check_delay(key: &str, value: &str, secs: f64) -> Result<()> {
    Duration::try_from_secs_f64(secs)
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            reason: format!("must be a non-negative number of seconds ({})", e),
        })
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay() -> f64 {
    1.0
}

/// Console logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub mcp: McpConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load defaults, the config file, `.env` and the process environment
    pub async fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("◆ LOADED ENVIRONMENT FROM {:?}", path);
        }

        let path = config_path();
        let mut config = Self::load_from(&path).await?;
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a specific JSON file, falling back to defaults when absent
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("◆ NO CONFIG FILE AT {:?}, USING DEFAULTS", path);
            return Ok(Config::default());
        }

        debug!("◆ READING CONFIG FROM {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("◆ WRITING CONFIG TO {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Build a config from defaults plus the given variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Check values serde accepts but the runtime cannot use
    pub fn validate(&self) -> Result<()> {
        let secs = self.retry.initial_delay_secs;
        check_delay("retry.initial_delay_secs", &secs.to_string(), secs)
    }

    /// Override fields from environment-style variables
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        env::apply(self, &lookup)
    }

    /// Address the webhook server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Full route of the webhook endpoint
    pub fn webhook_route(&self) -> String {
        format!("/webhook/{}", self.server.webhook_path.trim_matches('/'))
    }

    pub fn mcp_timeout(&self) -> Duration {
        Duration::from_secs(self.mcp.timeout_secs)
    }

    /// First backoff delay of the tool retry policy
    pub fn retry_initial_delay(&self) -> Duration {
        self.retry.initial_delay()
    }

    /// LLM API key, if one is configured
    pub fn api_key(&self) -> Option<String> {
        if self.model.api_key.is_empty() {
            None
        } else {
            Some(self.model.api_key.clone())
        }
    }
}

/// Location of the optional config file, with the override variable applied
pub fn resolve_config_path(override_path: Option<String>) -> PathBuf {
    match override_path {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => data_dir().join("config.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_route_trims_slashes() {
        let mut config = Config::default();
        config.server.webhook_path = "/hooks/abc/".to_string();
        assert_eq!(config.webhook_route(), "/webhook/hooks/abc");
    }

    #[test]
    fn test_retry_initial_delay_saturates() {
        let mut config = Config::default();
        config.retry.initial_delay_secs = -2.0;
        assert_eq!(config.retry_initial_delay(), Duration::ZERO);

        config.retry.initial_delay_secs = f64::NAN;
        assert_eq!(config.retry_initial_delay(), Duration::ZERO);

        config.retry.initial_delay_secs = 1e30;
        assert_eq!(config.retry_initial_delay(), Duration::MAX);
    }

    #[test]
    fn test_validate_rejects_unrepresentable_delay() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.retry.initial_delay_secs = 1e30;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("retry.initial_delay_secs"));

        config.retry.initial_delay_secs = -0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_empty_is_none() {
        let config = Config::default();
        assert!(config.api_key().is_none());
    }

    #[test]
    fn test_resolve_config_path_override() {
        let path = resolve_config_path(Some("/etc/ops/config.json".to_string()));
        assert_eq!(path, PathBuf::from("/etc/ops/config.json"));

        let default = resolve_config_path(Some(String::new()));
        assert!(default.ends_with("config.json"));
    }
}
