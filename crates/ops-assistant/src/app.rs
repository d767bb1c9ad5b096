//! Application context shared by request handlers

use std::sync::Arc;
use tracing::{error, info, warn};

use ops_assistant_agent::tools::register_mcp_tools;
use ops_assistant_agent::{AgentSettings, OpsAgent, RetryPolicy, ToolRegistry};
use ops_assistant_config::Config;
use ops_assistant_mcp::{McpHttpClient, ToolClient};
use ops_assistant_provider::{OpenAiProvider, Provider};

/// Agent and tool client, built before serving and closed after
pub struct AppContext<P: Provider = OpenAiProvider> {
    agent: Option<Arc<OpsAgent<P>>>,
    mcp: Option<Arc<dyn ToolClient>>,
}

impl AppContext<OpenAiProvider> {
    /// Build the agent from config.
    ///
    /// Tool discovery failures leave the agent running without tools; a
    /// provider or HTTP client that cannot be built leaves no agent at all.
    pub async fn initialize(config: &Config) -> Self {
        let provider = match OpenAiProvider::new(
            config.api_key(),
            config.model.api_base.clone(),
            config.model.name.clone(),
        ) {
            Ok(provider) => provider,
            Err(e) => {
                error!("◆ LLM PROVIDER UNAVAILABLE: {}", e);
                return Self::uninitialized();
            }
        };

        info!("◆ CONNECTING TO TOOL SERVICE {}", config.mcp.server_url);
        let client = match McpHttpClient::new(
            config.mcp.server_url.clone(),
            config.mcp_timeout(),
            config.mcp.verify_ssl,
        ) {
            Ok(client) => Arc::new(client),
            Err(e) => {
                error!("◆ TOOL CLIENT UNAVAILABLE: {}", e);
                return Self::uninitialized();
            }
        };

        let mut tools = ToolRegistry::new();
        let retry = RetryPolicy::from_config(&config.retry);
        if let Err(e) = register_mcp_tools(&mut tools, client.clone(), retry).await {
            error!("◆ TOOL DISCOVERY FAILED: {}", e);
            warn!("◆ RUNNING WITHOUT TOOLS, ANSWERS WILL BE LIMITED");
        }
        info!("◆ AVAILABLE TOOLS: {:?}", tools.names());

        let agent = OpsAgent::new(provider, AgentSettings::from_config(config), tools);
        let client: Arc<dyn ToolClient> = client;
        Self::with_agent(agent, Some(client))
    }
}

impl<P: Provider> AppContext<P> {
    pub fn with_agent(agent: OpsAgent<P>, mcp: Option<Arc<dyn ToolClient>>) -> Self {
        Self {
            agent: Some(Arc::new(agent)),
            mcp,
        }
    }

    /// Context with no agent; every question is refused
    pub fn uninitialized() -> Self {
        Self {
            agent: None,
            mcp: None,
        }
    }

    pub fn agent(&self) -> Option<Arc<OpsAgent<P>>> {
        self.agent.clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.agent.is_some()
    }

    /// Close the tool client; safe to call more than once
    pub async fn shutdown(&self) {
        if let Some(mcp) = &self.mcp {
            mcp.close().await;
        }
        info!("◆ SHUTDOWN COMPLETE");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ops_assistant_config::Config;

    #[tokio::test]
    async fn test_unreachable_tool_service_still_builds_agent() {
        let mut config = Config::default();
        config.mcp.server_url = "http://127.0.0.1:9/mcp".to_string();
        config.mcp.timeout_secs = 2;

        let ctx = AppContext::initialize(&config).await;
        let agent = ctx.agent().expect("agent without tools");
        assert!(agent.tools().is_empty());

        ctx.shutdown().await;
        ctx.shutdown().await;
    }

    #[test]
    fn test_uninitialized_has_no_agent() {
        let ctx: AppContext = AppContext::uninitialized();
        assert!(!ctx.is_initialized());
        assert!(ctx.agent().is_none());
    }
}
