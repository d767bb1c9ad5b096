//! Ops Assistant command implementations

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use ops_assistant_config::{self, Config};
use ops_assistant_mcp::{McpHttpClient, ToolClient};

use crate::app::AppContext;
use crate::server;

/// Run the webhook server until Ctrl+C
pub async fn serve_command(
    mut config: Config,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    info!("◆ STARTING OPS ASSISTANT");
    info!("◆ MODEL: {}", config.model.name);

    let ctx = Arc::new(AppContext::initialize(&config).await);
    let result = server::serve(Arc::clone(&ctx), &config).await;
    ctx.shutdown().await;
    result
}

/// Answer one question from the command line
pub async fn ask_command(config: Config, question: String) -> Result<()> {
    let ctx = AppContext::initialize(&config).await;

    let result = match ctx.agent() {
        Some(agent) => agent.run(&question).await.map_err(anyhow::Error::from),
        None => Err(anyhow::anyhow!("Agent not initialized")),
    };
    ctx.shutdown().await;

    let outcome = result?;
    if !outcome.tool_calls.is_empty() {
        println!("Tools used: {}", outcome.tool_calls.join(", "));
    }
    println!("\n◆ {}", outcome.answer);
    Ok(())
}

/// Print the tools advertised by the tool service
pub async fn tools_command(config: Config) -> Result<()> {
    let client = McpHttpClient::new(
        config.mcp.server_url.clone(),
        config.mcp_timeout(),
        config.mcp.verify_ssl,
    )?;

    let tools = client
        .list_tools()
        .await
        .with_context(|| format!("failed to list tools at {}", config.mcp.server_url));
    client.close().await;
    let tools = tools?;

    println!("◆ Tools at {}", config.mcp.server_url);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if tools.is_empty() {
        println!("No tools advertised");
    }
    for tool in tools {
        if tool.description.is_empty() {
            println!("  {}", tool.name);
        } else {
            println!("  {} - {}", tool.name, tool.description);
        }
    }

    Ok(())
}

/// Print the effective configuration
pub async fn status_command(config: Config) -> Result<()> {
    let config_path = ops_assistant_config::config_path();

    println!("◆ Ops Assistant Status");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "Config file: {} ({})",
        config_path.display(),
        if config_path.exists() {
            "found"
        } else {
            "not found, using defaults"
        }
    );
    println!();

    println!("Tool service:");
    println!("  URL: {}", config.mcp.server_url);
    println!(
        "  TLS verification: {}",
        if config.mcp.verify_ssl {
            "Enabled"
        } else {
            "Disabled (WARNING: Insecure)"
        }
    );
    println!("  Timeout: {}s", config.mcp.timeout_secs);
    println!();

    println!("Model:");
    println!("  Name: {}", config.model.name);
    println!("  API base: {}", config.model.api_base);
    println!(
        "  API key: {}",
        if config.api_key().is_some() {
            "[Set]"
        } else {
            "[Not set]"
        }
    );
    println!("  Temperature: {}", config.model.temperature);
    println!("  Max tokens: {}", config.model.max_tokens);
    println!();

    println!("Agent:");
    println!("  Max iterations: {}", config.agent.max_iterations);
    println!("  Tool choice: {}", config.agent.tool_choice);
    if config.retry.enabled {
        println!(
            "  Tool retries: {} (initial delay {}s)",
            config.retry.max_retries, config.retry.initial_delay_secs
        );
    } else {
        println!("  Tool retries: disabled");
    }
    println!();

    println!("Server:");
    println!("  Bind: {}", config.bind_address());
    println!("  Webhook: POST {}", config.webhook_route());
    println!("  Health: GET /health");

    Ok(())
}
