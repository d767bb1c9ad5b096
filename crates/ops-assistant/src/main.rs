//! Ops Assistant - operations incident assistant

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod server;

use commands::{ask_command, serve_command, status_command, tools_command};
use ops_assistant_config::Config;

/// Ops Assistant - answers incident questions with automation tools
#[derive(Parser)]
#[command(name = "ops-assistant")]
#[command(about = "◆ Operations incident assistant for Ansible Automation Platform")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server (default)
    Serve {
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,
        /// Override the bind port
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Ask a single question and print the answer
    Ask {
        /// Question for the assistant
        question: String,
    },
    /// List the tools the tool service advertises
    Tools,
    /// Show effective configuration
    Status,
}

fn init_tracing(verbose: bool, level: &str) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = Config::load().await;
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    init_tracing(cli.verbose, &level);

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration failed: {}", e);
            std::process::exit(1);
        }
    };

    let command = cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    });

    let result = match command {
        Commands::Serve { host, port } => serve_command(config, host, port).await,
        Commands::Ask { question } => ask_command(config, question).await,
        Commands::Tools => tools_command(config).await,
        Commands::Status => status_command(config).await,
    };

    if let Err(e) = result {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
