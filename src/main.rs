//! mcpchat — interactive chat host over tool-protocol servers.
//!
//! Usage:
//!   ANTHROPIC_KEY=... mcpchat \
//!       --tool "uvx mcp-server-time --local-timezone America/Los_Angeles" \
//!       --tool "node weather-server.js"
//!
//! Each `--tool` definition spawns one server; the model sees the combined tool
//! catalogue and every tool call is routed back to the server that owns it.

use std::env;
use std::process;
use std::sync::Arc;

use clap::Parser;

use mcpchat::clients::claude::ClaudeClient;
use mcpchat::config::ToolCommand;
use mcpchat::{chat_loop, CompletionOrchestrator, SessionRegistry};

#[derive(Parser)]
#[command(
    name = "mcpchat",
    about = "Interactive chat host that routes LLM tool calls across multiple tool-protocol servers",
    version
)]
struct Cli {
    /// Tool server definition, e.g. "uvx mcp-server-time --local-timezone America/Los_Angeles".
    /// Repeatable. Split on raw whitespace; arguments containing spaces are unsupported.
    #[arg(long = "tool")]
    tool: Vec<String>,

    /// Model identifier passed to the completion service
    #[arg(long, default_value = "claude-sonnet-4-5")]
    model: String,
}

#[tokio::main]
async fn main() {
    mcpchat::init_logger();
    let cli = Cli::parse();

    let mut commands = Vec::with_capacity(cli.tool.len());
    for definition in &cli.tool {
        match definition.parse::<ToolCommand>() {
            Ok(command) => commands.push(command),
            Err(err) => {
                eprintln!("Invalid --tool definition '{}': {}", definition, err);
                process::exit(2);
            }
        }
    }

    let secret_key = match env::var("ANTHROPIC_KEY") {
        Ok(key) => key,
        Err(_) => {
            eprintln!("Please set the ANTHROPIC_KEY environment variable!");
            process::exit(2);
        }
    };

    let client = Arc::new(ClaudeClient::new_with_model_str(&secret_key, &cli.model));
    let orchestrator = CompletionOrchestrator::new(client);
    let mut registry = SessionRegistry::new();

    match registry.connect(&commands).await {
        Ok(()) => {
            if let Err(err) = chat_loop::run_chat_loop(&orchestrator, &registry).await {
                eprintln!("Input error: {}", err);
            }
            registry.close().await;
        }
        Err(err) => {
            // Best-effort teardown of whatever was opened before aborting.
            registry.close().await;
            eprintln!("Setup failed: {}", err);
            process::exit(1);
        }
    }
}
