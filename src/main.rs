use anyhow::Context;
use api_client::{ApiToken, SwarmiaClient};
use clap::{Parser, Subcommand};
use configuration::{CliOverrides, Settings, load_config};
use dispatcher::{DispatchDefaults, Dispatcher};
use mcp_server::McpServer;
use serde_json::Value;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// The main entry point for the Swarmia MCP server.
#[tokio::main]
async fn main() -> ExitCode {
    // Load SWARMIA_* variables from a .env file, if there is one.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Exposes the Swarmia Export API as Model Context Protocol tools.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML config file (defaults to ./swarmia.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: CliOverrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve MCP over stdin/stdout (the default).
    Serve,
    /// Print the tool catalogue as JSON.
    Tools,
    /// Run a single tool and print its CSV to stdout.
    Call(CallArgs),
}

#[derive(Parser)]
struct CallArgs {
    /// Tool name, e.g. "get_dora_metrics".
    tool: String,

    /// Tool arguments as a JSON object.
    #[arg(long, default_value = "{}")]
    args: String,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // The catalogue is static, so listing it needs no credentials.
    if let Some(Commands::Tools) = cli.command {
        let catalogue = serde_json::to_string_pretty(&mcp_server::tool_catalogue())?;
        println!("{}", catalogue);
        return Ok(ExitCode::SUCCESS);
    }

    let settings = load_config(cli.config.as_deref(), &cli.overrides).context("Failed to load configuration")?;
    let _log_guard = configuration::init_tracing(&settings.logging).context("Failed to initialise logging")?;
    tracing::info!(api = ?settings.api, "Configuration loaded.");

    let dispatcher = Arc::new(build_dispatcher(&settings)?);

    match cli.command {
        Some(Commands::Call(args)) => handle_call(&dispatcher, args).await,
        Some(Commands::Serve) | None => {
            McpServer::new(dispatcher).run().await.context("MCP server failed")?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Tools) => Ok(ExitCode::SUCCESS),
    }
}

fn build_dispatcher(settings: &Settings) -> anyhow::Result<Dispatcher> {
    let client = SwarmiaClient::from_config(&settings.api).context("Failed to build the HTTP client")?;
    let token = ApiToken::new(settings.api.token.clone()).context("SWARMIA_API_TOKEN is empty")?;
    let defaults = DispatchDefaults::from_settings(&settings.defaults).context("Invalid [defaults] settings")?;
    Ok(Dispatcher::new(Arc::new(client), token, defaults))
}

/// Runs one invocation. CSV goes to stdout; an error report goes to stderr
/// and the process exits non-zero.
async fn handle_call(dispatcher: &Dispatcher, args: CallArgs) -> anyhow::Result<ExitCode> {
    let arguments: Value =
        serde_json::from_str(&args.args).with_context(|| format!("--args is not valid JSON: {}", args.args))?;

    let outcome = dispatcher.dispatch(&args.tool, &arguments).await;
    if outcome.is_error() {
        eprintln!("{}", outcome.text());
        Ok(ExitCode::FAILURE)
    } else {
        print!("{}", outcome.text());
        Ok(ExitCode::SUCCESS)
    }
}
