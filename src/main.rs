//! calendar-mcp entry point.
//!
//! Serves the calendar tools over stdio by default. stdout carries protocol
//! traffic only, so all logging goes to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use calendar_mcp::config::{Config, ConfigArgs};
use calendar_mcp::tools::call_once;
use calendar_mcp::{create_registry, McpServer};

/// Google Calendar tools for agents.
#[derive(Parser)]
#[command(name = "calendar-mcp")]
#[command(about = "Google Calendar tools over the Model Context Protocol, authenticated through Nango.")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the tools over stdio (default)
    Serve,

    /// Print the tool definitions as JSON
    Tools,

    /// Invoke one tool and print its result
    Call {
        /// Tool name, e.g. listCalendars
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("calendar_mcp={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = Config::from_args(cli.config)?;
            let registry = create_registry(&config)?;
            tracing::info!(
                connection_id = %config.connection.connection_id,
                integration_id = %config.connection.integration_id,
                "Starting calendar-mcp {}",
                calendar_mcp::VERSION
            );

            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            McpServer::new(registry).serve(stdin, tokio::io::stdout()).await?;
        }

        Commands::Tools => {
            let definitions = calendar_mcp::tools::definitions::all_definitions();
            println!("{}", serde_json::to_string_pretty(&definitions)?);
        }

        Commands::Call { tool, args } => {
            let arguments: serde_json::Value =
                serde_json::from_str(&args).context("tool arguments must be valid JSON")?;
            let config = Config::from_args(cli.config)?;
            let output = call_once(&config, &tool, arguments).await?;
            println!("{output}");
        }
    }

    Ok(())
}
