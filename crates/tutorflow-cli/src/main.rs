//! `tutorflow` -- CLI binary for the lesson pipeline.
//!
//! Provides the following subcommands:
//!
//! - `tutorflow ask` -- Run the pipeline once for a topic and print the result.
//! - `tutorflow interactive` -- Read topics from stdin in a loop.
//! - `tutorflow serve` -- Expose the pipeline over HTTP.
//! - `tutorflow config` -- Inspect the resolved configuration.

use clap::{Parser, Subcommand};

mod commands;

/// Heuristic teaching dialogue generator.
#[derive(Parser)]
#[command(name = "tutorflow", about = "Heuristic teaching dialogue generator", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Generate a reviewed teaching dialogue for one topic.
    Ask(commands::ask::AskArgs),

    /// Read topics from stdin until `exit`.
    Interactive(commands::interactive::InteractiveArgs),

    /// Start the HTTP API.
    Serve(commands::serve::ServeArgs),

    /// Show resolved configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCmd,
    },
}

/// Subcommands for `tutorflow config`.
#[derive(Subcommand)]
enum ConfigCmd {
    /// Show the full resolved configuration (API key redacted).
    Show {
        /// Config file path (overrides auto-discovery).
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Show which config file would be loaded.
    Path {
        /// Config file path (overrides auto-discovery).
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `ask --json` output stays machine-readable.
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask(args) => commands::ask::run(args).await?,
        Commands::Interactive(args) => commands::interactive::run(args).await?,
        Commands::Serve(args) => commands::serve::run(args).await?,
        Commands::Config { action } => match action {
            ConfigCmd::Show { config } => {
                let cfg = commands::load_config(config.as_deref())?;
                commands::config_cmd::config_show(&cfg);
            }
            ConfigCmd::Path { config } => {
                commands::config_cmd::config_path(config.as_deref());
            }
        },
    }

    Ok(())
}
