//! Turnwise CLI, the main entry point.
//!
//! Commands:
//! - `onboard`: Write a default config file
//! - `agent`:   Interactive chat or single-message mode
//! - `config`:  Show the effective configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "turnwise",
    about = "Turnwise: a tool-calling chat agent that knows when to keep talking",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Onboard,

    /// Chat with an agent
    Agent {
        /// Agent preset to use (general, travel)
        #[arg(short, long, default_value = "general")]
        preset: String,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Override the model for this session
        #[arg(long)]
        model: Option<String>,
    },

    /// Show the effective configuration (API key redacted)
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Agent {
            preset,
            message,
            model,
        } => commands::agent::run(&preset, message, model).await?,
        Commands::Config => commands::config_cmd::show().await?,
    }

    Ok(())
}
