//! Annai CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — write a default config file
//! - `chat`    — interactive chat or single-message mode
//! - `gateway` — start the HTTP server

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "annai",
    about = "Annai — a Tokyo travel assistant",
    version,
    author
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

    /// Chat with the travel assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run(),
        Commands::Chat { message } => commands::chat::run(message).await,
        Commands::Gateway { port } => commands::gateway::run(port).await,
    }
}
