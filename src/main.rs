mod agent;
mod cli;
mod config;
mod embedding;
mod knowledge;
mod localtime;
mod server;
mod speech;
mod tools;
mod weather;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skycast", version, about = "Conversational weather assistant")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the web server (UI + JSON API)
    Serve,
    /// Answer one question from the terminal
    Ask {
        /// The question to put to the assistant
        question: String,
    },
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
    /// Manage the knowledge index
    Index {
        #[command(subcommand)]
        action: IndexAction,
    },
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.skycast/models/
    Download,
}

#[derive(Subcommand)]
enum IndexAction {
    /// Rebuild the knowledge index from the PDF corpus
    Rebuild,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::SkycastConfig::load()?;

    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => {
            server::serve(config).await?;
        }
        Command::Ask { question } => {
            cli::ask(&config, &question).await?;
        }
        Command::Model { action } => match action {
            ModelAction::Download => {
                cli::model_download(&config.embedding).await?;
            }
        },
        Command::Index { action } => match action {
            IndexAction::Rebuild => {
                cli::index_rebuild(&config).await?;
            }
        },
    }

    Ok(())
}
