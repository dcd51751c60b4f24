//! Main entry point for the NetBill command-line client.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use url::Url;

mod commands;
mod context;

use commands::{access::AccessCommand, resource::ResourceCommand, session::SessionCommand};
use context::AppContext;

/// NetBill CLI
#[derive(Parser, Debug)]
#[command(name = "netbill")]
#[command(about = "Command-line interface for NetBill", long_about = None)]
pub struct Cli {
    /// Path to the configuration file (toml, yaml or json)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Server origin, e.g. `https://billing.example.net`; overrides the configuration
    #[arg(long, global = true)]
    origin: Option<Url>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the NetBill CLI
#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in, sign out and inspect the stored session
    #[command(subcommand)]
    Session(SessionCommand),

    /// Check permissions against the stored session
    #[command(subcommand)]
    Access(AccessCommand),

    /// Read administrative resources
    #[command(subcommand)]
    Resource(ResourceCommand),

    /// Generate shell completion scripts for the CLI
    Completion {
        /// The shell type for which to generate the completion script (e.g., bash, zsh, fish, powershell)
        #[arg(long, short)]
        shell: clap_complete::Shell,
    },

    /// Generate a configuration file with the default settings
    Config {
        /// Format of the configuration file (toml, yaml or json). Defaults to toml.
        #[arg(long, short, default_value = "toml")]
        format: String,
        /// Write to this path instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let Cli {
        config,
        origin,
        command,
    } = Cli::parse();

    let command = match command {
        Commands::Completion { shell } => {
            commands::completion::generate_completion(shell);
            return Ok(());
        }
        Commands::Config { format, output } => {
            return commands::config::generate_config(&format, output.as_deref());
        }
        other => other,
    };

    let context = AppContext::load(config.as_deref(), origin)
        .context("failed to initialize the NetBill client")?;

    match command {
        Commands::Session(command) => commands::session::run(&context, command).await,
        Commands::Access(command) => commands::access::run(&context, command),
        Commands::Resource(command) => commands::resource::run(&context, command).await,
        Commands::Completion { .. } | Commands::Config { .. } => Ok(()),
    }
}
