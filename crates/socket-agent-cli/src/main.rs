//! socket-agent CLI - inspect and check service descriptors
//!
//! # Usage
//!
//! ```bash
//! # Fetch and summarize a live descriptor
//! socket-agent inspect http://localhost:8000
//!
//! # Check a descriptor file against the size limits
//! socket-agent check descriptor.json
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;

use commands::{check, inspect};

/// socket-agent - minimal API discovery for LLM agents
#[derive(Parser)]
#[command(
    name = "socket-agent",
    version,
    about = "socket-agent CLI - inspect service descriptors",
    long_about = "Fetches and checks the descriptors socket-agent services publish\n\
                  at /.well-known/socket-agent."
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a service's descriptor and summarize it
    #[command(name = "inspect")]
    Inspect(inspect::InspectArgs),

    /// Check a descriptor file against the size limits
    #[command(name = "check")]
    Check(check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match cli.command {
        Commands::Inspect(args) => inspect::run(args).await,
        Commands::Check(args) => check::run(args),
    }
}

/// Setup logging based on verbosity level
fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Print a success message with a checkmark
pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print an error message with an X
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}
