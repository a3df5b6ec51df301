//! Scrycache CLI - Command-line interface
//!
//! This binary provides a command-line interface to the scrycache library:
//! resolving decklists, looking up individual cards, and managing the
//! configuration file.

mod commands;
mod error;

use clap::{Parser, Subcommand};

use error::CliError;

#[derive(Parser)]
#[command(
    name = "scrycache",
    version,
    about = "Resolve and cache Scryfall card data for decklists"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a decklist file and print its statistics
    Deck(commands::deck::DeckArgs),
    /// Resolve individual card names
    Card(commands::card::CardArgs),
    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: commands::config::ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let result: Result<(), CliError> = match cli.command {
        Commands::Deck(args) => commands::deck::run(args),
        Commands::Card(args) => commands::card::run(args),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise the `-v` flags pick the
/// level. Logs go to stderr so command output stays pipeable.
fn setup_tracing(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
