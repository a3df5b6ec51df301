//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path`
//! commands for viewing and modifying settings from the command line.

use clap::Subcommand;
use scrycache::config::{config_file_path, ConfigKey, Settings};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., resolver.languages)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., resolver.languages)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
    }
}

fn run_get(key: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let settings = load_current()?;
    println!("{}", key.get(&settings));
    Ok(())
}

fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let mut settings = load_current()?;
    key.set(&mut settings, value)?;

    let path = config_file_path();
    settings.save_to(&path)?;
    println!("Set {} = {}", key.name(), key.get(&settings));
    println!("Saved to {}", path.display());
    Ok(())
}

fn run_list() -> Result<(), CliError> {
    let settings = load_current()?;

    let mut section = "";
    for key in ConfigKey::all() {
        if key.section() != section {
            if !section.is_empty() {
                println!();
            }
            section = key.section();
            println!("[{}]", section);
        }
        println!("  {} = {}", key.key_name(), key.get(&settings));
    }
    Ok(())
}

fn run_path() -> Result<(), CliError> {
    println!("{}", config_file_path().display());
    Ok(())
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'scrycache config list' to see available keys.",
            key
        ))
    })
}

/// Settings from the per-user file, or defaults when it does not exist yet.
fn load_current() -> Result<Settings, CliError> {
    let path = config_file_path();
    if path.exists() {
        Ok(Settings::load_from(&path)?)
    } else {
        Ok(Settings::default())
    }
}
