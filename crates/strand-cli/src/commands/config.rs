//! Config command for managing CLI configuration

use std::path::Path;

use clap::{Args, Subcommand};

use crate::config::{config_file_path, Config};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Get a config value
    Get {
        /// Config key name
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key name
        key: String,
        /// New value (empty to unset optional keys)
        value: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
    /// Initialize default config file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: &ConfigArgs, data_dir: &Path) -> anyhow::Result<()> {
    match &args.command {
        ConfigCommands::Get { key } => run_get(data_dir, key),
        ConfigCommands::Set { key, value } => run_set(data_dir, key, value),
        ConfigCommands::List => run_list(data_dir),
        ConfigCommands::Path => {
            println!("{}", config_file_path(data_dir).display());
            Ok(())
        }
        ConfigCommands::Init { force } => run_init(data_dir, *force),
    }
}

fn run_get(data_dir: &Path, key: &str) -> anyhow::Result<()> {
    let config = Config::load(data_dir)?;
    if !Config::keys().contains(&key) {
        anyhow::bail!(
            "Unknown config key: {}. Available keys: {}",
            key,
            Config::keys().join(", ")
        );
    }
    println!(
        "{}",
        config.get(key).unwrap_or_else(|| "(not set)".to_string())
    );
    Ok(())
}

fn run_set(data_dir: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let mut config = Config::load(data_dir)?;
    config.set(key, value)?;
    config.save(data_dir)?;
    println!("Set {} = {}", key, value);
    Ok(())
}

fn run_list(data_dir: &Path) -> anyhow::Result<()> {
    let config = Config::load(data_dir)?;
    println!("Config file: {}", config_file_path(data_dir).display());
    println!();
    for key in Config::keys() {
        let value = config.get(key).unwrap_or_else(|| "(not set)".to_string());
        println!("{} = {}", key, value);
    }
    Ok(())
}

fn run_init(data_dir: &Path, force: bool) -> anyhow::Result<()> {
    let path = config_file_path(data_dir);

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    Config::default().save(data_dir)?;
    println!("Created config file at {}", path.display());
    Ok(())
}
