//! Subcommand handlers for list-ports and config actions.

use std::error::Error;
use std::path::{Path, PathBuf};

use super::args::ConfigAction;
use crate::config::{default_path, Config, DEFAULT_CONFIG_TOML};
use crate::serial;

/// List available serial ports and print them to stdout.
pub fn list_ports() -> Result<(), Box<dyn Error>> {
    let ports = serial::list_ports()?;
    if ports.is_empty() {
        println!("No serial ports found.");
        println!();
        println!("Make sure the device is connected and you have permission to open it.");
    } else {
        println!("Available serial ports:");
        for port in ports {
            println!("  {}", port);
        }
        println!();
        println!("Use --port <name> to select a port.");
    }
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    path: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(default_path);
    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(config_path.as_path()))?;
            println!("Current configuration:");
            println!();
            print!("{}", toml::to_string_pretty(&config)?);
            println!();
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            init_config(&config_path)?;
            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}

/// Write the default config file, refusing to overwrite an existing one.
pub fn init_config(path: &Path) -> Result<(), Box<dyn Error>> {
    if path.exists() {
        return Err(format!(
            "Config file already exists: {}\nUse 'key-bridge config show' to view it.",
            path.display()
        )
        .into());
    }

    // Create parent directories if needed
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TOML)?;
    Ok(())
}
