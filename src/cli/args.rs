//! CLI argument parsing with clap.

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

use crate::config::{SerialConfig, MAX_TIMEOUT_MS};

/// Parse and validate a baud rate (> 0)
fn parse_baud(s: &str) -> Result<u32, String> {
    let baud: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid baud rate", s))?;
    if baud == 0 {
        return Err("Baud rate must be greater than 0".to_string());
    }
    Ok(baud)
}

/// Parse and validate a timeout in milliseconds (1-60000)
fn parse_timeout_ms(s: &str) -> Result<u64, String> {
    let ms: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number of milliseconds", s))?;
    if !(1..=MAX_TIMEOUT_MS).contains(&ms) {
        return Err(format!(
            "Timeout must be between 1 and {} ms, got {}",
            MAX_TIMEOUT_MS, ms
        ));
    }
    Ok(ms)
}

/// Keyboard-to-serial bridge for a remote controlled device
#[derive(Parser, Debug)]
#[command(name = "key-bridge")]
#[command(version, long_about = None)]
#[command(after_help = "KEYS (while running):
    W/A/S/D  Forward / left / back / right
    Z, X     Modifier flags
    Esc      Quit (Ctrl+C also works)

EXAMPLES:
    key-bridge --port /dev/ttyACM0
    key-bridge --port COM3 --baud 115200 -v
    key-bridge list-ports")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Serial device to open (default: from config, else COM3 / /dev/ttyUSB0)
    #[arg(short, long)]
    pub port: Option<String>,

    /// Baud rate (default: 1000000)
    #[arg(short, long, value_parser = parse_baud)]
    pub baud: Option<u32>,

    /// How long to wait for a command byte, in milliseconds (default: 250)
    #[arg(long, value_parser = parse_timeout_ms)]
    pub read_timeout_ms: Option<u64>,

    /// How long a frame write may block, in milliseconds (default: 1000)
    #[arg(long, value_parser = parse_timeout_ms)]
    pub write_timeout_ms: Option<u64>,

    /// Config file path
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only show warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available serial ports
    ListPorts,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

impl Args {
    /// Apply command-line values on top of the loaded configuration.
    pub fn apply_overrides(&self, serial: &mut SerialConfig) {
        if let Some(port) = &self.port {
            serial.port = port.clone();
        }
        if let Some(baud) = self.baud {
            serial.baud_rate = baud;
        }
        if let Some(ms) = self.read_timeout_ms {
            serial.read_timeout_ms = ms;
        }
        if let Some(ms) = self.write_timeout_ms {
            serial.write_timeout_ms = ms;
        }
    }

    /// Log level selected by `-v` / `-q`.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
