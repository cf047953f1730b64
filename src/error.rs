//! Error types for key-bridge.

use std::path::PathBuf;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised while opening or enumerating serial ports.
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error(
        "Failed to open serial port '{port}': {source}\n\n\
         Use `key-bridge list-ports` to see available ports."
    )]
    Open {
        port: String,
        source: serialport::Error,
    },

    #[error("Failed to enumerate serial ports: {0}")]
    Enumerate(serialport::Error),
}

/// Fatal errors that end the bridge loop.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Serial I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the keyboard listener.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("Keyboard listener already running")]
    AlreadyRunning,

    #[error("Failed to spawn keyboard listener thread: {0}")]
    Spawn(std::io::Error),
}
