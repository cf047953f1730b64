//! Configuration file handling for key-bridge.
//!
//! Loads configuration from `<config dir>/key-bridge/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use crate::error::ConfigError;

/// Default baud rate of the remote device.
pub const DEFAULT_BAUD_RATE: u32 = 1_000_000;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 250;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = 1000;
/// Upper bound accepted for either timeout.
pub const MAX_TIMEOUT_MS: u64 = 60_000;

#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM3";
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Configuration file structure for key-bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,
}

/// Serial connection parameters.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SerialConfig {
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            port: default_port(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
        }
    }
}

fn default_port() -> String {
    DEFAULT_PORT.to_string()
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

fn default_write_timeout_ms() -> u64 {
    DEFAULT_WRITE_TIMEOUT_MS
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Check that the parameters can be used to open a port.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port.trim().is_empty() {
            return Err(ConfigError::Invalid("serial port name is empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::Invalid("baud rate must be greater than 0".to_string()));
        }
        for (name, value) in [
            ("read timeout", self.read_timeout_ms),
            ("write timeout", self.write_timeout_ms),
        ] {
            if !(1..=MAX_TIMEOUT_MS).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 1 and {} ms, got {}",
                    name, MAX_TIMEOUT_MS, value
                )));
            }
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            Self::parse(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })
        } else {
            Ok(Config::default())
        }
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("key-bridge").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/key-bridge/config.toml")
        })
}

/// Contents written by `key-bridge config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# key-bridge configuration

[serial]
# Serial device of the remote controller (e.g. "COM3" on Windows)
# port = "/dev/ttyUSB0"
# Baud rate
baud_rate = 1000000
# How long to wait for a command byte before logging an idle timeout
read_timeout_ms = 250
# How long a frame write may block before the frame is dropped
write_timeout_ms = 1000
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.serial.port, DEFAULT_PORT);
        assert_eq!(config.serial.baud_rate, 1_000_000);
        assert_eq!(config.serial.read_timeout(), Duration::from_millis(250));
        assert_eq!(config.serial.write_timeout(), Duration::from_secs(1));
        assert!(config.serial.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("nope.toml").as_path())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[serial]\nport = \"/dev/ttyACM1\"\nread_timeout_ms = 100").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.serial.port, "/dev/ttyACM1");
        assert_eq!(config.serial.read_timeout_ms, 100);
        assert_eq!(config.serial.baud_rate, DEFAULT_BAUD_RATE);
        assert_eq!(config.serial.write_timeout_ms, DEFAULT_WRITE_TIMEOUT_MS);
    }

    #[test]
    fn test_parse_error_names_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[serial]\nbaud_rate = \"fast\"").unwrap();

        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_default_config_file_parses_to_defaults() {
        let config = Config::parse(DEFAULT_CONFIG_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_baud = SerialConfig {
            baud_rate: 0,
            ..SerialConfig::default()
        };
        assert!(zero_baud.validate().is_err());

        let zero_timeout = SerialConfig {
            read_timeout_ms: 0,
            ..SerialConfig::default()
        };
        assert!(zero_timeout.validate().is_err());

        let huge_timeout = SerialConfig {
            write_timeout_ms: MAX_TIMEOUT_MS + 1,
            ..SerialConfig::default()
        };
        let err = huge_timeout.validate().unwrap_err();
        assert!(err.to_string().contains("write timeout"));

        let empty_port = SerialConfig {
            port: "  ".to_string(),
            ..SerialConfig::default()
        };
        assert!(empty_port.validate().is_err());
    }

    #[test]
    fn test_default_path_ends_with_config_toml() {
        let path = default_path();
        assert!(path.ends_with("key-bridge/config.toml"));
    }
}
