//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{ProtocolError, Result};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub serial: SerialConfig,
    pub operation: OperationConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// Device operation configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OperationConfig {
    /// Fixed ASCII command to issue (e.g. "QPIGS")
    pub command: String,

    #[serde(default = "default_error_on_nak")]
    pub error_on_nak: bool,

    #[serde(default = "default_timeout_seconds")]
    pub serial_read_timeout_seconds: u64,

    #[serde(default = "default_timeout_seconds")]
    pub serial_write_timeout_seconds: u64,

    /// Reply terminator; must be a single ASCII character
    #[serde(default = "default_termination_character")]
    pub serial_termination_character: String,
}

fn default_serial_port() -> String {
    "/dev/ttyUSB0".to_string()
}

fn default_baud_rate() -> u32 {
    crate::serial::DEFAULT_BAUD_RATE
}

fn default_error_on_nak() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    2
}

fn default_termination_character() -> String {
    "\r".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, a config error
    /// if it is not valid TOML, or [`ProtocolError::InvalidArgument`]
    /// if validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the loaded configuration
    pub fn validate(&self) -> Result<()> {
        self.operation.validate()
    }
}

impl OperationConfig {
    /// Validate operation settings
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidArgument`] for an empty command,
    /// a zero timeout, or a terminator that is not one ASCII byte.
    pub fn validate(&self) -> Result<()> {
        if self.command.trim().is_empty() {
            return Err(ProtocolError::InvalidArgument(
                "operation command must not be empty".to_string(),
            ));
        }

        if self.serial_read_timeout_seconds == 0 {
            return Err(ProtocolError::InvalidArgument(
                "serial_read_timeout_seconds must be positive".to_string(),
            ));
        }

        if self.serial_write_timeout_seconds == 0 {
            return Err(ProtocolError::InvalidArgument(
                "serial_write_timeout_seconds must be positive".to_string(),
            ));
        }

        self.termination_byte()?;
        Ok(())
    }

    /// The reply terminator as a single byte
    pub fn termination_byte(&self) -> Result<u8> {
        let bytes = self.serial_termination_character.as_bytes();
        match bytes {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(ProtocolError::InvalidArgument(format!(
                "serial_termination_character must be a single ASCII character, got {:?}",
                self.serial_termination_character
            ))),
        }
    }
}
