//! # Voltronic Bridge
//!
//! Issue a configured command to a Voltronic/Axpert inverter and print
//! the raw reply payload.
//!
//! Reads `config.toml` (or the path given as the first argument), opens
//! the configured serial port, issues the configured command once, and
//! logs the decoded reply.

use anyhow::{Context, Result};
use tracing::{error, info};

use voltronic_bridge::config::Config;
use voltronic_bridge::error::ProtocolError;
use voltronic_bridge::operation::Operation;
use voltronic_bridge::serial;

/// Default configuration file path
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path))?;

    info!(
        "Issuing '{}' on {} at {} baud",
        config.operation.command, config.serial.port, config.serial.baud_rate
    );

    let mut port = serial::open(&config.serial.port, config.serial.baud_rate)
        .context("Failed to open serial port")?;

    let operation = Operation::from_config(&config.operation, |frame| {
        Ok(frame.command().to_string())
    })
    .context("Invalid operation configuration")?;

    match operation.issue(&mut port, &[]).await {
        Ok(reply) => {
            info!("Device replied: {}", reply);
            Ok(())
        }
        Err(ProtocolError::NakReceived) => {
            error!("Device rejected the command with a NAK");
            Err(ProtocolError::NakReceived.into())
        }
        Err(e) => {
            error!("Exchange failed: {}", e);
            Err(e.into())
        }
    }
}
