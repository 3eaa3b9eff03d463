//! # Serial Communication Module
//!
//! Handles the serial link to the inverter.
//!
//! This module handles:
//! - Opening the serial port with the inverter's RS232 settings (2400 8N1)
//! - The [`SerialPortIO`] trait that operations are issued against
//! - Wrapping `tokio_serial` so tests can substitute a scripted port

mod port_trait;

pub use port_trait::{SerialPortIO, TokioSerialPort};

#[cfg(test)]
pub use port_trait::mocks;

use crate::error::{ProtocolError, Result};
use tokio_serial::SerialPortBuilderExt;
use tracing::info;

/// Default baud rate for Axpert-family inverters
pub const DEFAULT_BAUD_RATE: u32 = 2400;

/// Open a serial port with the inverter's line settings
///
/// # Arguments
///
/// * `path` - Device path (e.g., "/dev/ttyUSB0")
/// * `baud_rate` - Line speed, typically [`DEFAULT_BAUD_RATE`]
///
/// # Errors
///
/// Returns an I/O error if the device cannot be opened.
pub fn open(path: &str, baud_rate: u32) -> Result<TokioSerialPort> {
    let port = tokio_serial::new(path, baud_rate)
        .data_bits(tokio_serial::DataBits::Eight)
        .parity(tokio_serial::Parity::None)
        .stop_bits(tokio_serial::StopBits::One)
        .flow_control(tokio_serial::FlowControl::None)
        .open_native_async()
        .map_err(|e| {
            ProtocolError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open {}: {}", path, e),
            ))
        })?;

    info!("Opened inverter serial port at {}", path);
    Ok(TokioSerialPort::new(port))
}
