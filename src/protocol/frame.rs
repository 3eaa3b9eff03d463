//! # Protocol Frame
//!
//! Immutable value type pairing a human-readable ASCII command with the
//! checksummed hex representation that travels over the wire.
//!
//! Frame layout: `ASCII(command) + CRC_high + CRC_low + 0x0D`, rendered
//! as uppercase hex (two digits per byte). There is no length prefix;
//! framing relies on the terminator byte and the CRC validating the
//! frame after the fact.

use super::crc::crc16;
use super::TERMINATOR;
use crate::error::{ProtocolError, Result};

/// An encoded Voltronic protocol frame
///
/// The two factory functions [`Frame::from_ascii`] and [`Frame::from_hex`]
/// are mutual round-trip inverses and the only way to obtain an instance;
/// a constructed frame is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Normalized (trimmed, upper-cased) ASCII command
    command: String,
    /// Uppercase hex rendering of the complete frame bytes
    wire: String,
    /// Raw frame bytes: command + crc_high + crc_low + terminator
    raw: Vec<u8>,
}

impl Frame {
    /// Encode a human-readable ASCII command into a frame
    ///
    /// The command is trimmed and upper-cased before encoding.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidInput`] if the normalized command
    /// is empty or contains any byte outside printable 7-bit ASCII.
    ///
    /// # Examples
    ///
    /// ```
    /// use voltronic_bridge::protocol::Frame;
    ///
    /// let frame = Frame::from_ascii("QPIGS")?;
    /// assert_eq!(frame.command(), "QPIGS");
    /// assert_eq!(frame.wire(), "5150494753B7A90D");
    /// # Ok::<(), voltronic_bridge::error::ProtocolError>(())
    /// ```
    pub fn from_ascii(command: &str) -> Result<Self> {
        let command = command.trim().to_ascii_uppercase();

        if command.is_empty() {
            return Err(ProtocolError::InvalidInput(
                "command is empty after normalization".to_string(),
            ));
        }

        if let Some(byte) = command
            .bytes()
            .find(|b| !b.is_ascii() || b.is_ascii_control())
        {
            return Err(ProtocolError::InvalidInput(format!(
                "invalid byte 0x{:02X} in command '{}'",
                byte, command
            )));
        }

        let crc = crc16(command.as_bytes());

        let mut raw = Vec::with_capacity(command.len() + 3);
        raw.extend_from_slice(command.as_bytes());
        raw.push((crc >> 8) as u8);
        raw.push((crc & 0xFF) as u8);
        raw.push(TERMINATOR);

        let wire = render_hex(&raw);

        // Internal consistency: stripping the CRC and terminator off the
        // frame bytes must give back the exact command we encoded.
        debug_assert_eq!(
            std::str::from_utf8(&raw[..raw.len() - 3]).ok(),
            Some(command.as_str())
        );

        Ok(Self { command, wire, raw })
    }

    /// Decode a hex string received over the wire back into a frame
    ///
    /// Accepts lowercase hex; the input is upper-cased before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidInput`] if the hex string has odd
    /// length, contains non-hex characters, or fails the CRC round-trip
    /// check (re-encoding the embedded command must reproduce the input
    /// exactly). Corrupted and truncated frames surface here; there is
    /// no separate CRC-mismatch error.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.trim().to_ascii_uppercase();

        if !hex.is_ascii() {
            return Err(ProtocolError::InvalidInput(format!(
                "'{}' is not a hex string",
                hex
            )));
        }

        if hex.len() % 2 != 0 {
            return Err(ProtocolError::InvalidInput(format!(
                "odd-length hex string '{}'",
                hex
            )));
        }

        let bytes: Vec<u8> = (0..hex.len())
            .step_by(2)
            .map(|i| {
                u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| {
                    ProtocolError::InvalidInput(format!("'{}' is not a hex string", hex))
                })
            })
            .collect::<Result<_>>()?;

        Self::from_wire_bytes(&bytes)
    }

    /// Decode raw frame bytes (as accumulated off the serial port)
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidInput`] for frames shorter than
    /// four bytes or frames that fail the CRC round-trip check.
    pub fn from_wire_bytes(bytes: &[u8]) -> Result<Self> {
        // Minimum frame: command(1) + crc_high(1) + crc_low(1) + terminator(1)
        if bytes.len() < 4 {
            return Err(ProtocolError::InvalidInput(format!(
                "frame too short: {} bytes",
                bytes.len()
            )));
        }

        let command_bytes = &bytes[..bytes.len() - 3];
        let command = std::str::from_utf8(command_bytes).map_err(|_| {
            ProtocolError::InvalidInput("frame payload is not valid ASCII".to_string())
        })?;

        let frame = Self::from_ascii(command)?;

        // Re-encoding the embedded command must reproduce the input frame
        // exactly; this validates the CRC and catches corruption in one step.
        let input_hex = render_hex(bytes);
        if frame.wire != input_hex {
            return Err(ProtocolError::InvalidInput(format!(
                "'{}' failed the CRC round-trip check",
                input_hex
            )));
        }

        Ok(frame)
    }

    /// The human-readable command carried by this frame
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Uppercase hex rendering of the complete frame
    pub fn wire(&self) -> &str {
        &self.wire
    }

    /// Raw frame bytes as written to the serial port
    pub fn wire_bytes(&self) -> &[u8] {
        &self.raw
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame('{}', '{}')", self.command, self.wire)
    }
}

/// Render bytes as uppercase hex, two digits per byte
fn render_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
