//! # Voltronic Protocol Module
//!
//! Implementation of the Voltronic/Axpert RS232 wire protocol.
//!
//! This module handles:
//! - Frame encoding (ASCII command + CRC16 + carriage-return terminator)
//! - Frame decoding with CRC round-trip validation
//! - CRC-16 checksum with reserved-byte correction

pub mod crc;
pub mod frame;

pub use frame::Frame;

/// Frame terminator byte (carriage return)
pub const TERMINATOR: u8 = 0x0D;
