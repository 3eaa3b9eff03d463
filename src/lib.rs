//! # Voltronic Bridge Library
//!
//! Command Voltronic/Axpert-family inverter devices over a serial link.
//!
//! This library provides the core functionality for turning a
//! human-readable ASCII command into a checksummed, CR-terminated wire
//! frame, driving the blocking write/poll-read exchange against the
//! device, and parsing the raw reply back into structured data.

pub mod command;
pub mod commands;
pub mod config;
pub mod error;
pub mod operation;
pub mod protocol;
pub mod serial;
