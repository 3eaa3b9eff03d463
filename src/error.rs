//! # Error Types
//!
//! Custom error types for Voltronic Bridge using `thiserror`.

use std::time::Duration;
use thiserror::Error;

/// Main error type for Voltronic Bridge
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Malformed descriptor construction or command parameter
    ///
    /// Always a caller/configuration bug; never worth retrying.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed ASCII, malformed hex, or CRC/round-trip mismatch
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A serial read or write exceeded its configured deadline
    #[error("serial exchange timed out after {0:?}")]
    Timeout(Duration),

    /// The device explicitly rejected the command
    #[error("received NAK from device")]
    NakReceived,

    /// A decoded frame could not be turned into a domain value
    ///
    /// Carries the original failure's kind and message as text; the
    /// underlying type is deliberately dropped so callers see one
    /// uniform "could not interpret reply" failure.
    #[error("could not parse the reply ({0})")]
    ParseFailure(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProtocolError {
    /// Short name of the error kind, used when flattening a failure
    /// into [`ProtocolError::ParseFailure`]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::InvalidInput(_) => "InvalidInput",
            Self::Timeout(_) => "Timeout",
            Self::NakReceived => "NakReceived",
            Self::ParseFailure(_) => "ParseFailure",
            Self::Config(_) => "Config",
            Self::Io(_) => "Io",
        }
    }

    /// Flatten any failure into a [`ProtocolError::ParseFailure`]
    /// carrying the original kind name and message
    pub(crate) fn into_parse_failure(self) -> Self {
        match self {
            Self::ParseFailure(_) => self,
            other => Self::ParseFailure(format!("{}: {}", other.kind_name(), other)),
        }
    }
}

/// Result type alias for Voltronic Bridge
pub type Result<T> = std::result::Result<T, ProtocolError>;
