//! # Device Operation
//!
//! Immutable specification of one request/response exchange against the
//! inverter: a command builder, a reply parser, NAK handling, timeouts,
//! and the reply terminator.
//!
//! An operation is constructed once and reused across many [`Operation::issue`]
//! calls; it holds no per-call state. The serial port is externally owned
//! and is never closed here, only configured. The protocol is half-duplex
//! request/response, so concurrent issues against one port must be
//! serialized by the caller.

use crate::command::{Command, ResultParser};
use crate::config::OperationConfig;
use crate::error::{ProtocolError, Result};
use crate::protocol::{Frame, TERMINATOR};
use crate::serial::SerialPortIO;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Builder from zero-or-more arguments to an ASCII command string
pub type CommandBuilder = Arc<dyn Fn(&[&str]) -> Result<String> + Send + Sync>;

/// Pause between unsuccessful read attempts in the poll-read loop
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default read and write timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Immutable descriptor of one device exchange
pub struct Operation<T> {
    builder: CommandBuilder,
    parser: ResultParser<T>,
    error_on_nak: bool,
    read_timeout: Duration,
    write_timeout: Duration,
    terminator: u8,
}

impl<T> Operation<T> {
    /// Create an operation for a fixed command string
    ///
    /// Arguments passed to `issue` are ignored by the builder.
    pub fn new<F>(command: &str, parser: F) -> Self
    where
        F: Fn(&Frame) -> Result<T> + Send + Sync + 'static,
    {
        let command = command.trim().to_ascii_uppercase();
        Self::with_builder(move |_| Ok(command.clone()), parser)
    }

    /// Create an operation with a custom command builder
    pub fn with_builder<B, F>(builder: B, parser: F) -> Self
    where
        B: Fn(&[&str]) -> Result<String> + Send + Sync + 'static,
        F: Fn(&Frame) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            builder: Arc::new(builder),
            parser: Arc::new(parser),
            error_on_nak: true,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            terminator: TERMINATOR,
        }
    }

    /// Create an operation from configuration
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidArgument`] if the configuration
    /// fails validation (zero timeout, multi-byte terminator, empty
    /// command).
    pub fn from_config<F>(config: &OperationConfig, parser: F) -> Result<Self>
    where
        F: Fn(&Frame) -> Result<T> + Send + Sync + 'static,
    {
        config.validate()?;

        Ok(Self::new(&config.command, parser)
            .error_on_nak(config.error_on_nak)
            .read_timeout(Duration::from_secs(config.serial_read_timeout_seconds))
            .write_timeout(Duration::from_secs(config.serial_write_timeout_seconds))
            .terminator(config.termination_byte()?))
    }

    /// Treat a decoded "NAK" reply as a failure (default: true)
    pub fn error_on_nak(mut self, enabled: bool) -> Self {
        self.error_on_nak = enabled;
        self
    }

    /// Deadline for the poll-read loop (default: 2 seconds)
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Deadline for writing the command frame (default: 2 seconds)
    pub fn write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Byte that marks the end of a reply (default: carriage return)
    pub fn terminator(mut self, terminator: u8) -> Self {
        self.terminator = terminator;
        self
    }

    /// Issue the command and parse the device's reply
    ///
    /// Writes the encoded frame, then polls the port one byte at a time
    /// until the terminator arrives, pausing briefly between empty
    /// reads. Atomic from the caller's perspective: one domain value or
    /// one failure, never a partial result.
    ///
    /// # Errors
    ///
    /// * [`ProtocolError::Timeout`] - write or read deadline exceeded
    /// * [`ProtocolError::NakReceived`] - device rejected the command
    ///   (only when `error_on_nak` is enabled)
    /// * [`ProtocolError::ParseFailure`] - reply could not be decoded or
    ///   parsed into a domain value
    /// * [`ProtocolError::InvalidArgument`] - builder rejected the
    ///   supplied arguments
    pub async fn issue(&self, port: &mut dyn SerialPortIO, args: &[&str]) -> Result<T> {
        port.set_read_timeout(Duration::ZERO)?;
        port.set_write_timeout(self.write_timeout)?;

        let frame = Frame::from_ascii(&(self.builder)(args)?)?;
        debug!("Issuing {}", frame);

        port.write_all(frame.wire_bytes())
            .await
            .map_err(|e| match e.kind() {
                io::ErrorKind::TimedOut => ProtocolError::Timeout(self.write_timeout),
                _ => ProtocolError::Io(e),
            })?;

        let reply = self.read_reply(port).await?;
        debug!("Received {} reply bytes", reply.len());

        let decoded = Frame::from_wire_bytes(&reply).map_err(ProtocolError::into_parse_failure)?;

        if self.error_on_nak && decoded.command().eq_ignore_ascii_case("NAK") {
            return Err(ProtocolError::NakReceived);
        }

        (self.parser)(&decoded).map_err(ProtocolError::into_parse_failure)
    }

    /// Poll-read the reply until the terminator byte arrives
    async fn read_reply(&self, port: &mut dyn SerialPortIO) -> Result<Vec<u8>> {
        let deadline = Instant::now() + self.read_timeout;
        let mut reply = Vec::new();

        loop {
            match port.read_byte().await? {
                Some(byte) => {
                    reply.push(byte);
                    if byte == self.terminator {
                        return Ok(reply);
                    }
                }
                None => sleep(POLL_INTERVAL).await,
            }

            if Instant::now() > deadline {
                return Err(ProtocolError::Timeout(self.read_timeout));
            }
        }
    }
}

impl<T: 'static> From<Command<T>> for Operation<T> {
    /// Lift a command descriptor into an operation
    ///
    /// The descriptor's arity and allowed-value checks become the
    /// operation's command builder; its parser is shared.
    fn from(command: Command<T>) -> Self {
        let parser = command.parser();
        Self {
            builder: Arc::new(move |args: &[&str]| {
                if args.len() > 1 {
                    return Err(ProtocolError::InvalidArgument(format!(
                        "wrong number of arguments ({} for at most 1)",
                        args.len()
                    )));
                }
                command.render(args.first().copied())
            }),
            parser,
            error_on_nak: true,
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
            terminator: TERMINATOR,
        }
    }
}

impl<T> std::fmt::Debug for Operation<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("error_on_nak", &self.error_on_nak)
            .field("read_timeout", &self.read_timeout)
            .field("write_timeout", &self.write_timeout)
            .field("terminator", &self.terminator)
            .finish_non_exhaustive()
    }
}
