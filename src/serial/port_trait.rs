//! Trait abstraction for serial port operations to enable testing

use async_trait::async_trait;
use std::io;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;

/// Trait for serial port I/O operations
///
/// Models the half-duplex channel the protocol runs over: configurable
/// timeouts, a bulk write, and a non-blocking single-byte read. The port
/// is owned, opened, and closed by the caller; operations only adjust
/// its per-call timeout parameters.
#[async_trait]
pub trait SerialPortIO: Send {
    /// Configure the read timeout; `Duration::ZERO` means non-blocking
    fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()>;

    /// Configure the write timeout
    fn set_write_timeout(&mut self, timeout: Duration) -> io::Result<()>;

    /// Write all data to the port
    ///
    /// Fails with `io::ErrorKind::TimedOut` when the configured write
    /// timeout elapses first.
    async fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Attempt to read a single byte from the port
    ///
    /// Returns `Ok(None)` when no data is currently available.
    async fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// How long a non-blocking read waits for a byte before reporting empty
const READ_PROBE_INTERVAL: Duration = Duration::from_millis(10);

/// Wrapper around tokio_serial::SerialStream that implements SerialPortIO
#[derive(Debug)]
pub struct TokioSerialPort {
    port: tokio_serial::SerialStream,
    write_timeout: Duration,
}

impl TokioSerialPort {
    pub fn new(port: tokio_serial::SerialStream) -> Self {
        Self {
            port,
            write_timeout: Duration::from_secs(2),
        }
    }
}

#[async_trait]
impl SerialPortIO for TokioSerialPort {
    fn set_read_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
        // Reads are already non-blocking: read_byte probes briefly and
        // reports empty; the caller owns the polling loop and deadline.
        Ok(())
    }

    fn set_write_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.write_timeout = timeout;
        Ok(())
    }

    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let write_timeout = self.write_timeout;
        let port = &mut self.port;

        let write = async move {
            port.write_all(data).await?;
            port.flush().await
        };

        tokio::time::timeout(write_timeout, write)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "serial write timed out"))?
    }

    async fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];

        match tokio::time::timeout(READ_PROBE_INTERVAL, self.port.read(&mut buf)).await {
            Ok(Ok(0)) => Ok(None),
            Ok(Ok(_)) => Ok(Some(buf[0])),
            Ok(Err(e)) => Err(e),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Mock serial port for testing
    ///
    /// Replies are scripted as a byte queue; an empty queue reads as a
    /// silent line. Written frames and timeout settings are recorded for
    /// assertions.
    #[derive(Clone)]
    pub struct MockSerialPort {
        pub reply_bytes: Arc<Mutex<VecDeque<u8>>>,
        pub written_data: Arc<Mutex<Vec<Vec<u8>>>>,
        pub read_timeouts: Arc<Mutex<Vec<Duration>>>,
        pub write_timeouts: Arc<Mutex<Vec<Duration>>>,
        pub write_error: Arc<Mutex<Option<io::ErrorKind>>>,
    }

    impl MockSerialPort {
        pub fn new() -> Self {
            Self {
                reply_bytes: Arc::new(Mutex::new(VecDeque::new())),
                written_data: Arc::new(Mutex::new(Vec::new())),
                read_timeouts: Arc::new(Mutex::new(Vec::new())),
                write_timeouts: Arc::new(Mutex::new(Vec::new())),
                write_error: Arc::new(Mutex::new(None)),
            }
        }

        /// Script a device reply to be served one byte per read
        pub fn with_reply(reply: &[u8]) -> Self {
            let port = Self::new();
            port.queue_reply(reply);
            port
        }

        pub fn queue_reply(&self, reply: &[u8]) {
            self.reply_bytes.lock().unwrap().extend(reply.iter().copied());
        }

        pub fn get_written_data(&self) -> Vec<Vec<u8>> {
            self.written_data.lock().unwrap().clone()
        }

        pub fn set_write_error(&self, error: io::ErrorKind) {
            *self.write_error.lock().unwrap() = Some(error);
        }
    }

    #[async_trait]
    impl SerialPortIO for MockSerialPort {
        fn set_read_timeout(&mut self, timeout: Duration) -> io::Result<()> {
            self.read_timeouts.lock().unwrap().push(timeout);
            Ok(())
        }

        fn set_write_timeout(&mut self, timeout: Duration) -> io::Result<()> {
            self.write_timeouts.lock().unwrap().push(timeout);
            Ok(())
        }

        async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
            if let Some(error) = *self.write_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock write error"));
            }
            self.written_data.lock().unwrap().push(data.to_vec());
            Ok(())
        }

        async fn read_byte(&mut self) -> io::Result<Option<u8>> {
            Ok(self.reply_bytes.lock().unwrap().pop_front())
        }
    }
}
