//! Serial protocol loop.
//!
//! The remote device drives the conversation: it sends a single command byte
//! and the bridge answers. `DATA_REQUEST` gets an 8-byte frame built from the
//! current key state, `LOG` is followed by NUL-terminated text that is echoed
//! to the console, and anything else is reported and skipped.
//!
//! Only startup and unexpected I/O errors on the connection are fatal.
//! Read timeouts, dropped frames and unknown bytes are logged and the loop
//! carries on.
//!
//! Idle timeouts and successful frame sends happen several times a second, so
//! they are logged at debug level; run with `-v` to see them. Dropped frames,
//! unknown commands and truncated log lines are warnings.

use std::io::{self, ErrorKind, Stdout, Write};
use std::time::Duration;

use crate::config::SerialConfig;
use crate::error::BridgeError;
use crate::frame::Frame;
use crate::keys::KeyState;
use crate::protocol::{Command, LOG_TERMINATOR};
use crate::serial::Transport;
use crate::shutdown::ShutdownSignal;

/// Log text is written to the console whenever this many bytes are pending.
pub const LOG_CHUNK_LEN: usize = 256;

const LOG_PREFIX: &[u8] = b"[LOG] ";

/// What a single loop iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No command byte arrived within the read timeout.
    Idle,
    /// A frame was written and flushed.
    FrameSent(Frame),
    /// Writing the frame failed or timed out; the remote is expected to re-request.
    FrameDropped,
    /// A complete log line of `bytes` bytes was forwarded to the console.
    Logged { bytes: usize },
    /// The log line timed out before its terminator; the partial text was forwarded.
    LogTruncated { bytes: usize },
    /// An unrecognized command byte was skipped.
    Unknown(u8),
}

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub frames_sent: u64,
    pub frames_dropped: u64,
    pub log_lines: u64,
    pub truncated_logs: u64,
    pub unknown_commands: u64,
    pub timeouts: u64,
}

impl BridgeStats {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Idle => self.timeouts += 1,
            Outcome::FrameSent(_) => self.frames_sent += 1,
            Outcome::FrameDropped => self.frames_dropped += 1,
            Outcome::Logged { .. } => self.log_lines += 1,
            Outcome::LogTruncated { .. } => self.truncated_logs += 1,
            Outcome::Unknown(_) => self.unknown_commands += 1,
        }
    }
}

/// Owns the serial connection and answers the remote device.
pub struct SerialBridge<T: Transport, W: Write = Stdout> {
    transport: T,
    console: W,
    keys: KeyState,
    read_timeout: Duration,
    write_timeout: Duration,
    stats: BridgeStats,
}

impl<T: Transport> SerialBridge<T, Stdout> {
    /// Create a bridge that forwards log text to stdout.
    pub fn new(transport: T, keys: KeyState, config: &SerialConfig) -> Self {
        Self::with_console(transport, keys, config, io::stdout())
    }
}

impl<T: Transport, W: Write> SerialBridge<T, W> {
    /// Create a bridge that forwards log text to `console`.
    pub fn with_console(
        transport: T,
        keys: KeyState,
        config: &SerialConfig,
        console: W,
    ) -> Self {
        SerialBridge {
            transport,
            console,
            keys,
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
            stats: BridgeStats::default(),
        }
    }

    /// Run until shutdown is requested or the connection fails.
    ///
    /// Shutdown is checked between iterations, so it takes effect within one
    /// read timeout.
    pub fn run(&mut self, shutdown: &ShutdownSignal) -> Result<BridgeStats, BridgeError> {
        let result = loop {
            if shutdown.is_requested() {
                break Ok(());
            }
            if let Err(e) = self.step() {
                break Err(e);
            }
        };

        let s = self.stats;
        log::info!(
            "Bridge stopped: {} frames sent, {} dropped, {} log lines ({} truncated), \
             {} unknown commands, {} idle timeouts",
            s.frames_sent,
            s.frames_dropped,
            s.log_lines,
            s.truncated_logs,
            s.unknown_commands,
            s.timeouts
        );
        result.map(|()| s)
    }

    /// Await one command byte and handle it.
    pub fn step(&mut self) -> Result<Outcome, BridgeError> {
        let outcome = match self.read_byte()? {
            None => {
                log::debug!("Read timed out");
                Outcome::Idle
            }
            Some(byte) => match Command::from(byte) {
                Command::DataRequest => {
                    log::debug!("Received data request; sending values");
                    self.send_frame()
                }
                Command::Log => self.forward_log()?,
                Command::Unknown(value) => {
                    log::warn!("Received unknown value: {}", value);
                    Outcome::Unknown(value)
                }
            },
        };
        self.stats.record(&outcome);
        Ok(outcome)
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    pub fn console(&self) -> &W {
        &self.console
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Read a single byte. `None` means the read timed out.
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.transport.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(None)
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn send_frame(&mut self) -> Outcome {
        let frame = self.keys.frame_bytes();

        let written = self.write_frame(&frame);

        // Restore the read timeout even if the write failed.
        if let Err(e) = self.transport.set_timeout(self.read_timeout) {
            log::warn!("Failed to restore read timeout: {}", e);
        }

        match written {
            Ok(()) => {
                log::debug!("Frame sent: {:?}", frame);
                Outcome::FrameSent(frame)
            }
            Err(e) => {
                log::warn!("Frame dropped: {}", e);
                Outcome::FrameDropped
            }
        }
    }

    /// Bytes go out one at a time, in order, then the port is flushed.
    fn write_frame(&mut self, frame: &Frame) -> io::Result<()> {
        self.transport.set_timeout(self.write_timeout)?;
        for byte in frame {
            self.transport.write_all(std::slice::from_ref(byte))?;
        }
        self.transport.flush()
    }

    /// Echo a NUL-terminated log line to the console.
    ///
    /// Text is written in chunks of at most [`LOG_CHUNK_LEN`] bytes as it
    /// arrives. Whatever was received is always printed and the line ended,
    /// including when the read times out or fails.
    fn forward_log(&mut self) -> Result<Outcome, BridgeError> {
        let mut pending = Vec::with_capacity(LOG_CHUNK_LEN);
        let mut bytes = 0;
        self.to_console(LOG_PREFIX);

        let terminated = loop {
            let next = match self.read_byte() {
                Ok(next) => next,
                Err(e) => {
                    self.finish_log_line(&pending);
                    log::warn!("Log line interrupted after {} bytes", bytes);
                    return Err(e.into());
                }
            };
            match next {
                Some(LOG_TERMINATOR) => break true,
                Some(byte) => {
                    pending.push(byte);
                    bytes += 1;
                    if pending.len() >= LOG_CHUNK_LEN {
                        self.emit_log_chunk(&mut pending);
                    }
                }
                None => break false,
            }
        };
        self.finish_log_line(&pending);

        if terminated {
            Ok(Outcome::Logged { bytes })
        } else {
            log::warn!("Log line timed out after {} bytes without a terminator", bytes);
            Ok(Outcome::LogTruncated { bytes })
        }
    }

    /// Write the complete characters in `pending`, keeping a split UTF-8
    /// sequence at the end for the next chunk.
    fn emit_log_chunk(&mut self, pending: &mut Vec<u8>) {
        let ready = pending.len() - incomplete_utf8_tail(pending);
        let text = String::from_utf8_lossy(&pending[..ready]).into_owned();
        self.to_console(text.as_bytes());
        pending.drain(..ready);
    }

    fn finish_log_line(&mut self, pending: &[u8]) {
        let text = String::from_utf8_lossy(pending).into_owned();
        self.to_console(text.as_bytes());
        self.to_console(b"\n");
    }

    fn to_console(&mut self, bytes: &[u8]) {
        let result = self.console.write_all(bytes).and_then(|()| self.console.flush());
        if let Err(e) = result {
            log::warn!("Failed to write log text to console: {}", e);
        }
    }
}

/// Length of an unfinished multi-byte UTF-8 sequence at the end of `bytes`.
fn incomplete_utf8_tail(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let byte = bytes[bytes.len() - back];
        if byte & 0xC0 != 0x80 {
            let needed = match byte {
                0xC0..=0xDF => 2,
                0xE0..=0xEF => 3,
                0xF0..=0xF7 => 4,
                _ => 1,
            };
            return if needed > back { back } else { 0 };
        }
    }
    0
}
