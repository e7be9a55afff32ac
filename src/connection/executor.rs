//! Command Executor
//!
//! This module runs the blocking request-response loop on top of an open
//! byte stream. Each call frames a command, writes and flushes it, then
//! decodes exactly one reply.
//!
//! ## Round Trip
//!
//! ```text
//! execute("SET", ["k", "v"])
//!        │
//!        ▼
//! ┌──────────────────────────────┐
//! │ Frame as list of bulk strings│  *3\r\n$3\r\nSET\r\n...
//! └──────────────┬───────────────┘
//!                │ write_all + flush
//!                ▼
//! ┌──────────────────────────────┐
//! │ Decode one reply             │  RespDecoder::next_object
//! └──────────────┬───────────────┘
//!                │
//!                ▼
//!   Error reply? ──yes──> Err(ExecutionError::Server)
//!                │
//!                no
//!                ▼
//!          Ok(RespObject)
//! ```
//!
//! There is no pipelining: a command is only sent once the previous reply has
//! been read. `execute` takes `&mut self`, so sharing an executor between
//! threads requires the caller's own lock.

use crate::protocol::{DecodeError, RespDecoder, RespObject};
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Errors that can occur while executing a command.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Writing or flushing the command failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The reply could not be decoded
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The server answered with an error reply
    #[error("{kind} {message}")]
    Server { kind: String, message: String },
}

impl ExecutionError {
    /// Returns true if the server rejected the command.
    ///
    /// Server errors leave the connection usable; transport and decode
    /// errors do not.
    pub fn is_server_error(&self) -> bool {
        matches!(self, ExecutionError::Server { .. })
    }
}

/// Counters for one executor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecutorStats {
    /// Commands written and flushed
    pub commands_sent: u64,
    /// Total bytes written
    pub bytes_written: u64,
    /// Replies that were error replies
    pub server_errors: u64,
}

impl ExecutorStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn command_sent(&mut self, bytes: usize) {
        self.commands_sent += 1;
        self.bytes_written += bytes as u64;
    }

    fn server_error(&mut self) {
        self.server_errors += 1;
    }
}

/// Executes commands over one stream.
///
/// The executor owns both halves of the stream for its whole lifetime: the
/// read half behind a [`RespDecoder`], the write half as given.
///
/// # Example
///
/// ```
/// use resplink::connection::Executor;
/// use resplink::protocol::RespObject;
/// use std::io::Cursor;
///
/// let replies = Cursor::new(b"+OK\r\n".to_vec());
/// let mut executor = Executor::new(replies, Vec::new());
///
/// let reply = executor.execute("SET", &["hello", "world"]).unwrap();
/// assert_eq!(reply, RespObject::simple_string("OK"));
/// assert_eq!(
///     executor.writer().as_slice(),
///     b"*3\r\n$3\r\nSET\r\n$5\r\nhello\r\n$5\r\nworld\r\n"
/// );
/// ```
#[derive(Debug)]
pub struct Executor<R, W> {
    /// Decoder over the read half
    decoder: RespDecoder<R>,

    /// The write half
    writer: W,

    stats: ExecutorStats,
}

impl<R: BufRead, W: Write> Executor<R, W> {
    /// Creates an executor from the read and write halves of a stream.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            decoder: RespDecoder::new(reader),
            writer,
            stats: ExecutorStats::new(),
        }
    }

    /// Sends a command with text arguments and waits for its reply.
    ///
    /// An error reply from the server becomes [`ExecutionError::Server`].
    pub fn execute(&mut self, name: &str, args: &[&str]) -> Result<RespObject, ExecutionError> {
        self.execute_bytes(name, args)
    }

    /// Sends a command with binary-safe arguments and waits for its reply.
    pub fn execute_bytes<N, I, A>(&mut self, name: N, args: I) -> Result<RespObject, ExecutionError>
    where
        N: AsRef<[u8]>,
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        let command = RespObject::command(name, args);
        self.send(&command)?;

        match self.decoder.next_object()? {
            RespObject::Error { kind, message } => {
                self.stats.server_error();
                Err(ExecutionError::Server { kind, message })
            }
            reply => Ok(reply),
        }
    }

    /// Writes the whole frame, then flushes so it actually leaves the buffer.
    fn send(&mut self, command: &RespObject) -> io::Result<()> {
        let written = command.write_to(&mut self.writer)?;
        self.writer.flush()?;
        self.stats.command_sent(written);
        Ok(())
    }

    /// Returns the counters for this executor.
    pub fn stats(&self) -> &ExecutorStats {
        &self.stats
    }

    /// Returns a reference to the read half.
    pub fn reader(&self) -> &R {
        self.decoder.get_ref()
    }

    /// Returns a reference to the write half.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Consumes the executor, returning the read and write halves.
    pub fn into_parts(self) -> (R, W) {
        (self.decoder.into_inner(), self.writer)
    }
}
