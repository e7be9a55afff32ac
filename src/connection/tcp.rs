//! TCP Connection Setup
//!
//! Dials a server and wraps the socket in an [`Executor`]. The socket is split
//! into a buffered read half and a buffered write half that share one
//! underlying file descriptor.
//!
//! Timeouts are socket options: a read timeout surfaces as a
//! [`DecodeError::Io`](crate::protocol::DecodeError::Io) from `execute`, a
//! write timeout as [`ExecutionError::Io`](super::ExecutionError::Io).

use crate::connection::executor::Executor;
use crate::{DEFAULT_HOST, DEFAULT_PORT};
use std::io::{self, BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default time allowed for the TCP handshake
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// An executor over a TCP socket.
pub type TcpExecutor = Executor<BufReader<TcpStream>, BufWriter<TcpStream>>;

/// Options for dialing a server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Host name or IP address
    pub host: String,

    /// TCP port
    pub port: u16,

    /// Handshake timeout; `None` blocks until the OS gives up
    pub connect_timeout: Option<Duration>,

    /// Per-read timeout applied to the socket
    pub read_timeout: Option<Duration>,

    /// Per-write timeout applied to the socket
    pub write_timeout: Option<Duration>,

    /// Disable Nagle's algorithm
    pub nodelay: bool,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            read_timeout: None,
            write_timeout: None,
            nodelay: true,
        }
    }
}

impl ConnectOptions {
    /// Creates options for `host:port` with default timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Sets the read and write timeouts together.
    pub fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self.write_timeout = timeout;
        self
    }

    /// Sets the handshake timeout.
    pub fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Returns the address as `host:port`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Errors that can occur while establishing a connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The address could not be resolved
    #[error("failed to resolve {address}: {source}")]
    Resolve { address: String, source: io::Error },

    /// Resolution succeeded but returned nothing
    #[error("no addresses found for {0}")]
    NoAddress(String),

    /// Every resolved address refused or timed out
    #[error("failed to connect to {address}: {source}")]
    Connect { address: String, source: io::Error },

    /// Applying socket options or splitting the stream failed
    #[error("failed to configure socket: {0}")]
    Socket(#[from] io::Error),
}

/// Connects to the server described by `options`.
///
/// Each resolved address is tried in order; the first successful handshake
/// wins.
pub fn connect(options: &ConnectOptions) -> Result<TcpExecutor, ConnectError> {
    let address = options.address();

    let addrs: Vec<SocketAddr> = address
        .to_socket_addrs()
        .map_err(|source| ConnectError::Resolve {
            address: address.clone(),
            source,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(ConnectError::NoAddress(address));
    }

    let mut last_error = None;
    for addr in &addrs {
        debug!(server = %addr, "Dialing");

        let attempt = match options.connect_timeout {
            Some(timeout) => TcpStream::connect_timeout(addr, timeout),
            None => TcpStream::connect(addr),
        };

        match attempt {
            Ok(stream) => {
                info!(server = %addr, "Connected");
                return Ok(from_stream(stream, options)?);
            }
            Err(e) => {
                warn!(server = %addr, error = %e, "Connection attempt failed");
                last_error = Some(e);
            }
        }
    }

    Err(ConnectError::Connect {
        address,
        source: last_error
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no address attempted")),
    })
}

/// Wraps an already-connected socket in an executor, applying the socket
/// options from `options`.
pub fn from_stream(stream: TcpStream, options: &ConnectOptions) -> io::Result<TcpExecutor> {
    stream.set_nodelay(options.nodelay)?;
    stream.set_read_timeout(options.read_timeout)?;
    stream.set_write_timeout(options.write_timeout)?;

    let read_half = stream.try_clone()?;
    debug!(
        nodelay = options.nodelay,
        read_timeout = ?options.read_timeout,
        write_timeout = ?options.write_timeout,
        "Socket configured"
    );

    Ok(Executor::new(BufReader::new(read_half), BufWriter::new(stream)))
}
