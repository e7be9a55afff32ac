//! # resplink - A Blocking RESP Client Core
//!
//! resplink speaks the Redis Serialization Protocol (RESP) over any byte
//! stream. It encodes commands, decodes replies and runs one synchronous
//! request-response round trip per call.
//!
//! ## Features
//!
//! - **Closed value type**: [`RespObject`] covers every wire type and is matched
//!   exhaustively
//! - **Binary-safe**: bulk payloads are `bytes::Bytes`, framed by length alone
//! - **Bounded decoding**: nesting depth, line length and bulk size are capped
//! - **Transport-agnostic**: the executor runs on any `BufRead` + `Write` pair;
//!   a TCP helper is included
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              resplink                                   │
//! │                                                                         │
//! │  ┌─────────────┐   command   ┌─────────────┐   bytes   ┌─────────────┐  │
//! │  │   Caller    │────────────>│  Executor   │──────────>│   Stream    │  │
//! │  │             │<────────────│             │<──────────│  (TCP, ...) │  │
//! │  └─────────────┘   reply     └──────┬──────┘           └─────────────┘  │
//! │                                     │                                   │
//! │                     ┌───────────────┴───────────────┐                   │
//! │                     ▼                               ▼                   │
//! │              ┌─────────────┐                 ┌─────────────┐            │
//! │              │ RespObject  │                 │ RespDecoder │            │
//! │              │ (encode)    │                 │ (decode)    │            │
//! │              └─────────────┘                 └─────────────┘            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use resplink::{connect, ConnectOptions, ExecutionError};
//!
//! let mut executor = connect(&ConnectOptions::default())?;
//!
//! let reply = executor.execute("SET", &["hello", "world"])?;
//! assert_eq!(reply.as_str(), Some("OK"));
//!
//! match executor.execute("SET", &["hello"]) {
//!     Err(ExecutionError::Server { kind, message }) => {
//!         eprintln!("server said {kind}: {message}");
//!     }
//!     other => println!("{:?}", other),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Module Overview
//!
//! - [`protocol`]: RESP value type, encoder and decoder
//! - [`connection`]: Command executor and TCP connection setup
//!
//! ## Error Handling
//!
//! Nothing is retried or logged inside the codec or executor. Transport and
//! decode failures leave the stream in an unknown position and the connection
//! should be dropped. A server error reply is a successful decode and the
//! connection stays usable.

pub mod connection;
pub mod protocol;

// Re-export commonly used types for convenience
pub use connection::{
    connect, ConnectError, ConnectOptions, ExecutionError, Executor, ExecutorStats, TcpExecutor,
};
pub use protocol::{decode_message, DecodeError, RespDecoder, RespObject};

/// The default port servers listen on (same as Redis)
pub const DEFAULT_PORT: u16 = 6379;

/// The default host to connect to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of resplink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
