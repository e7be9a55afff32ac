//! Connection Module
//!
//! This module drives command/reply round trips over a byte stream.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  connect(&ConnectOptions)                   │
//! │                        (tcp.rs)                             │
//! └──────────────────────┬──────────────────────────────────────┘
//!                        │
//!                        │ BufReader / BufWriter halves
//!                        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Executor                             │
//! │                                                             │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐      │
//! │  │ Frame cmd   │───>│ Write+flush │───>│ Decode reply│      │
//! │  └─────────────┘    └─────────────┘    └─────────────┘      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The executor works on any `BufRead` + `Write` pair, so tests and callers
//! with their own transport can skip `tcp.rs` entirely.
//!
//! ## Example
//!
//! ```no_run
//! use resplink::connection::{connect, ConnectOptions};
//!
//! let mut executor = connect(&ConnectOptions::new("127.0.0.1", 6379))?;
//! executor.execute("SET", &["name", "Ariz"])?;
//! let name = executor.execute("GET", &["name"])?;
//! println!("{}", name);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod executor;
pub mod tcp;

// Re-export commonly used types
pub use executor::{ExecutionError, Executor, ExecutorStats};
pub use tcp::{connect, from_stream, ConnectError, ConnectOptions, TcpExecutor};
