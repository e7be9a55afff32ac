//! RESP Protocol Implementation
//!
//! This module provides the Redis Serialization Protocol (RESP) codec used by
//! the executor.
//!
//! ## Overview
//!
//! RESP is a simple, binary-safe protocol used by Redis for client-server communication.
//! Every value starts with a one-byte type tag and every unit ends with CRLF.
//!
//! ## Modules
//!
//! - `types`: Defines the `RespObject` enum and its wire encoding
//! - `decoder`: Blocking decoder that reads one value at a time from a `BufRead`
//!
//! ## Example
//!
//! ```
//! use resplink::protocol::{decode_message, RespObject};
//!
//! // Encoding a command
//! let command = RespObject::command("GET", ["name"]);
//! let bytes = command.serialize();
//! assert_eq!(bytes, b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n");
//!
//! // Decoding a reply
//! let (value, consumed) = decode_message(b"$4\r\nAriz\r\n").unwrap();
//! assert_eq!(value, RespObject::bulk_string("Ariz"));
//! assert_eq!(consumed, 10);
//! ```

pub mod decoder;
pub mod types;

// Re-export commonly used types for convenience
pub use decoder::{decode_message, DecodeError, DecodeResult, RespDecoder};
pub use types::RespObject;
