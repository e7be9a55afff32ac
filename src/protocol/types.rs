//! RESP (Redis Serialization Protocol) Data Types
//!
//! This module defines [`RespObject`], the value type carried by the protocol,
//! together with its wire encoding.
//!
//! ## Protocol Format
//!
//! Each RESP value starts with a type tag byte:
//! - `+` Simple String
//! - `-` Error (`<kind> <message>`)
//! - `:` Integer
//! - `$` Bulk String
//! - `*` List
//!
//! All units are terminated with CRLF (`\r\n`).
//!
//! ## Examples
//!
//! Simple String: `+OK\r\n`
//! Error: `-ERR unknown command\r\n`
//! Integer: `:1000\r\n`
//! Bulk String: `$5\r\nhello\r\n`
//! List: `*2\r\n$3\r\nGET\r\n$4\r\nname\r\n`
//! Null: `$-1\r\n`

use bytes::Bytes;
use std::fmt;
use std::io::{self, Write};

/// The CRLF terminator used in RESP protocol
pub const CRLF: &[u8] = b"\r\n";

/// RESP protocol type tags
pub mod tag {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const LIST: u8 = b'*';
}

/// Represents a value in the RESP protocol.
///
/// Values own their data and are never mutated after construction, so a
/// decoded reply can be handed around freely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespObject {
    /// Non-binary-safe text. Must not contain CR or LF.
    /// Format: `+<string>\r\n`
    SimpleString(String),

    /// An error reply, split on the first space into kind and message.
    /// Format: `-<kind> <message>\r\n`
    Error { kind: String, message: String },

    /// 64-bit signed integer.
    /// Format: `:<integer>\r\n`
    Integer(i64),

    /// Binary-safe, length-prefixed payload.
    /// Format: `$<length>\r\n<data>\r\n`
    BulkString(Bytes),

    /// Ordered sequence of values, possibly empty, possibly nested.
    /// Format: `*<count>\r\n<element1><element2>...`
    List(Vec<RespObject>),

    /// Absent value, received as `$-1\r\n` or `*-1\r\n`.
    Null,
}

impl RespObject {
    /// Creates a simple string value.
    ///
    /// # Example
    /// ```
    /// use resplink::protocol::types::RespObject;
    /// let ok = RespObject::simple_string("OK");
    /// assert_eq!(ok.serialize(), b"+OK\r\n");
    /// ```
    pub fn simple_string(s: impl Into<String>) -> Self {
        RespObject::SimpleString(s.into())
    }

    /// Creates an error value from its kind and message.
    ///
    /// # Example
    /// ```
    /// use resplink::protocol::types::RespObject;
    /// let err = RespObject::error("ERR", "unknown command");
    /// assert_eq!(err.serialize(), b"-ERR unknown command\r\n");
    /// ```
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        RespObject::Error {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Creates an integer value.
    pub fn integer(n: i64) -> Self {
        RespObject::Integer(n)
    }

    /// Creates a bulk string value.
    pub fn bulk_string(data: impl Into<Bytes>) -> Self {
        RespObject::BulkString(data.into())
    }

    /// Creates a list value.
    pub fn list(values: Vec<RespObject>) -> Self {
        RespObject::List(values)
    }

    /// Creates a null value.
    pub fn null() -> Self {
        RespObject::Null
    }

    /// Builds the multi-bulk frame for a command: a list whose first element
    /// is the command name followed by each argument, all as bulk strings.
    ///
    /// # Example
    /// ```
    /// use resplink::protocol::types::RespObject;
    /// let cmd = RespObject::command("GET", ["name"]);
    /// assert_eq!(cmd.serialize(), b"*2\r\n$3\r\nGET\r\n$4\r\nname\r\n");
    /// ```
    pub fn command<N, I, A>(name: N, args: I) -> Self
    where
        N: AsRef<[u8]>,
        I: IntoIterator<Item = A>,
        A: AsRef<[u8]>,
    {
        let args = args.into_iter();
        let mut parts = Vec::with_capacity(1 + args.size_hint().0);
        parts.push(RespObject::BulkString(Bytes::copy_from_slice(name.as_ref())));
        parts.extend(args.map(|arg| RespObject::BulkString(Bytes::copy_from_slice(arg.as_ref()))));
        RespObject::List(parts)
    }

    /// Serializes the value to bytes for sending over the wire.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the value into an existing buffer.
    ///
    /// This is more efficient than `serialize()` when you want to reuse a buffer.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            RespObject::SimpleString(s) => {
                buf.push(tag::SIMPLE_STRING);
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespObject::Error { kind, message } => {
                buf.push(tag::ERROR);
                buf.extend_from_slice(kind.as_bytes());
                buf.push(b' ');
                buf.extend_from_slice(message.as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespObject::Integer(n) => {
                buf.push(tag::INTEGER);
                buf.extend_from_slice(n.to_string().as_bytes());
                buf.extend_from_slice(CRLF);
            }
            RespObject::BulkString(data) => {
                buf.push(tag::BULK_STRING);
                buf.extend_from_slice(data.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                buf.extend_from_slice(data);
                buf.extend_from_slice(CRLF);
            }
            RespObject::List(values) => {
                buf.push(tag::LIST);
                buf.extend_from_slice(values.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                for value in values {
                    value.serialize_into(buf);
                }
            }
            RespObject::Null => {
                buf.push(tag::BULK_STRING);
                buf.extend_from_slice(b"-1");
                buf.extend_from_slice(CRLF);
            }
        }
    }

    /// Writes the encoded value to `writer` with a single `write_all`.
    ///
    /// Returns the number of bytes written. The writer is not flushed.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<usize> {
        let buf = self.serialize();
        writer.write_all(&buf)?;
        Ok(buf.len())
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, RespObject::Null)
    }

    /// Returns true if this value is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, RespObject::Error { .. })
    }

    /// Attempts to extract the inner string from SimpleString or BulkString.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RespObject::SimpleString(s) => Some(s),
            RespObject::BulkString(b) => std::str::from_utf8(b).ok(),
            _ => None,
        }
    }

    /// Attempts to extract the inner bytes from BulkString.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RespObject::BulkString(b) => Some(b),
            _ => None,
        }
    }

    /// Attempts to extract the inner integer.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            RespObject::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract the inner list.
    pub fn as_list(&self) -> Option<&[RespObject]> {
        match self {
            RespObject::List(items) => Some(items),
            _ => None,
        }
    }

    /// Consumes self and returns the inner list if this is a List variant.
    pub fn into_list(self) -> Option<Vec<RespObject>> {
        match self {
            RespObject::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for RespObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RespObject::SimpleString(s) => write!(f, "{}", s),
            RespObject::Error { kind, message } => write!(f, "(error) {} {}", kind, message),
            RespObject::Integer(n) => write!(f, "(integer) {}", n),
            RespObject::BulkString(data) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    write!(f, "\"{}\"", s)
                } else {
                    write!(f, "(binary data, {} bytes)", data.len())
                }
            }
            RespObject::List(values) => {
                if values.is_empty() {
                    write!(f, "(empty list)")
                } else {
                    for (i, v) in values.iter().enumerate() {
                        if i > 0 {
                            writeln!(f)?;
                        }
                        write!(f, "{}) {}", i + 1, v)?;
                    }
                    Ok(())
                }
            }
            RespObject::Null => write!(f, "(nil)"),
        }
    }
}
