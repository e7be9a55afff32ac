//! Blocking RESP Decoder
//!
//! This module turns a byte stream into [`RespObject`] values. It reads from any
//! [`BufRead`] source one line at a time and never buffers more than the frame
//! it is currently decoding. Header and noise lines are capped at
//! [`MAX_LINE_LENGTH`]; bulk payload reads stop one byte past the declared
//! length.
//!
//! ## How the Decoder Works
//!
//! 1. Read one line (up to and including `\n`).
//! 2. Skip lines that do not start with a type tag (`+ - : $ *`).
//! 3. Dispatch on the tag. Bulk strings keep reading lines until the declared
//!    length plus the CRLF terminator has arrived; lists decode one value per
//!    declared element.
//!
//! Each call to [`RespDecoder::next_object`] consumes exactly one complete value.
//! After a [`DecodeError`] the stream position is unspecified and the
//! connection should not be reused.

use crate::protocol::types::{tag, RespObject, CRLF};
use bytes::Bytes;
use std::io::{self, BufRead, Read};
use thiserror::Error;

/// Errors that can occur while decoding RESP data.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The underlying stream failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended before a complete value was read
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// Invalid UTF-8 in a simple string or error line
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(String),

    /// Invalid integer or length field
    #[error("invalid integer: {0}")]
    InvalidInteger(String),

    /// Error line without the space separating kind and message
    #[error("invalid error string: {0}")]
    InvalidErrorString(String),

    /// Bulk string length is negative (but not -1 for null)
    #[error("invalid bulk string length: {0}")]
    InvalidBulkLength(i64),

    /// List length is negative (but not -1 for null)
    #[error("invalid list length: {0}")]
    InvalidListLength(i64),

    /// The bytes read for a bulk string do not match its declared length
    #[error("length of string does not match: declared {declared} bytes, read {received} bytes including terminator")]
    LengthMismatch { declared: usize, received: usize },

    /// Bulk string payload was not followed by CRLF
    #[error("bulk string missing trailing CRLF")]
    MissingTerminator,

    /// The declared bulk length exceeds the maximum allowed size
    #[error("message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// A header or noise line ran past [`MAX_LINE_LENGTH`] without LF
    #[error("line too long: no LF within {0} bytes")]
    LineTooLong(usize),

    /// Lists nested deeper than [`MAX_NESTING_DEPTH`]
    #[error("maximum nesting depth exceeded: {0}")]
    NestingTooDeep(usize),
}

/// Result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Maximum size for a single bulk string (512 MB, same as Redis)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Maximum length of a header, simple string, error or noise line
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Upper bound on the buffer reserved before a bulk payload arrives
const INITIAL_BULK_CAPACITY: usize = 64 * 1024;

/// Maximum list nesting depth (prevent stack overflow)
pub const MAX_NESTING_DEPTH: usize = 32;

/// Frame kinds, one per wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    SimpleString,
    Error,
    Integer,
    BulkString,
    List,
}

impl Tag {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            tag::SIMPLE_STRING => Some(Tag::SimpleString),
            tag::ERROR => Some(Tag::Error),
            tag::INTEGER => Some(Tag::Integer),
            tag::BULK_STRING => Some(Tag::BulkString),
            tag::LIST => Some(Tag::List),
            _ => None,
        }
    }
}

/// A blocking RESP decoder bound to the read side of a stream.
///
/// # Example
///
/// ```
/// use resplink::protocol::{RespDecoder, RespObject};
///
/// let mut decoder = RespDecoder::new(&b"*2\r\n:1\r\n+OK\r\n"[..]);
/// let value = decoder.next_object().unwrap();
/// assert_eq!(
///     value,
///     RespObject::list(vec![RespObject::integer(1), RespObject::simple_string("OK")])
/// );
/// ```
#[derive(Debug)]
pub struct RespDecoder<R> {
    reader: R,
}

impl<R: BufRead> RespDecoder<R> {
    /// Creates a decoder reading from `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Returns a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.reader
    }

    /// Consumes the decoder, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Reads exactly one complete value from the stream.
    ///
    /// Blocks until the value has arrived or the stream fails.
    pub fn next_object(&mut self) -> DecodeResult<RespObject> {
        self.decode_value(0)
    }

    fn decode_value(&mut self, depth: usize) -> DecodeResult<RespObject> {
        if depth > MAX_NESTING_DEPTH {
            return Err(DecodeError::NestingTooDeep(MAX_NESTING_DEPTH));
        }

        let (kind, line) = self.read_tagged_line()?;
        let body = strip_line_ending(&line[1..]);

        match kind {
            Tag::SimpleString => decode_simple_string(body),
            Tag::Error => decode_error(body),
            Tag::Integer => decode_integer(body),
            Tag::BulkString => self.decode_bulk_string(body),
            Tag::List => self.decode_list(body, depth),
        }
    }

    /// Reads lines until one starts with a known tag, discarding the rest.
    fn read_tagged_line(&mut self) -> DecodeResult<(Tag, Vec<u8>)> {
        loop {
            let mut line = Vec::new();
            self.read_bounded(&mut line, MAX_LINE_LENGTH)?;
            if line.last() != Some(&b'\n') {
                return Err(DecodeError::LineTooLong(MAX_LINE_LENGTH));
            }
            if let Some(kind) = Tag::from_byte(line[0]) {
                return Ok((kind, line));
            }
        }
    }

    /// Appends at most `limit` bytes to `buf`, stopping after the first LF.
    ///
    /// Returns the number of bytes read. Hitting `limit` without a LF is not
    /// an error here; the stream ending before a LF or the limit is.
    fn read_bounded(&mut self, buf: &mut Vec<u8>, limit: usize) -> DecodeResult<usize> {
        let read = (&mut self.reader).take(limit as u64).read_until(b'\n', buf)?;
        if read == 0 || (read < limit && buf.last() != Some(&b'\n')) {
            return Err(DecodeError::UnexpectedEof);
        }
        Ok(read)
    }

    /// Decodes a bulk string: `$<length>\r\n<data>\r\n`
    fn decode_bulk_string(&mut self, body: &[u8]) -> DecodeResult<RespObject> {
        let length = parse_i64(body)?;

        if length == -1 {
            return Ok(RespObject::Null);
        }
        if length < 0 {
            return Err(DecodeError::InvalidBulkLength(length));
        }

        let length = usize::try_from(length).map_err(|_| DecodeError::InvalidBulkLength(length))?;
        if length > MAX_BULK_SIZE {
            return Err(DecodeError::MessageTooLarge {
                size: length,
                max: MAX_BULK_SIZE,
            });
        }

        // Lines are only the read granularity; the declared length decides
        // where the payload ends. Each read may overrun by one byte at most,
        // which is enough to detect a mismatch.
        let expected = length + CRLF.len();
        let mut data = Vec::with_capacity(expected.min(INITIAL_BULK_CAPACITY));
        while data.len() < expected {
            let remaining = expected - data.len();
            self.read_bounded(&mut data, remaining + 1)?;
        }

        if data.len() != expected {
            return Err(DecodeError::LengthMismatch {
                declared: length,
                received: data.len(),
            });
        }
        if &data[length..] != CRLF {
            return Err(DecodeError::MissingTerminator);
        }

        let mut payload = Bytes::from(data);
        payload.truncate(length);
        Ok(RespObject::BulkString(payload))
    }

    /// Decodes a list: `*<count>\r\n<elements...>`
    fn decode_list(&mut self, body: &[u8], depth: usize) -> DecodeResult<RespObject> {
        let count = parse_i64(body)?;

        if count == -1 {
            return Ok(RespObject::Null);
        }
        if count < 0 {
            return Err(DecodeError::InvalidListLength(count));
        }

        let count = usize::try_from(count).map_err(|_| DecodeError::InvalidListLength(count))?;

        // Cap the preallocation; a hostile count must not reserve memory up front.
        let mut elements = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            elements.push(self.decode_value(depth + 1)?);
        }

        Ok(RespObject::List(elements))
    }
}

/// Decodes a simple string: `+<string>\r\n`
fn decode_simple_string(body: &[u8]) -> DecodeResult<RespObject> {
    let s = to_str(body)?;
    Ok(RespObject::SimpleString(s.to_string()))
}

/// Decodes an error: `-<kind> <message>\r\n`
fn decode_error(body: &[u8]) -> DecodeResult<RespObject> {
    let s = to_str(body)?;
    match s.split_once(' ') {
        Some((kind, message)) => Ok(RespObject::Error {
            kind: kind.to_string(),
            message: message.to_string(),
        }),
        None => Err(DecodeError::InvalidErrorString(s.to_string())),
    }
}

/// Decodes an integer: `:<integer>\r\n`
fn decode_integer(body: &[u8]) -> DecodeResult<RespObject> {
    parse_i64(body).map(RespObject::Integer)
}

fn to_str(body: &[u8]) -> DecodeResult<&str> {
    std::str::from_utf8(body).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))
}

fn parse_i64(body: &[u8]) -> DecodeResult<i64> {
    let s = to_str(body)?;
    s.parse()
        .map_err(|_| DecodeError::InvalidInteger(s.to_string()))
}

/// Strips a trailing `\n` and then a trailing `\r`, if present.
#[inline]
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Helper function to decode a single RESP value from a byte slice.
///
/// Returns the value and the number of bytes consumed, including any noise
/// lines skipped before the frame.
pub fn decode_message(buf: &[u8]) -> DecodeResult<(RespObject, usize)> {
    let mut decoder = RespDecoder::new(buf);
    let value = decoder.next_object()?;
    let consumed = buf.len() - decoder.get_ref().len();
    Ok((value, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn decode(input: &[u8]) -> DecodeResult<RespObject> {
        decode_message(input).map(|(value, _)| value)
    }

    #[test]
    fn test_decode_simple_string() {
        let (value, consumed) = decode_message(b"+OK\r\n").unwrap();
        assert_eq!(value, RespObject::simple_string("OK"));
        assert_eq!(consumed, 5);
    }

    #[test]
    fn test_decode_error() {
        let value = decode(b"-ERR wrong number of arguments\r\n").unwrap();
        assert_eq!(value, RespObject::error("ERR", "wrong number of arguments"));
    }

    #[test]
    fn test_decode_error_with_empty_message() {
        let value = decode(b"-ERR \r\n").unwrap();
        assert_eq!(value, RespObject::error("ERR", ""));
    }

    #[test]
    fn test_decode_error_without_space() {
        let result = decode(b"-ERR\r\n");
        assert!(matches!(result, Err(DecodeError::InvalidErrorString(ref s)) if s == "ERR"));
    }

    #[test]
    fn test_decode_integer() {
        assert_eq!(decode(b":1000\r\n").unwrap(), RespObject::integer(1000));
        assert_eq!(decode(b":-42\r\n").unwrap(), RespObject::integer(-42));
    }

    #[test]
    fn test_decode_invalid_integer() {
        let result = decode(b":not_a_number\r\n");
        assert!(matches!(result, Err(DecodeError::InvalidInteger(_))));
    }

    #[test]
    fn test_decode_bulk_string() {
        let (value, consumed) = decode_message(b"$5\r\nhello\r\n").unwrap();
        assert_eq!(value, RespObject::bulk_string("hello"));
        assert_eq!(consumed, 11);
    }

    #[test]
    fn test_decode_empty_bulk_string() {
        assert_eq!(decode(b"$0\r\n\r\n").unwrap(), RespObject::bulk_string(""));
    }

    #[test]
    fn test_decode_bulk_string_with_embedded_crlf() {
        let payload: &[u8] = b"a\r\nb\nc\r\n\x00d";
        let mut input = format!("${}\r\n", payload.len()).into_bytes();
        input.extend_from_slice(payload);
        input.extend_from_slice(b"\r\n");

        let value = decode(&input).unwrap();
        assert_eq!(value.as_bytes(), Some(payload));
    }

    #[test]
    fn test_decode_length_mismatch() {
        // Declared 5, only 3 bytes of payload before the next frame
        let result = decode(b"$5\r\nabc\r\n+OK\r\n");
        assert!(matches!(
            result,
            Err(DecodeError::LengthMismatch { declared: 5, received: 8 })
        ));
    }

    #[test]
    fn test_decode_overlong_bulk_line_stops_past_declared_length() {
        // Declared 1 byte, followed by a 1 MiB line: only n+3 bytes are read
        let mut input = b"$1\r\n".to_vec();
        input.extend(std::iter::repeat(b'a').take(1024 * 1024));
        input.push(b'\n');

        let mut decoder = RespDecoder::new(input.as_slice());
        let result = decoder.next_object();
        assert!(matches!(
            result,
            Err(DecodeError::LengthMismatch { declared: 1, received: 4 })
        ));
        // The rest of the line was left unread
        assert_eq!(decoder.get_ref().len(), 1024 * 1024 - 4 + 1);
    }

    #[test]
    fn test_decode_header_line_too_long() {
        let mut input = vec![b'+'];
        input.extend(std::iter::repeat(b'a').take(MAX_LINE_LENGTH + 16));
        input.extend_from_slice(b"\r\n");

        let result = decode(&input);
        assert!(matches!(result, Err(DecodeError::LineTooLong(MAX_LINE_LENGTH))));
    }

    #[test]
    fn test_noise_line_too_long() {
        let mut input = vec![b'x'; MAX_LINE_LENGTH * 2];
        input.extend_from_slice(b"\n+OK\r\n");

        let result = decode(&input);
        assert!(matches!(result, Err(DecodeError::LineTooLong(_))));
    }

    #[test]
    fn test_decode_line_at_length_limit() {
        let mut input = vec![b'+'];
        input.extend(std::iter::repeat(b'a').take(MAX_LINE_LENGTH - 3));
        input.extend_from_slice(b"\r\n");
        assert_eq!(input.len(), MAX_LINE_LENGTH);

        let value = decode(&input).unwrap();
        assert_eq!(value.as_str().map(str::len), Some(MAX_LINE_LENGTH - 3));
    }

    #[test]
    fn test_decode_short_bulk_string_at_end_of_stream() {
        let result = decode(b"$5\r\nabc\r\n");
        assert!(matches!(result, Err(DecodeError::UnexpectedEof)));
    }

    #[test]
    fn test_decode_bulk_string_missing_terminator() {
        // 7 bytes land exactly on n+2, but the last two are not CRLF
        let result = decode(b"$5\r\nabcdef\n");
        assert!(matches!(result, Err(DecodeError::MissingTerminator)));
    }

    #[test]
    fn test_decode_null_bulk_string() {
        assert_eq!(decode(b"$-1\r\n").unwrap(), RespObject::Null);
    }

    #[test]
    fn test_decode_null_list() {
        assert_eq!(decode(b"*-1\r\n").unwrap(), RespObject::Null);
    }

    #[test]
    fn test_decode_other_negative_lengths() {
        assert!(matches!(
            decode(b"$-2\r\n"),
            Err(DecodeError::InvalidBulkLength(-2))
        ));
        assert!(matches!(
            decode(b"*-5\r\n"),
            Err(DecodeError::InvalidListLength(-5))
        ));
    }

    #[test]
    fn test_decode_bulk_string_too_large() {
        let result = decode(b"$999999999999\r\n");
        assert!(matches!(result, Err(DecodeError::MessageTooLarge { .. })));
    }

    #[test]
    fn test_decode_empty_list() {
        assert_eq!(decode(b"*0\r\n").unwrap(), RespObject::list(vec![]));
    }

    #[test]
    fn test_decode_mixed_list() {
        let value = decode(b"*3\r\n+OK\r\n:100\r\n$5\r\nhello\r\n").unwrap();
        assert_eq!(
            value,
            RespObject::list(vec![
                RespObject::simple_string("OK"),
                RespObject::integer(100),
                RespObject::bulk_string("hello"),
            ])
        );
    }

    #[test]
    fn test_decode_three_levels_of_nesting() {
        let input = b"*2\r\n*2\r\n*2\r\n$1\r\na\r\n:1\r\n+x\r\n:2\r\n";
        let value = decode(input).unwrap();
        assert_eq!(
            value,
            RespObject::list(vec![
                RespObject::list(vec![
                    RespObject::list(vec![
                        RespObject::bulk_string("a"),
                        RespObject::integer(1),
                    ]),
                    RespObject::simple_string("x"),
                ]),
                RespObject::integer(2),
            ])
        );
    }

    #[test]
    fn test_decode_list_element_failure_is_not_partial() {
        let result = decode(b"*2\r\n:1\r\n:oops\r\n");
        assert!(matches!(result, Err(DecodeError::InvalidInteger(_))));
    }

    #[test]
    fn test_decode_rejects_deep_nesting() {
        let input = "*1\r\n".repeat(MAX_NESTING_DEPTH + 2) + ":1\r\n";
        let result = decode(input.as_bytes());
        assert!(matches!(result, Err(DecodeError::NestingTooDeep(_))));
    }

    #[test]
    fn test_decode_accepts_max_nesting() {
        let input = "*1\r\n".repeat(MAX_NESTING_DEPTH) + ":1\r\n";
        assert!(decode(input.as_bytes()).is_ok());
    }

    #[test]
    fn test_noise_lines_are_skipped() {
        let framed = decode(b"*1\r\n$2\r\nhi\r\n").unwrap();
        let noisy = decode(b"hello there\r\n\r\n@junk\n*1\r\n$2\r\nhi\r\n").unwrap();
        assert_eq!(framed, noisy);
    }

    #[test]
    fn test_noise_until_end_of_stream() {
        let result = decode(b"garbage\r\nmore garbage\r\n");
        assert!(matches!(result, Err(DecodeError::UnexpectedEof)));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(decode(b""), Err(DecodeError::UnexpectedEof)));
    }

    #[test]
    fn test_unterminated_line() {
        assert!(matches!(decode(b"+OK"), Err(DecodeError::UnexpectedEof)));
    }

    #[test]
    fn test_consecutive_values_from_one_stream() {
        let mut decoder = RespDecoder::new(Cursor::new(b"+OK\r\n:5\r\n$-1\r\n".to_vec()));
        assert_eq!(decoder.next_object().unwrap(), RespObject::simple_string("OK"));
        assert_eq!(decoder.next_object().unwrap(), RespObject::integer(5));
        assert_eq!(decoder.next_object().unwrap(), RespObject::Null);
        assert!(matches!(decoder.next_object(), Err(DecodeError::UnexpectedEof)));
    }

    #[test]
    fn test_roundtrip() {
        let values = vec![
            RespObject::simple_string("OK"),
            RespObject::error("WRONGTYPE", "Operation against a key holding the wrong kind of value"),
            RespObject::integer(i64::MIN),
            RespObject::integer(i64::MAX),
            RespObject::bulk_string(Bytes::from_static(b"\r\n\r\n\n\x00\xff")),
            RespObject::Null,
            RespObject::list(vec![]),
            RespObject::list(vec![
                RespObject::bulk_string("SET"),
                RespObject::list(vec![RespObject::list(vec![RespObject::integer(-1)])]),
                RespObject::Null,
            ]),
        ];

        for original in values {
            let encoded = original.serialize();
            let (decoded, consumed) = decode_message(&encoded).unwrap();
            assert_eq!(decoded, original);
            assert_eq!(consumed, encoded.len());
        }
    }
}
