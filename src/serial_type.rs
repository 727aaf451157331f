//! Serial types: the per-column type+length tags SQLite stores in a record
//! header, per <https://www.sqlite.org/fileformat.html#record_format>.
//!
//! Only the serial types this engine supports are decoded: NULL (0), the
//! four signed-integer widths (1-4), the constants 0 and 1 (8, 9), and
//! text/blob (odd/even N >= 12). Floating point (7), the 48- and 64-bit
//! integer forms (5, 6), and the two reserved codes (10, 11) are rejected
//! with `Error::Unsupported` rather than silently coerced.

use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;

use crate::value::Value;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("serial type {0} is not supported by this engine")]
    Unsupported(u64),
    #[error("record payload ended before a column's declared content length")]
    Truncated,
    #[error("column text/blob bytes were not valid UTF-8: {0}")]
    InvalidText(String),
}

/// The number of content bytes a serial type occupies in a record body.
pub fn content_length(serial_type: u64) -> Result<usize, Error> {
    match serial_type {
        0 | 8 | 9 => Ok(0),
        1 => Ok(1),
        2 => Ok(2),
        3 => Ok(3),
        4 => Ok(4),
        5 | 6 | 7 | 10 | 11 => Err(Error::Unsupported(serial_type)),
        n if n >= 12 => Ok(((n - 12) / 2) as usize),
        n => Err(Error::Unsupported(n)),
    }
}

/// Decodes one column's content bytes into a `Value`, given its serial type.
/// `bytes` must be exactly `content_length(serial_type)` bytes long; the
/// record decoder slices the payload by the header's declared lengths
/// before calling here.
pub fn decode_value(serial_type: u64, bytes: &[u8]) -> Result<Value, Error> {
    match serial_type {
        0 => Ok(Value::Null),
        8 => Ok(Value::Integer(0)),
        9 => Ok(Value::Integer(1)),
        1 => Ok(Value::Integer(
            std::io::Cursor::new(bytes).read_i8().map_err(|_| Error::Truncated)? as i64,
        )),
        2 => Ok(Value::Integer(
            std::io::Cursor::new(bytes)
                .read_i16::<BigEndian>()
                .map_err(|_| Error::Truncated)? as i64,
        )),
        3 => Ok(Value::Integer(read_i24(bytes)?)),
        4 => Ok(Value::Integer(
            std::io::Cursor::new(bytes)
                .read_i32::<BigEndian>()
                .map_err(|_| Error::Truncated)? as i64,
        )),
        5 | 6 | 7 | 10 | 11 => Err(Error::Unsupported(serial_type)),
        n if n >= 12 && n % 2 == 0 => Ok(Value::Blob(bytes.to_vec())),
        n if n >= 12 => String::from_utf8(bytes.to_vec())
            .map(Value::Text)
            .map_err(|e| Error::InvalidText(e.to_string())),
        n => Err(Error::Unsupported(n)),
    }
}

/// Reads a sign-extended 24-bit big-endian integer, widening it into an i32
/// before returning, the way the teacher's `serial_type.rs` does.
fn read_i24(bytes: &[u8]) -> Result<i64, Error> {
    let mut widened = [0u8; 4];
    std::io::Cursor::new(bytes)
        .read_exact(&mut widened[1..])
        .map_err(|_| Error::Truncated)?;
    widened[0] = if widened[1] & 0x80 != 0 { 0xff } else { 0x00 };
    Ok(i32::from_be_bytes(widened) as i64)
}
