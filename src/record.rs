//! Decodes a record payload (record header + packed values) into typed
//! `Value`s, per <https://www.sqlite.org/fileformat.html#record_format>.
//! Cells hold records; table cells hold one row each, index cells hold a
//! key plus the rowid it refers to.

use crate::schema::Table;
use crate::serial_type;
use crate::value::Value;
use crate::varint;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("truncated varint while reading a record header: {0}")]
    Varint(#[from] varint::Error),
    #[error("record header declares {declared} columns but {found} were requested")]
    ColumnCountMismatch { declared: usize, found: usize },
    #[error("serial type decode failed: {0}")]
    SerialType(#[from] serial_type::Error),
    #[error("index entry has no trailing rowid value")]
    MissingRowid,
    #[error("index entry's trailing rowid column did not decode to an integer")]
    NonIntegerRowid,
}

/// A decoded row: its rowid, plus an ordered column-name -> value mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub rowid: i64,
    values: Vec<(String, Value)>,
}

impl Record {
    /// A pseudo-row synthesized from an index seek's rowid alone, with no
    /// other column available (§4.6: projecting other columns through an
    /// index is a known limitation).
    pub fn with_rowid_only(rowid: i64) -> Record {
        Record { rowid, values: vec![("id".to_string(), Value::Integer(rowid))] }
    }

    /// Lookup by absent column yields NULL, per §3: callers never see a
    /// missing-column error, only `Value::Null`.
    pub fn get(&self, col: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == col)
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Reads the record header (`header_size` varint, then `n` serial-type
/// varints) and decodes exactly `n` values from the body that follows.
pub fn decode_values(payload: &[u8], n: usize) -> Result<Vec<Value>, Error> {
    let (header_size, header_size_len) = varint::read(payload)?;
    let header_size = header_size as usize;
    let mut header_offset = header_size_len;
    let mut serial_types = Vec::with_capacity(n);
    while header_offset < header_size {
        let (serial_type, consumed) = varint::read(&payload[header_offset..])?;
        serial_types.push(serial_type);
        header_offset += consumed;
    }
    if serial_types.len() != n {
        return Err(Error::ColumnCountMismatch {
            declared: serial_types.len(),
            found: n,
        });
    }

    let mut body_offset = header_size;
    let mut values = Vec::with_capacity(n);
    for serial_type in serial_types {
        let len = serial_type::content_length(serial_type)?;
        let bytes = &payload[body_offset..body_offset + len];
        values.push(serial_type::decode_value(serial_type, bytes)?);
        body_offset += len;
    }
    Ok(values)
}

/// Decodes a leaf-table cell's payload into a `Record`, substituting
/// `rowid` for any column marked as the integer primary key (such columns
/// store NULL in the payload itself).
pub fn decode_table_row(payload: &[u8], table: &Table, rowid: i64) -> Result<Record, Error> {
    let raw = decode_values(payload, table.columns.len())?;
    let values = table
        .columns
        .iter()
        .zip(raw)
        .map(|(col, v)| {
            let v = if col.is_primary_key {
                Value::Integer(rowid)
            } else {
                v
            };
            (col.name.clone(), v)
        })
        .collect();
    Ok(Record { rowid, values })
}

/// Decodes an index cell's payload into `(key, rowid)`. The record holds
/// `column_count` key values followed by one trailing rowid value;
/// single-column indexes (the only kind this engine supports) yield one
/// key value.
pub fn decode_index_entry(payload: &[u8], column_count: usize) -> Result<(Value, i64), Error> {
    let mut raw = decode_values(payload, column_count + 1)?;
    let rowid_value = raw.pop().ok_or(Error::MissingRowid)?;
    let rowid = match rowid_value {
        Value::Integer(i) => i,
        _ => return Err(Error::NonIntegerRowid),
    };
    let key = raw.into_iter().next().ok_or(Error::MissingRowid)?;
    Ok((key, rowid))
}
