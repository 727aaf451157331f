//! The runtime value type produced by decoding a record column, per the
//! serial-type table in the SQLite file format (integers, text, blob, null).
//! Floating point and the boolean/reserved serial types are out of scope
//! (spec.md §1 Non-goals); `serial_type` rejects those before a `Value` is
//! ever constructed.

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Renders a value the way the executor prints a row: NULL as an empty
    /// string, integers in decimal, text and blob as their UTF-8 content.
    /// A blob that is not valid UTF-8 is lossily decoded, since the output
    /// format here is plain text, not a re-encoding of the original bytes.
    pub fn format(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Integer(i) => i.to_string(),
            Value::Text(s) => s.clone(),
            Value::Blob(b) => String::from_utf8_lossy(b).into_owned(),
        }
    }
}

impl PartialOrd for Value {
    /// Ordering is only defined between values of the same variant; SQLite's
    /// type-affinity-aware comparison (text collates against integers, for
    /// instance) is out of scope (spec.md §9). Comparing across variants
    /// returns `None` rather than guessing an ordering.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(std::cmp::Ordering::Equal),
            (Value::Integer(a), Value::Integer(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => a.partial_cmp(b),
            (Value::Blob(a), Value::Blob(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}
