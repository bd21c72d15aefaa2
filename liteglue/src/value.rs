///
/// Tagged column values.
///
/// One `Value` is a single scalar cell of a result row, or one positional
/// parameter supplied to `Connection::execute`. The tag set mirrors the
/// engine's five dynamic types. Text and blob payloads are owned copies:
/// engine column memory is only valid until the next step call, so bytes
/// are copied out eagerly when a row is captured.
///

use rusqlite::types::ValueRef;

/// The engine's fundamental datatype of one cell or parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueTag {
    Integer,
    Float,
    Text,
    Blob,
    Null,
}

impl ValueTag {
    /// Engine-native type code, stable across the ABI
    /// (INTEGER=1, FLOAT=2, TEXT=3, BLOB=4, NULL=5).
    pub fn code(self) -> i64 {
        match self {
            ValueTag::Integer => 1,
            ValueTag::Float => 2,
            ValueTag::Text => 3,
            ValueTag::Blob => 4,
            ValueTag::Null => 5,
        }
    }

    /// Inverse of [`ValueTag::code`]; `None` for codes the engine never
    /// reports.
    pub fn from_code(code: i64) -> Option<ValueTag> {
        match code {
            1 => Some(ValueTag::Integer),
            2 => Some(ValueTag::Float),
            3 => Some(ValueTag::Text),
            4 => Some(ValueTag::Blob),
            5 => Some(ValueTag::Null),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ValueTag::Integer => "integer",
            ValueTag::Float => "float",
            ValueTag::Text => "text",
            ValueTag::Blob => "blob",
            ValueTag::Null => "null",
        }
    }
}

/// One scalar value: tag plus exactly one payload. The enum makes reading
/// the wrong payload for a tag unrepresentable.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    pub fn null() -> Value {
        Value::Null
    }

    pub fn tag(&self) -> ValueTag {
        match self {
            Value::Null => ValueTag::Null,
            Value::Integer(_) => ValueTag::Integer,
            Value::Float(_) => ValueTag::Float,
            Value::Text(_) => ValueTag::Text,
            Value::Blob(_) => ValueTag::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `Some` for Integer cells, `None` for every other tag.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// `Some` for Float cells, `None` for every other tag.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// `Some` for Text cells, `None` for every other tag.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// `Some` for Blob cells, `None` for every other tag.
    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Copy one column of a stepped statement into an owned value.
    ///
    /// Cannot fail: integers and floats are copied by value, text and blob
    /// bytes are copied into owned buffers, and text that is not valid
    /// UTF-8 is replaced lossily (host strings are UTF-8).
    pub(crate) fn from_column(cell: ValueRef<'_>) -> Value {
        match cell {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::Integer(v),
            ValueRef::Real(v) => Value::Float(v),
            ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Value {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Value {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Value {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Value {
        Value::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Value {
        Value::Blob(v.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_codes_are_engine_native() {
        assert_eq!(ValueTag::Integer.code(), 1);
        assert_eq!(ValueTag::Float.code(), 2);
        assert_eq!(ValueTag::Text.code(), 3);
        assert_eq!(ValueTag::Blob.code(), 4);
        assert_eq!(ValueTag::Null.code(), 5);
    }

    #[test]
    fn test_tag_code_round_trip() {
        for tag in [
            ValueTag::Integer,
            ValueTag::Float,
            ValueTag::Text,
            ValueTag::Blob,
            ValueTag::Null,
        ] {
            assert_eq!(ValueTag::from_code(tag.code()), Some(tag));
        }
        assert_eq!(ValueTag::from_code(0), None);
        assert_eq!(ValueTag::from_code(6), None);
        assert_eq!(ValueTag::from_code(-1), None);
    }

    #[test]
    fn test_tag_follows_payload() {
        assert_eq!(Value::null().tag(), ValueTag::Null);
        assert_eq!(Value::from(7i64).tag(), ValueTag::Integer);
        assert_eq!(Value::from(2.5f64).tag(), ValueTag::Float);
        assert_eq!(Value::from("hello").tag(), ValueTag::Text);
        assert_eq!(Value::from(vec![1u8, 2, 3]).tag(), ValueTag::Blob);
    }

    #[test]
    fn test_extractors_match_tag_only() {
        let v = Value::from(42i64);
        assert_eq!(v.as_integer(), Some(42));
        assert_eq!(v.as_float(), None);
        assert_eq!(v.as_text(), None);
        assert_eq!(v.as_blob(), None);
        assert!(!v.is_null());

        let v = Value::from("hello");
        assert_eq!(v.as_text(), Some("hello"));
        assert_eq!(v.as_integer(), None);

        let v = Value::null();
        assert!(v.is_null());
        assert_eq!(v.as_integer(), None);
        assert_eq!(v.as_float(), None);
    }

    #[test]
    fn test_from_column_copies_bytes() {
        let text = Value::from_column(ValueRef::Text(b"abc"));
        assert_eq!(text, Value::Text("abc".to_string()));

        let blob = Value::from_column(ValueRef::Blob(&[0xde, 0xad]));
        assert_eq!(blob, Value::Blob(vec![0xde, 0xad]));

        assert_eq!(Value::from_column(ValueRef::Null), Value::Null);
        assert_eq!(Value::from_column(ValueRef::Integer(9)), Value::Integer(9));
        assert_eq!(Value::from_column(ValueRef::Real(1.5)), Value::Float(1.5));
    }

    #[test]
    fn test_from_column_invalid_utf8_is_lossy() {
        let text = Value::from_column(ValueRef::Text(&[0x68, 0xff, 0x69]));
        match text {
            Value::Text(s) => assert_eq!(s, "h\u{fffd}i"),
            other => panic!("expected text, got {other:?}"),
        }
    }
}
