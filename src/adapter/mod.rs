//! `JsonAdapter`, the typed from/to JSON conversion contract, plus the
//! standard decorators and the entry points that enforce "JSON
//! document was not fully consumed."

pub mod decorators;

use crate::error::{EncodingDetail, JsonError};
use crate::reader::utf8::Utf8Reader;
use crate::reader::JsonReader;
use crate::token::Token;
use crate::writer::JsonWriter;

/// Converts between a Rust value and the JSON token stream. Implemented
/// directly for leaf types and composed through the decorators in
/// [`decorators`] or the registry's built-in container helpers.
pub trait JsonAdapter<T> {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<T, JsonError>;
    fn to_json(&self, writer: &mut dyn JsonWriter, value: &T) -> Result<(), JsonError>;

    /// Wraps `self` so a JSON `null` decodes to `None`/encodes from
    /// `None`, instead of failing as an unexpected token.
    fn null_safe(self) -> decorators::NullSafe<Self>
    where
        Self: Sized,
    {
        decorators::NullSafe(self)
    }

    /// Wraps `self` so a JSON `null` is rejected with
    /// `DataDetail::UnexpectedNull` instead of being passed through.
    fn non_null(self) -> decorators::NonNull<Self>
    where
        Self: Sized,
    {
        decorators::NonNull(self)
    }

    /// Wraps `self` so both directions run with the reader/writer's
    /// lenient flag forced on for the duration of the call, restoring
    /// the prior setting afterward.
    fn lenient(self) -> decorators::Lenient<Self>
    where
        Self: Sized,
    {
        decorators::Lenient(self)
    }

    /// Wraps `self` so `to_json` runs with `serializeNulls` forced on.
    fn serialize_nulls(self) -> decorators::SerializeNulls<Self>
    where
        Self: Sized,
    {
        decorators::SerializeNulls(self)
    }

    /// Wraps `self` so `from_json` runs with `failOnUnknown` forced on.
    fn fail_on_unknown(self) -> decorators::FailOnUnknown<Self>
    where
        Self: Sized,
    {
        decorators::FailOnUnknown(self)
    }

    /// Wraps `self` so `to_json` runs with the given indent string.
    fn indent(self, indent: impl Into<String>) -> decorators::Indent<Self>
    where
        Self: Sized,
    {
        decorators::Indent(self, indent.into())
    }
}

/// Decodes `json` with `adapter`, failing with
/// `EncodingDetail::TrailingData` ("JSON document was not fully
/// consumed.") if more than one top-level value is present.
pub fn from_json_str<T, A: JsonAdapter<T>>(adapter: &A, json: &str) -> Result<T, JsonError> {
    let mut reader = Utf8Reader::new(json.as_bytes());
    from_json_reader(adapter, &mut reader)
}

/// Same as [`from_json_str`], but against an already-constructed
/// reader (the UTF-8 tokenizer or the tree-backed `ValueReader`).
pub fn from_json_reader<T, A: JsonAdapter<T>>(
    adapter: &A,
    reader: &mut dyn JsonReader,
) -> Result<T, JsonError> {
    let value = adapter.from_json(reader)?;
    if reader.peek()? != Token::EndDocument {
        return Err(JsonError::encoding(reader.path(), EncodingDetail::TrailingData));
    }
    Ok(value)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::writer::utf8::Utf8Writer;

    struct BoolAdapter;
    impl JsonAdapter<bool> for BoolAdapter {
        fn from_json(&self, reader: &mut dyn JsonReader) -> Result<bool, JsonError> {
            reader.next_boolean()
        }
        fn to_json(&self, writer: &mut dyn JsonWriter, value: &bool) -> Result<(), JsonError> {
            writer.value_bool(*value)
        }
    }

    #[test]
    fn test_round_trip() {
        let adapter = BoolAdapter;
        let decoded = from_json_str(&adapter, "true").unwrap();
        assert!(decoded);

        let mut w = Utf8Writer::new(Vec::new());
        adapter.to_json(&mut w, &decoded).unwrap();
        assert_eq!(String::from_utf8(w.into_inner()).unwrap(), "true");
    }

    #[test]
    fn test_trailing_data_rejected() {
        let adapter = BoolAdapter;
        assert!(from_json_str(&adapter, "true false").is_err());
    }
}
