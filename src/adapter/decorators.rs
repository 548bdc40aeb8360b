//! Standard `JsonAdapter` decorators. Each wraps an inner
//! adapter and toggles exactly one reader/writer mode flag (or, for
//! `NullSafe`/`NonNull`, changes how `null` is treated) around the
//! delegated call, restoring the prior setting afterward so nested
//! decorators compose predictably.
//!
//! Each decorator struct also has an inherent method of the same name
//! as the `JsonAdapter` trait method that produces it (e.g. `NullSafe`
//! has an inherent `null_safe`), which shadows the trait default and
//! returns `self` unchanged. `x.lenient().lenient()` therefore resolves
//! to the inherent method on `Lenient<A>` rather than the trait default
//! on `JsonAdapter`, so it stays a single layer instead of nesting
//! `Lenient<Lenient<A>>`.

use super::JsonAdapter;
use crate::error::{DataDetail, JsonError};
use crate::reader::JsonReader;
use crate::token::Token;
use crate::writer::JsonWriter;

pub struct NullSafe<A>(pub A);
impl<A> NullSafe<A> {
    /// Shadows the trait default so `x.null_safe().null_safe()` stays a
    /// single layer instead of nesting `NullSafe<NullSafe<A>>`.
    pub fn null_safe(self) -> Self {
        self
    }
}
impl<T, A: JsonAdapter<T>> JsonAdapter<Option<T>> for NullSafe<A> {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<Option<T>, JsonError> {
        if reader.peek()? == Token::Null {
            reader.next_null()?;
            Ok(None)
        } else {
            Ok(Some(self.0.from_json(reader)?))
        }
    }

    fn to_json(&self, writer: &mut dyn JsonWriter, value: &Option<T>) -> Result<(), JsonError> {
        match value {
            Some(v) => self.0.to_json(writer, v),
            None => writer.value_null(),
        }
    }
}

pub struct NonNull<A>(pub A);
impl<A> NonNull<A> {
    pub fn non_null(self) -> Self {
        self
    }
}
impl<T, A: JsonAdapter<T>> JsonAdapter<T> for NonNull<A> {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<T, JsonError> {
        if reader.peek()? == Token::Null {
            return Err(JsonError::data(reader.path(), DataDetail::UnexpectedNull));
        }
        self.0.from_json(reader)
    }

    fn to_json(&self, writer: &mut dyn JsonWriter, value: &T) -> Result<(), JsonError> {
        self.0.to_json(writer, value)
    }
}

pub struct Lenient<A>(pub A);
impl<A> Lenient<A> {
    pub fn lenient(self) -> Self {
        self
    }
}
impl<T, A: JsonAdapter<T>> JsonAdapter<T> for Lenient<A> {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<T, JsonError> {
        let was = reader.is_lenient();
        reader.set_lenient(true);
        let result = self.0.from_json(reader);
        reader.set_lenient(was);
        result
    }

    fn to_json(&self, writer: &mut dyn JsonWriter, value: &T) -> Result<(), JsonError> {
        let was = writer.is_lenient();
        writer.set_lenient(true);
        let result = self.0.to_json(writer, value);
        writer.set_lenient(was);
        result
    }
}

pub struct SerializeNulls<A>(pub A);
impl<A> SerializeNulls<A> {
    pub fn serialize_nulls(self) -> Self {
        self
    }
}
impl<T, A: JsonAdapter<T>> JsonAdapter<T> for SerializeNulls<A> {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<T, JsonError> {
        self.0.from_json(reader)
    }

    fn to_json(&self, writer: &mut dyn JsonWriter, value: &T) -> Result<(), JsonError> {
        let was = writer.serializes_nulls();
        writer.set_serialize_nulls(true);
        let result = self.0.to_json(writer, value);
        writer.set_serialize_nulls(was);
        result
    }
}

pub struct FailOnUnknown<A>(pub A);
impl<A> FailOnUnknown<A> {
    pub fn fail_on_unknown(self) -> Self {
        self
    }
}
impl<T, A: JsonAdapter<T>> JsonAdapter<T> for FailOnUnknown<A> {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<T, JsonError> {
        let was = reader.fail_on_unknown();
        reader.set_fail_on_unknown(true);
        let result = self.0.from_json(reader);
        reader.set_fail_on_unknown(was);
        result
    }

    fn to_json(&self, writer: &mut dyn JsonWriter, value: &T) -> Result<(), JsonError> {
        self.0.to_json(writer, value)
    }
}

pub struct Indent<A>(pub A, pub String);
impl<A> Indent<A> {
    /// Replaces the indent string in place instead of nesting a second
    /// layer, so `x.indent(a).indent(b)` carries only `b`.
    pub fn indent(self, indent: impl Into<String>) -> Self {
        Indent(self.0, indent.into())
    }
}
impl<T, A: JsonAdapter<T>> JsonAdapter<T> for Indent<A> {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<T, JsonError> {
        self.0.from_json(reader)
    }

    fn to_json(&self, writer: &mut dyn JsonWriter, value: &T) -> Result<(), JsonError> {
        let was = writer.indent().to_string();
        writer.set_indent(self.1.clone());
        let result = self.0.to_json(writer, value);
        writer.set_indent(was);
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reader::utf8::Utf8Reader;
    use crate::writer::utf8::Utf8Writer;

    struct I64Adapter;
    impl JsonAdapter<i64> for I64Adapter {
        fn from_json(&self, reader: &mut dyn JsonReader) -> Result<i64, JsonError> {
            reader.next_long()
        }
        fn to_json(&self, writer: &mut dyn JsonWriter, value: &i64) -> Result<(), JsonError> {
            writer.value_i64(*value)
        }
    }

    #[test]
    fn test_null_safe_round_trip() {
        let adapter = I64Adapter.null_safe();
        let mut r = Utf8Reader::new("null".as_bytes());
        assert_eq!(adapter.from_json(&mut r).unwrap(), None);
        let mut r = Utf8Reader::new("5".as_bytes());
        assert_eq!(adapter.from_json(&mut r).unwrap(), Some(5));

        let mut w = Utf8Writer::new(Vec::new());
        adapter.to_json(&mut w, &None).unwrap();
        assert_eq!(String::from_utf8(w.into_inner()).unwrap(), "null");
    }

    #[test]
    fn test_non_null_rejects_null() {
        let adapter = I64Adapter.non_null();
        let mut r = Utf8Reader::new("null".as_bytes());
        assert!(adapter.from_json(&mut r).is_err());
    }

    #[test]
    fn test_lenient_restores_flag_after_call() {
        let adapter = I64Adapter.lenient();
        let mut w = Utf8Writer::new(Vec::new());
        adapter.to_json(&mut w, &5).unwrap();
        assert!(!w.is_lenient());
    }

    #[test]
    fn test_repeated_decoration_does_not_nest() {
        // These assertions only compile if `.null_safe().null_safe()` etc.
        // resolve to `Self`, not to an ever-deepening generic nesting.
        let a: NullSafe<I64Adapter> = I64Adapter.null_safe().null_safe();
        let _: Option<i64> = a.from_json(&mut Utf8Reader::new("null".as_bytes())).unwrap();

        let _: NonNull<I64Adapter> = I64Adapter.non_null().non_null();
        let _: Lenient<I64Adapter> = I64Adapter.lenient().lenient();
        let _: SerializeNulls<I64Adapter> = I64Adapter.serialize_nulls().serialize_nulls();
        let _: FailOnUnknown<I64Adapter> = I64Adapter.fail_on_unknown().fail_on_unknown();
        let indent: Indent<I64Adapter> = I64Adapter.indent("  ").indent("    ");
        assert_eq!(indent.1, "    ");
    }
}
