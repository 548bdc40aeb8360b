//! The push-based token writer surface shared by the UTF-8 and
//! in-memory-value backends.

pub mod utf8;
pub mod value;

use crate::error::JsonError;
use crate::number::JsonNumber;

/// A push-based writer of the JSON token stream. Implemented by
/// [`utf8::Utf8Writer`] (a byte-stream emitter) and
/// [`value::ValueWriter`] (an in-memory tree accumulator).
pub trait JsonWriter {
    fn begin_array(&mut self) -> Result<(), JsonError>;
    fn end_array(&mut self) -> Result<(), JsonError>;
    fn begin_object(&mut self) -> Result<(), JsonError>;
    fn end_object(&mut self) -> Result<(), JsonError>;

    fn name(&mut self, name: &str) -> Result<(), JsonError>;

    fn value_string(&mut self, value: &str) -> Result<(), JsonError>;
    fn value_number(&mut self, value: JsonNumber) -> Result<(), JsonError>;
    fn value_bool(&mut self, value: bool) -> Result<(), JsonError>;
    fn value_null(&mut self) -> Result<(), JsonError>;

    fn value_i64(&mut self, value: i64) -> Result<(), JsonError> {
        self.value_number(JsonNumber::Signed(value))
    }
    fn value_u64(&mut self, value: u64) -> Result<(), JsonError> {
        self.value_number(JsonNumber::Unsigned(value))
    }
    fn value_f64(&mut self, value: f64) -> Result<(), JsonError> {
        self.value_number(JsonNumber::Float(value, None))
    }

    /// Marks the next emitted primitive value as an object key instead
    /// of a value. Numeric values promote by their canonical string
    /// form; boolean and null cannot be promoted and fail with
    /// `DataDetail::CannotPromote`.
    fn promote_value_to_name(&mut self);

    /// Current JSONPath-subset breadcrumb.
    fn path(&self) -> String;

    fn set_lenient(&mut self, lenient: bool);
    fn is_lenient(&self) -> bool;

    fn set_serialize_nulls(&mut self, serialize: bool);
    fn serializes_nulls(&self) -> bool;

    /// `indent` is an owned string so implementations can reuse it as an
    /// immutable prefix buffer; pass an empty string to disable.
    fn set_indent(&mut self, indent: String);
    fn indent(&self) -> &str;

    fn close(&mut self) -> Result<(), JsonError>;
}
