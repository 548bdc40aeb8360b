//! The pull-based token reader surface shared by the UTF-8 and
//! in-memory-value backends.

pub mod utf8;
pub mod value;

use crate::error::JsonError;
use crate::number::JsonNumber;
use crate::select::SelectOptions;
use crate::token::Token;

/// A pull-based reader of the JSON token stream. Implemented by
/// [`utf8::Utf8Reader`] (a byte-stream tokenizer) and
/// [`value::ValueReader`] (an in-memory tree walked through the same
/// protocol).
pub trait JsonReader {
    /// Returns the next token without consuming it. Idempotent; may
    /// refill an internal buffer but never advances the logical cursor.
    fn peek(&mut self) -> Result<Token, JsonError>;

    fn begin_array(&mut self) -> Result<(), JsonError>;
    fn end_array(&mut self) -> Result<(), JsonError>;
    fn begin_object(&mut self) -> Result<(), JsonError>;
    fn end_object(&mut self) -> Result<(), JsonError>;

    /// True if the current array or object has another element/field.
    fn has_next(&mut self) -> Result<bool, JsonError>;

    fn next_name(&mut self) -> Result<String, JsonError>;
    fn next_string(&mut self) -> Result<String, JsonError>;
    fn next_boolean(&mut self) -> Result<bool, JsonError>;
    fn next_null(&mut self) -> Result<(), JsonError>;
    fn next_number(&mut self) -> Result<JsonNumber, JsonError>;

    /// Integer fast path: fails as a data error if the number is not an
    /// exact `i32`.
    fn next_int(&mut self) -> Result<i32, JsonError> {
        let n = self.next_number()?;
        n.as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| {
                crate::error::JsonError::data(
                    self.path(),
                    crate::error::DataDetail::NumberNotRepresentable(n.to_string()),
                )
            })
    }

    /// Integer fast path: fails as a data error if the number is not an
    /// exact `i64`.
    fn next_long(&mut self) -> Result<i64, JsonError> {
        let n = self.next_number()?;
        n.as_i64().ok_or_else(|| {
            crate::error::JsonError::data(
                self.path(),
                crate::error::DataDetail::NumberNotRepresentable(n.to_string()),
            )
        })
    }

    /// In strict mode, fails if the number is non-finite. In lenient
    /// mode, accepts `NaN`/`Infinity`/`-Infinity`.
    fn next_double(&mut self) -> Result<f64, JsonError>;

    /// Consume and discard the next well-formed value (and substructure).
    /// Fails under `failOnUnknown`.
    fn skip_value(&mut self) -> Result<(), JsonError>;

    /// Resolve the next object property name against a precompiled
    /// option set without advancing past a non-matching name.
    fn select_name(&mut self, options: &SelectOptions) -> Result<i32, JsonError>;

    /// Resolve the next string value against a precompiled option set
    /// without advancing past a non-matching value.
    fn select_string(&mut self, options: &SelectOptions) -> Result<i32, JsonError>;

    /// Consumes the current object-entry name and makes it readable as a
    /// scalar value through the next `next_number`/`next_string`/
    /// `next_boolean`/`next_null` call instead of `next_name`. Complement
    /// to `JsonWriter::promote_value_to_name`, for decoding non-string
    /// map keys that were promoted on write.
    fn promote_name_to_value(&mut self) -> Result<(), JsonError>;

    /// Current JSONPath-subset breadcrumb.
    fn path(&self) -> String;

    fn set_lenient(&mut self, lenient: bool);
    fn is_lenient(&self) -> bool;

    fn set_fail_on_unknown(&mut self, fail: bool);
    fn fail_on_unknown(&self) -> bool;

    fn close(&mut self) -> Result<(), JsonError>;
}
