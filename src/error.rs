//! Error model for jsonwire, split along byte-level malformation
//! ("encoding" errors) versus shape/type mismatches ("data" errors).
//! Both are always path-tagged.

use crate::token::Token;

/// Either kind of failure a reader or writer can raise. Always carries
/// the JSONPath-subset path that was current when the failure occurred.
#[derive(thiserror::Error, Debug)]
pub enum JsonError {
    #[error("{detail} at {path}")]
    Encoding { path: String, detail: EncodingDetail },
    #[error("{detail} at {path}")]
    Data { path: String, detail: DataDetail },
    /// A fully pre-rendered message. Used by the handful of details that
    /// either embed their own path already (so the blanket "at {path}"
    /// suffix would render it twice) or, like registration-time
    /// conflicts, have no path at all to attach.
    #[error("{0}")]
    Message(String),
}

impl JsonError {
    pub fn encoding(path: impl Into<String>, detail: EncodingDetail) -> Self {
        JsonError::Encoding {
            path: path.into(),
            detail,
        }
    }

    pub fn data(path: impl Into<String>, detail: DataDetail) -> Self {
        JsonError::Data {
            path: path.into(),
            detail,
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        JsonError::Message(text.into())
    }

    /// True for encoding errors: malformed bytes, not a shape mismatch.
    pub fn is_encoding(&self) -> bool {
        matches!(self, JsonError::Encoding { .. })
    }

    /// True for data errors: well-formed JSON that doesn't match the
    /// shape an adapter or decoder expected.
    pub fn is_data(&self) -> bool {
        matches!(self, JsonError::Data { .. })
    }

    pub fn path(&self) -> &str {
        match self {
            JsonError::Encoding { path, .. } => path,
            JsonError::Data { path, .. } => path,
            JsonError::Message(_) => "",
        }
    }
}

/// An "encoding" error: deterministic, path-tagged, non-recoverable
/// locally. Raised for malformed bytes, unexpected end of input, or a
/// strict-mode precision overflow.
#[derive(thiserror::Error, Debug)]
pub enum EncodingDetail {
    #[error("Unterminated string")]
    UnterminatedString,
    #[error("Malformed escape sequence")]
    MalformedEscape,
    #[error("Unexpected character '{0}'")]
    UnexpectedCharacter(char),
    #[error("Use JsonReader.setLenient(true) to accept malformed JSON")]
    LenientRequired,
    /// Rendered directly via [`JsonError::message`], not the blanket
    /// "{detail} at {path}" wrapper — its `Display` already embeds the
    /// path in the right place ("at $<path>: circular reference?"), and
    /// the wrapper would otherwise append it a second time.
    #[error("Nesting too deep at {0}: circular reference?")]
    NestingTooDeep(String),
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Numeric value is too long")]
    NumberTooLong,
    #[error("JSON forbids NaN and infinities: {0}")]
    NonFiniteNotAllowed(f64),
    #[error("Sink from valueSink() was not closed")]
    SinkNotClosed,
    #[error("Nesting problem.")]
    NestingProblem,
    #[error("JSON document was not fully consumed.")]
    TrailingData,
}

/// A "data" error: deterministic, path-tagged, and may be recovered by
/// the adapter layer (e.g. an optional adapter can catch it).
#[derive(thiserror::Error, Debug)]
pub enum DataDetail {
    #[error("Expected {expected} but was {actual}")]
    UnexpectedToken { expected: Token, actual: Token },
    #[error("Cannot skip unexpected {0}")]
    CannotSkipUnexpected(Token),
    #[error("Unexpected null")]
    UnexpectedNull,
    /// Rendered directly via [`JsonError::message`] — the path belongs
    /// in the middle of this sentence, not appended at the end by the
    /// blanket "{detail} at {path}" wrapper.
    #[error("Map key '{name}' has multiple values at path {path}: {first} and {second}")]
    DuplicateName {
        name: String,
        path: String,
        first: String,
        second: String,
    },
    #[error("numeric value ({0}) is not representable")]
    NumberNotRepresentable(String),
    #[error("boolean and null values cannot be promoted to a name")]
    CannotPromote,
    #[error("No adapter factory produced a result for {0}")]
    NoAdapter(String),
    /// Rendered directly via [`JsonError::message`] — a registration-time
    /// failure with no reader/writer position to attach a path to.
    #[error("Conflicting @ToJson methods: {0}, {1}")]
    ConflictingToJson(String, String),
    /// See [`DataDetail::ConflictingToJson`].
    #[error("Conflicting @FromJson methods: {0}, {1}")]
    ConflictingFromJson(String, String),
    #[error("No @ToJson/@FromJson adapter for {type_name} annotated {qualifiers}")]
    NoMethodAdapter { type_name: String, qualifiers: String },
}
