//! A streaming JSON codec: a token protocol shared by a UTF-8 byte
//! reader/writer pair and an in-memory value tree, plus a
//! type-directed adapter registry built on top of both.

pub mod adapter;
pub mod alloc;
pub mod error;
pub mod number;
pub mod ordered_map;
pub mod path;
pub mod reader;
pub mod registry;
pub mod select;
pub mod token;
pub mod types;
pub mod value;
pub mod writer;

pub use adapter::{from_json_reader, from_json_str, JsonAdapter};
pub use error::{DataDetail, EncodingDetail, JsonError};
pub use number::JsonNumber;
pub use ordered_map::OrderedMap;
pub use reader::utf8::Utf8Reader;
pub use reader::value::ValueReader;
pub use reader::JsonReader;
pub use registry::{JsonAdapterRegistry, JsonAdapterRegistryBuilder};
pub use select::SelectOptions;
pub use token::Token;
pub use types::{Qualifiers, TypeKey};
pub use value::JsonValue;
pub use writer::utf8::Utf8Writer;
pub use writer::value::ValueWriter;
pub use writer::JsonWriter;
