//! `ValueWriter`, the in-memory tree accumulator: the same
//! `JsonWriter` token protocol as [`super::utf8::Utf8Writer`], but
//! building a [`JsonValue`] tree instead of emitting bytes.

use crate::error::{DataDetail, EncodingDetail, JsonError};
use crate::number::JsonNumber;
use crate::ordered_map::OrderedMap;
use crate::path::{FrameKind, PathStack, Scope};
use crate::value::JsonValue;
use crate::writer::JsonWriter;

/// One container under construction: either an array being appended to,
/// or an object awaiting its next name/value pair.
enum Container {
    Array(Vec<JsonValue>),
    Object(OrderedMap<JsonValue>, Option<String>),
}

pub struct ValueWriter {
    stack: PathStack,
    open: Vec<Container>,
    root: Option<JsonValue>,
    lenient: bool,
    serialize_nulls: bool,
    indent: String,
    promote_pending: bool,
}

impl Default for ValueWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueWriter {
    pub fn new() -> Self {
        ValueWriter {
            stack: PathStack::new(),
            open: Vec::new(),
            root: None,
            lenient: false,
            serialize_nulls: false,
            indent: String::new(),
            promote_pending: false,
        }
    }

    /// Returns the accumulated tree. Only meaningful once exactly one
    /// top-level value has been written.
    pub fn root(&self) -> Option<&JsonValue> {
        self.root.as_ref()
    }

    pub fn into_root(self) -> Option<JsonValue> {
        self.root
    }

    fn err_enc(&self, detail: EncodingDetail) -> JsonError {
        JsonError::encoding(self.stack.path(), detail)
    }

    fn err_data(&self, detail: DataDetail) -> JsonError {
        JsonError::data(self.stack.path(), detail)
    }

    fn before_value(&self) -> Result<(), JsonError> {
        match self.stack.peek() {
            Scope::EmptyDocument => Ok(()),
            Scope::NonemptyDocument => {
                if self.lenient {
                    Ok(())
                } else {
                    Err(self.err_enc(EncodingDetail::NestingProblem))
                }
            }
            Scope::EmptyArray | Scope::NonemptyArray | Scope::DanglingName => Ok(()),
            _ => Err(self.err_enc(EncodingDetail::NestingProblem)),
        }
    }

    fn place(&mut self, value: JsonValue) -> Result<(), JsonError> {
        match self.open.last_mut() {
            Some(Container::Array(items)) => {
                items.push(value);
                self.stack.advance_index();
                self.stack.set_top(Scope::NonemptyArray);
            }
            Some(Container::Object(map, pending_name)) => {
                let name = pending_name
                    .take()
                    .expect("value() only reachable from DanglingName after name()");
                if let Some(prev) = map.get(&name) {
                    let first = prev.to_string();
                    let second = value.to_string();
                    let path = self.stack.path();
                    return Err(JsonError::message(
                        DataDetail::DuplicateName { name, path, first, second }.to_string(),
                    ));
                }
                map.insert(name, value);
                self.stack.set_top(Scope::NonemptyObject);
            }
            None => {
                self.root = Some(value);
                self.stack.set_top(Scope::NonemptyDocument);
            }
        }
        Ok(())
    }
}

impl JsonWriter for ValueWriter {
    fn begin_array(&mut self) -> Result<(), JsonError> {
        self.before_value()?;
        self.stack.push(Scope::EmptyArray, FrameKind::Array)?;
        self.open.push(Container::Array(Vec::new()));
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), JsonError> {
        if !matches!(self.stack.peek(), Scope::EmptyArray | Scope::NonemptyArray) {
            return Err(self.err_enc(EncodingDetail::NestingProblem));
        }
        let items = match self.open.pop() {
            Some(Container::Array(items)) => items,
            _ => return Err(self.err_enc(EncodingDetail::NestingProblem)),
        };
        self.stack.pop();
        self.place(JsonValue::Array(items))
    }

    fn begin_object(&mut self) -> Result<(), JsonError> {
        self.before_value()?;
        self.stack.push(Scope::EmptyObject, FrameKind::Object)?;
        self.open.push(Container::Object(OrderedMap::new(), None));
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), JsonError> {
        if !matches!(self.stack.peek(), Scope::EmptyObject | Scope::NonemptyObject) {
            return Err(self.err_enc(EncodingDetail::NestingProblem));
        }
        let map = match self.open.pop() {
            Some(Container::Object(map, None)) => map,
            Some(Container::Object(_, Some(_))) => {
                return Err(self.err_enc(EncodingDetail::NestingProblem))
            }
            _ => return Err(self.err_enc(EncodingDetail::NestingProblem)),
        };
        self.stack.pop();
        self.place(JsonValue::Object(map))
    }

    fn name(&mut self, name: &str) -> Result<(), JsonError> {
        match (self.stack.peek(), self.open.last_mut()) {
            (Scope::EmptyObject, Some(Container::Object(_, slot)))
            | (Scope::NonemptyObject, Some(Container::Object(_, slot))) => {
                *slot = Some(name.to_string());
                self.stack.set_top(Scope::DanglingName);
                self.stack.set_name(name);
                Ok(())
            }
            _ => Err(self.err_enc(EncodingDetail::NestingProblem)),
        }
    }

    fn value_string(&mut self, value: &str) -> Result<(), JsonError> {
        if self.promote_pending {
            self.promote_pending = false;
            return self.name(value);
        }
        self.before_value()?;
        self.place(JsonValue::String(value.to_string()))
    }

    fn value_number(&mut self, value: JsonNumber) -> Result<(), JsonError> {
        if !self.lenient && value.is_float() && !value.as_f64().is_finite() {
            return Err(self.err_enc(EncodingDetail::NonFiniteNotAllowed(value.as_f64())));
        }
        if self.promote_pending {
            self.promote_pending = false;
            return self.name(&value.to_string());
        }
        self.before_value()?;
        self.place(JsonValue::Number(value))
    }

    fn value_bool(&mut self, value: bool) -> Result<(), JsonError> {
        if self.promote_pending {
            return Err(self.err_data(DataDetail::CannotPromote));
        }
        self.before_value()?;
        self.place(JsonValue::Bool(value))
    }

    fn value_null(&mut self) -> Result<(), JsonError> {
        if self.promote_pending {
            return Err(self.err_data(DataDetail::CannotPromote));
        }
        if matches!(self.stack.peek(), Scope::DanglingName) && !self.serialize_nulls {
            if let Some(Container::Object(_, slot)) = self.open.last_mut() {
                *slot = None;
            }
            self.stack.set_top(Scope::EmptyObject);
            return Ok(());
        }
        self.before_value()?;
        self.place(JsonValue::Null)
    }

    fn promote_value_to_name(&mut self) {
        self.promote_pending = true;
    }

    fn path(&self) -> String {
        self.stack.path()
    }

    fn set_lenient(&mut self, lenient: bool) {
        self.lenient = lenient;
    }

    fn is_lenient(&self) -> bool {
        self.lenient
    }

    fn set_serialize_nulls(&mut self, serialize: bool) {
        self.serialize_nulls = serialize;
    }

    fn serializes_nulls(&self) -> bool {
        self.serialize_nulls
    }

    fn set_indent(&mut self, indent: String) {
        self.indent = indent;
    }

    fn indent(&self) -> &str {
        &self.indent
    }

    fn close(&mut self) -> Result<(), JsonError> {
        if !matches!(self.stack.peek(), Scope::NonemptyDocument) {
            return Err(self.err_enc(EncodingDetail::NestingProblem));
        }
        self.stack.set_top(Scope::Closed);
        Ok(())
    }
}
