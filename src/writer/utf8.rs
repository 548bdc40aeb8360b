//! Byte-stream token emitter. Pushes bytes to any
//! [`std::io::Write`] sink; strict mode enforces RFC 8259 plus the
//! U+2028/U+2029 escaping requirement, lenient mode permits non-finite
//! doubles and more than one top-level value.

use crate::error::{DataDetail, EncodingDetail, JsonError};
use crate::number::JsonNumber;
use crate::path::{FrameKind, PathStack, Scope};
use crate::writer::JsonWriter;
use std::collections::HashMap;
use std::io::Write;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ContainerKind {
    Array,
    Object,
}

struct FlattenScope {
    depth: usize,
    kind: ContainerKind,
    /// True while one same-kind nested container is currently dissolved
    /// directly under this flatten scope; blocks a second, nested-nested
    /// dissolution ("only one level dissolves").
    open: bool,
}

/// Per-begin/end marker, so `end_array`/`end_object` always know — in
/// LIFO order — whether the matching `begin` wrote real brackets or was
/// dissolved by an enclosing flatten scope.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Marker {
    RealArray,
    RealObject,
    DissolvedArray,
    DissolvedObject,
}

/// Opaque handle returned by [`Utf8Writer::begin_flatten`] and consumed
/// by [`Utf8Writer::end_flatten`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FlattenToken(usize);

pub struct Utf8Writer<W> {
    sink: W,
    stack: PathStack,
    lenient: bool,
    serialize_nulls: bool,
    indent: String,
    tags: HashMap<String, String>,
    flatten_stack: Vec<FlattenScope>,
    markers: Vec<Marker>,
    object_values: Vec<HashMap<String, String>>,
    promote_pending: bool,
    sink_open: bool,
}

impl<W: Write> Utf8Writer<W> {
    pub fn new(sink: W) -> Self {
        Utf8Writer {
            sink,
            stack: PathStack::new(),
            lenient: false,
            serialize_nulls: false,
            indent: String::new(),
            tags: HashMap::new(),
            flatten_stack: Vec::new(),
            markers: Vec::new(),
            object_values: Vec::new(),
            promote_pending: false,
            sink_open: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Opens a flatten scope on the container currently being written
    /// into. Returns a token to pass back to [`Self::end_flatten`].
    pub fn begin_flatten(&mut self) -> Result<FlattenToken, JsonError> {
        self.guard_sink()?;
        let kind = match self.stack.peek() {
            Scope::EmptyArray | Scope::NonemptyArray => ContainerKind::Array,
            Scope::EmptyObject | Scope::NonemptyObject => ContainerKind::Object,
            _ => return Err(self.err_enc(EncodingDetail::NestingProblem)),
        };
        self.flatten_stack.push(FlattenScope {
            depth: self.stack.depth(),
            kind,
            open: false,
        });
        Ok(FlattenToken(self.flatten_stack.len() - 1))
    }

    pub fn end_flatten(&mut self, token: FlattenToken) -> Result<(), JsonError> {
        self.guard_sink()?;
        if token.0 != self.flatten_stack.len().wrapping_sub(1) {
            return Err(self.err_enc(EncodingDetail::NestingProblem));
        }
        self.flatten_stack.pop();
        Ok(())
    }

    /// Returns a raw byte sink for splicing pre-formatted JSON as a
    /// single value. While the returned guard is alive (or until
    /// [`ValueSink::finish`] is called), every other writer operation
    /// fails with "Sink from valueSink() was not closed".
    pub fn value_sink(&mut self) -> Result<ValueSink<'_, W>, JsonError> {
        self.guard_sink()?;
        self.before_value()?;
        self.sink_open = true;
        self.stack.push(Scope::StreamingValue, FrameKind::Other)?;
        Ok(ValueSink { writer: self })
    }

    fn guard_sink(&self) -> Result<(), JsonError> {
        if self.sink_open {
            Err(self.err_enc(EncodingDetail::SinkNotClosed))
        } else {
            Ok(())
        }
    }

    fn err_enc(&self, detail: EncodingDetail) -> JsonError {
        JsonError::encoding(self.stack.path(), detail)
    }

    fn err_data(&self, detail: DataDetail) -> JsonError {
        JsonError::data(self.stack.path(), detail)
    }

    fn write_indent(&mut self) -> std::io::Result<()> {
        if !self.indent.is_empty() {
            self.sink.write_all(b"\n")?;
            for _ in 0..self.stack.depth().saturating_sub(1) {
                self.sink.write_all(self.indent.as_bytes())?;
            }
        }
        Ok(())
    }

    fn io(&self, e: std::io::Error) -> JsonError {
        let _ = e;
        self.err_enc(EncodingDetail::UnexpectedEof)
    }

    /// Writes whatever separator/indentation is due before a value, and
    /// validates that a value is actually allowed here: `value()`
    /// requires an array context or a dangling name.
    fn before_value(&mut self) -> Result<(), JsonError> {
        self.guard_sink()?;
        match self.stack.peek() {
            Scope::EmptyDocument => {}
            Scope::NonemptyDocument => {
                if !self.lenient {
                    return Err(self.err_enc(EncodingDetail::NestingProblem));
                }
            }
            Scope::EmptyArray => {
                self.write_indent().map_err(|e| self.io(e))?;
            }
            Scope::NonemptyArray => {
                self.sink.write_all(b",").map_err(|e| self.io(e))?;
                self.write_indent().map_err(|e| self.io(e))?;
            }
            Scope::DanglingName => {
                self.sink.write_all(b":").map_err(|e| self.io(e))?;
                if !self.indent.is_empty() {
                    self.sink.write_all(b" ").map_err(|e| self.io(e))?;
                }
            }
            Scope::EmptyObject | Scope::NonemptyObject | Scope::Closed | Scope::StreamingValue => {
                return Err(self.err_enc(EncodingDetail::NestingProblem));
            }
        }
        Ok(())
    }

    fn before_name(&mut self) -> Result<(), JsonError> {
        self.guard_sink()?;
        match self.stack.peek() {
            Scope::EmptyObject => {
                self.write_indent().map_err(|e| self.io(e))?;
            }
            Scope::NonemptyObject => {
                self.sink.write_all(b",").map_err(|e| self.io(e))?;
                self.write_indent().map_err(|e| self.io(e))?;
            }
            _ => return Err(self.err_enc(EncodingDetail::NestingProblem)),
        }
        Ok(())
    }

    fn after_value(&mut self) {
        match self.stack.peek() {
            Scope::EmptyDocument | Scope::NonemptyDocument => {
                self.stack.set_top(Scope::NonemptyDocument);
            }
            Scope::EmptyArray | Scope::NonemptyArray => {
                self.stack.advance_index();
                self.stack.set_top(Scope::NonemptyArray);
            }
            Scope::DanglingName => {
                self.stack.set_top(Scope::NonemptyObject);
            }
            _ => {}
        }
    }

    fn should_dissolve(&self, kind: ContainerKind) -> bool {
        match self.flatten_stack.last() {
            Some(f) => f.depth == self.stack.depth() && f.kind == kind && !f.open,
            None => false,
        }
    }

    fn write_escaped_string(&mut self, s: &str) -> Result<(), JsonError> {
        self.sink.write_all(b"\"").map_err(|e| self.io(e))?;
        for c in s.chars() {
            match c {
                '"' => self.sink.write_all(b"\\\""),
                '\\' => self.sink.write_all(b"\\\\"),
                '\n' => self.sink.write_all(b"\\n"),
                '\r' => self.sink.write_all(b"\\r"),
                '\t' => self.sink.write_all(b"\\t"),
                '\u{8}' => self.sink.write_all(b"\\b"),
                '\u{c}' => self.sink.write_all(b"\\f"),
                '\u{2028}' => self.sink.write_all(b"\\u2028"),
                '\u{2029}' => self.sink.write_all(b"\\u2029"),
                c if (c as u32) < 0x20 => {
                    write!(self.sink, "\\u{:04x}", c as u32)
                }
                c => {
                    let mut buf = [0u8; 4];
                    self.sink.write_all(c.encode_utf8(&mut buf).as_bytes())
                }
            }
            .map_err(|e| self.io(e))?;
        }
        self.sink.write_all(b"\"").map_err(|e| self.io(e))
    }

    fn record_object_value(&mut self, rendered: &str) -> Result<(), JsonError> {
        let name = match self.stack.peek() {
            Scope::DanglingName => self.stack.current_name().map(str::to_string),
            _ => None,
        };
        if let (Some(name), Some(map)) = (name, self.object_values.last_mut()) {
            if let Some(prev) = map.get(&name) {
                return Err(JsonError::message(
                    DataDetail::DuplicateName {
                        name: name.clone(),
                        path: self.stack.path(),
                        first: prev.clone(),
                        second: rendered.to_string(),
                    }
                    .to_string(),
                ));
            }
            map.insert(name, rendered.to_string());
        }
        Ok(())
    }

    fn rendered_string(s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('"');
        out.push_str(s);
        out.push('"');
        out
    }
}

/// RAII guard returned by [`Utf8Writer::value_sink`]. Implements
/// [`std::io::Write`] so pre-formatted JSON bytes can be spliced in
/// directly.
pub struct ValueSink<'a, W> {
    writer: &'a mut Utf8Writer<W>,
}

impl<'a, W: Write> ValueSink<'a, W> {
    /// Marks the spliced value as complete. Must be called; if the
    /// guard is dropped without it, every later writer operation fails
    /// with "Sink from valueSink() was not closed" until the writer is
    /// discarded.
    pub fn finish(self) -> Result<(), JsonError> {
        let ValueSink { writer } = self;
        writer.sink_open = false;
        writer.stack.pop();
        writer.after_value();
        Ok(())
    }
}

impl<'a, W: Write> Write for ValueSink<'a, W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.sink.write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.sink.flush()
    }
}

impl<W: Write> JsonWriter for Utf8Writer<W> {
    fn begin_array(&mut self) -> Result<(), JsonError> {
        if self.should_dissolve(ContainerKind::Array) {
            self.markers.push(Marker::DissolvedArray);
            if let Some(f) = self.flatten_stack.last_mut() {
                f.open = true;
            }
            return Ok(());
        }
        self.before_value()?;
        self.sink.write_all(b"[").map_err(|e| self.io(e))?;
        self.stack.push(Scope::EmptyArray, FrameKind::Array)?;
        self.markers.push(Marker::RealArray);
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), JsonError> {
        match self.markers.pop() {
            Some(Marker::DissolvedArray) => {
                if let Some(f) = self.flatten_stack.last_mut() {
                    f.open = false;
                }
                Ok(())
            }
            Some(Marker::RealArray) => {
                if !matches!(self.stack.peek(), Scope::EmptyArray | Scope::NonemptyArray) {
                    return Err(self.err_enc(EncodingDetail::NestingProblem));
                }
                if !matches!(self.stack.peek(), Scope::EmptyArray) {
                    self.write_indent().map_err(|e| self.io(e))?;
                }
                self.sink.write_all(b"]").map_err(|e| self.io(e))?;
                self.stack.pop();
                self.after_value();
                Ok(())
            }
            _ => Err(self.err_enc(EncodingDetail::NestingProblem)),
        }
    }

    fn begin_object(&mut self) -> Result<(), JsonError> {
        if self.should_dissolve(ContainerKind::Object) {
            self.markers.push(Marker::DissolvedObject);
            if let Some(f) = self.flatten_stack.last_mut() {
                f.open = true;
            }
            return Ok(());
        }
        self.before_value()?;
        self.sink.write_all(b"{").map_err(|e| self.io(e))?;
        self.stack.push(Scope::EmptyObject, FrameKind::Object)?;
        self.markers.push(Marker::RealObject);
        self.object_values.push(HashMap::new());
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), JsonError> {
        match self.markers.pop() {
            Some(Marker::DissolvedObject) => {
                if let Some(f) = self.flatten_stack.last_mut() {
                    f.open = false;
                }
                Ok(())
            }
            Some(Marker::RealObject) => {
                if !matches!(self.stack.peek(), Scope::EmptyObject | Scope::NonemptyObject) {
                    return Err(self.err_enc(EncodingDetail::NestingProblem));
                }
                if !matches!(self.stack.peek(), Scope::EmptyObject) {
                    self.write_indent().map_err(|e| self.io(e))?;
                }
                self.sink.write_all(b"}").map_err(|e| self.io(e))?;
                self.stack.pop();
                self.object_values.pop();
                self.after_value();
                Ok(())
            }
            _ => Err(self.err_enc(EncodingDetail::NestingProblem)),
        }
    }

    fn name(&mut self, name: &str) -> Result<(), JsonError> {
        if self.promote_pending {
            return Err(self.err_data(DataDetail::CannotPromote));
        }
        self.before_name()?;
        self.write_escaped_string(name)?;
        self.stack.set_top(Scope::DanglingName);
        self.stack.set_name(name);
        Ok(())
    }

    fn value_string(&mut self, value: &str) -> Result<(), JsonError> {
        if self.promote_pending {
            self.promote_pending = false;
            return self.name(value);
        }
        self.before_value()?;
        self.record_object_value(&Self::rendered_string(value))?;
        self.write_escaped_string(value)?;
        self.after_value();
        Ok(())
    }

    fn value_number(&mut self, value: JsonNumber) -> Result<(), JsonError> {
        if !self.lenient && value.is_float() && !value.as_f64().is_finite() {
            return Err(self.err_enc(EncodingDetail::NonFiniteNotAllowed(value.as_f64())));
        }
        let rendered = value.to_string();
        if self.promote_pending {
            self.promote_pending = false;
            return self.name(&rendered);
        }
        self.before_value()?;
        self.record_object_value(&rendered)?;
        self.sink
            .write_all(rendered.as_bytes())
            .map_err(|e| self.io(e))?;
        self.after_value();
        Ok(())
    }

    fn value_bool(&mut self, value: bool) -> Result<(), JsonError> {
        if self.promote_pending {
            return Err(self.err_data(DataDetail::CannotPromote));
        }
        self.before_value()?;
        let rendered = if value { "true" } else { "false" };
        self.record_object_value(rendered)?;
        self.sink
            .write_all(rendered.as_bytes())
            .map_err(|e| self.io(e))?;
        self.after_value();
        Ok(())
    }

    fn value_null(&mut self) -> Result<(), JsonError> {
        if self.promote_pending {
            return Err(self.err_data(DataDetail::CannotPromote));
        }
        // serialize_nulls=false suppresses a pending name+null pair
        // entirely.
        if matches!(self.stack.peek(), Scope::DanglingName) && !self.serialize_nulls {
            // Undo the dangling name: it and its (suppressed) null are
            // simply not written.
            self.stack.set_top(Scope::EmptyObject);
            return Ok(());
        }
        self.before_value()?;
        self.record_object_value("null")?;
        self.sink.write_all(b"null").map_err(|e| self.io(e))?;
        self.after_value();
        Ok(())
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
        self.guard_sink()?;
        if !matches!(self.stack.peek(), Scope::NonemptyDocument) {
            return Err(self.err_enc(EncodingDetail::NestingProblem));
        }
        self.stack = PathStack::new();
        self.stack.set_top(Scope::Closed);
        Ok(())
    }
}
