//! Byte-stream tokenizer. Reads from any [`std::io::Read`]
//! source on demand and buffers a forward window; strict mode enforces
//! RFC 8259, lenient mode accepts the documented extensions (`NaN`,
//! `Infinity`, single-quoted strings, unquoted names, comments, trailing
//! top-level values).
//!
//! The buffer only ever grows forward from the logical cursor: bytes
//! behind the cursor are never discarded. This trades a stricter memory
//! bound for the ability to hand out [`Utf8Reader::value_source`] slices
//! and [`Utf8Reader::peek_json`] cursors that borrow directly from the
//! same buffer, which is the shape a zero-copy byte source needs:
//! a slice spanning exactly one upcoming JSON value, or an independent
//! reader positioned at the same logical cursor.

use crate::error::{DataDetail, EncodingDetail, JsonError};
use crate::number::JsonNumber;
use crate::path::{FrameKind, PathStack, Scope};
use crate::reader::JsonReader;
use crate::select::{SelectOptions, NO_MATCH};
use crate::token::Token;
use std::io::Read;

pub struct Utf8Reader<R> {
    source: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
    stack: PathStack,
    lenient: bool,
    fail_on_unknown: bool,
    peeked: Option<Token>,
    /// Set by `promote_name_to_value`: the just-consumed object-entry
    /// name, readable once through the next scalar accessor instead of
    /// the real upcoming value.
    promoted: Option<String>,
}

impl<R: Read> Utf8Reader<R> {
    pub fn new(source: R) -> Self {
        Utf8Reader {
            source,
            buf: Vec::new(),
            pos: 0,
            eof: false,
            stack: PathStack::new(),
            lenient: false,
            fail_on_unknown: false,
            peeked: None,
            promoted: None,
        }
    }

    /// Lends a byte slice spanning exactly the next upcoming JSON value,
    /// byte-for-byte including quotes and escapes. Advances the cursor
    /// past the value. This is a lossless splice primitive: the bytes
    /// returned are exactly what a writer's `valueSink` would need to
    /// reproduce the value unchanged.
    pub fn value_source(&mut self) -> Result<&[u8], JsonError> {
        // peek() first so any leading separator/colon/whitespace is
        // consumed before we mark where the value itself begins.
        self.peek()?;
        let start = self.pos;
        Utf8Reader::skip_value(self)?;
        Ok(&self.buf[start..self.pos])
    }

    /// Returns an independent reader over the same remaining input,
    /// sharing no mutable state with `self`. Because the buffer only
    /// ever grows, the forward window from the current cursor is always
    /// a valid, self-contained document fragment to hand to a clone.
    pub fn peek_json(&self) -> Utf8Reader<&[u8]>
    where
        R: Sized,
    {
        Utf8Reader {
            source: &self.buf[self.pos..],
            buf: Vec::new(),
            pos: 0,
            eof: false,
            stack: self.stack.clone(),
            lenient: self.lenient,
            fail_on_unknown: self.fail_on_unknown,
            peeked: None,
            promoted: None,
        }
    }

    fn fill(&mut self, need: usize) -> Result<bool, JsonError> {
        while !self.eof && self.buf.len() - self.pos < need {
            let mut chunk = [0u8; 4096];
            let n = self
                .source
                .read(&mut chunk)
                .map_err(|_| JsonError::encoding(self.stack.path(), EncodingDetail::UnexpectedEof))?;
            if n == 0 {
                self.eof = true;
            } else {
                self.buf.extend_from_slice(&chunk[..n]);
            }
        }
        Ok(self.buf.len() - self.pos >= need)
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, JsonError> {
        if !self.fill(1)? {
            return Ok(None);
        }
        Ok(Some(self.buf[self.pos]))
    }

    fn advance_byte(&mut self) {
        self.pos += 1;
    }

    fn err_enc(&self, detail: EncodingDetail) -> JsonError {
        JsonError::encoding(self.stack.path(), detail)
    }

    fn err_data(&self, detail: DataDetail) -> JsonError {
        JsonError::data(self.stack.path(), detail)
    }

    fn require_lenient(&self) -> Result<(), JsonError> {
        if self.lenient {
            Ok(())
        } else {
            Err(self.err_enc(EncodingDetail::LenientRequired))
        }
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), JsonError> {
        loop {
            match self.peek_byte()? {
                Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => self.advance_byte(),
                Some(b'/') => {
                    self.require_lenient()?;
                    // Lookahead without consuming unless it really is a comment.
                    self.fill(2)?;
                    match self.buf.get(self.pos + 1).copied() {
                        Some(b'/') => {
                            self.pos += 2;
                            loop {
                                match self.peek_byte()? {
                                    None | Some(b'\n') => break,
                                    Some(_) => self.advance_byte(),
                                }
                            }
                        }
                        Some(b'*') => {
                            self.pos += 2;
                            loop {
                                match self.peek_byte()? {
                                    None => {
                                        return Err(self.err_enc(EncodingDetail::UnexpectedEof))
                                    }
                                    Some(b'*') => {
                                        self.advance_byte();
                                        if self.peek_byte()? == Some(b'/') {
                                            self.advance_byte();
                                            break;
                                        }
                                    }
                                    Some(_) => self.advance_byte(),
                                }
                            }
                        }
                        _ => return Err(self.err_enc(EncodingDetail::UnexpectedCharacter('/'))),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Consumes a structural separator expected between this scope's
    /// elements/fields, if the scope says one is due.
    fn consume_separator(&mut self, close: u8) -> Result<bool, JsonError> {
        self.skip_whitespace_and_comments()?;
        match self.peek_byte()? {
            Some(c) if c == close => Ok(true),
            Some(b',') => {
                self.advance_byte();
                self.skip_whitespace_and_comments()?;
                // Lenient mode tolerates a trailing comma immediately
                // before the closing bracket/brace as a terminator
                // rather than requiring one more element/field.
                if self.lenient && self.peek_byte()? == Some(close) {
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            None => Err(self.err_enc(EncodingDetail::UnexpectedEof)),
            Some(c) => Err(self.err_enc(EncodingDetail::UnexpectedCharacter(c as char))),
        }
    }

    fn classify_literal_start(&mut self) -> Result<Token, JsonError> {
        self.skip_whitespace_and_comments()?;
        match self.peek_byte()? {
            None => Err(self.err_enc(EncodingDetail::UnexpectedEof)),
            Some(b'"') => Ok(Token::String),
            Some(b'\'') => {
                self.require_lenient()?;
                Ok(Token::String)
            }
            Some(b'{') => Ok(Token::BeginObject),
            Some(b'[') => Ok(Token::BeginArray),
            Some(b't') if self.word_matches(b"true") => Ok(Token::Boolean),
            Some(b'f') if self.word_matches(b"false") => Ok(Token::Boolean),
            Some(b'n') if self.word_matches(b"null") => Ok(Token::Null),
            Some(c) if (c == b't' || c == b'f' || c == b'n') => {
                self.require_lenient()?;
                Ok(Token::String)
            }
            Some(c) if c == b'-' || c.is_ascii_digit() => Ok(Token::Number),
            Some(b'N') if self.lenient && self.word_matches(b"NaN") => Ok(Token::Number),
            Some(b'I') if self.lenient && self.word_matches(b"Infinity") => Ok(Token::Number),
            Some(c) if is_lenient_literal_start(c) => {
                self.require_lenient()?;
                Ok(Token::String)
            }
            Some(c) => Err(self.err_enc(EncodingDetail::UnexpectedCharacter(c as char))),
        }
    }

    fn do_peek(&mut self) -> Result<Token, JsonError> {
        if let Some(t) = self.peeked {
            return Ok(t);
        }
        let token = match self.stack.peek() {
            Scope::Closed => {
                return Err(self.err_enc(EncodingDetail::NestingProblem));
            }
            Scope::StreamingValue => return Err(self.err_enc(EncodingDetail::SinkNotClosed)),
            Scope::EmptyDocument => {
                self.skip_whitespace_and_comments()?;
                self.classify_literal_start()?
            }
            Scope::NonemptyDocument => {
                self.skip_whitespace_and_comments()?;
                if self.peek_byte()?.is_none() {
                    Token::EndDocument
                } else {
                    self.classify_literal_start()?
                }
            }
            Scope::EmptyArray => {
                self.skip_whitespace_and_comments()?;
                if self.peek_byte()? == Some(b']') {
                    Token::EndArray
                } else {
                    self.classify_literal_start()?
                }
            }
            Scope::NonemptyArray => {
                if self.consume_separator(b']')? {
                    Token::EndArray
                } else {
                    self.classify_literal_start()?
                }
            }
            Scope::EmptyObject => {
                self.skip_whitespace_and_comments()?;
                if self.peek_byte()? == Some(b'}') {
                    Token::EndObject
                } else {
                    self.classify_name_start()?
                }
            }
            Scope::NonemptyObject => {
                if self.consume_separator(b'}')? {
                    Token::EndObject
                } else {
                    self.classify_name_start()?
                }
            }
            Scope::DanglingName => {
                self.skip_whitespace_and_comments()?;
                match self.peek_byte()? {
                    Some(b':') => {
                        self.advance_byte();
                        self.skip_whitespace_and_comments()?;
                    }
                    Some(c) => return Err(self.err_enc(EncodingDetail::UnexpectedCharacter(c as char))),
                    None => return Err(self.err_enc(EncodingDetail::UnexpectedEof)),
                }
                self.classify_literal_start()?
            }
        };
        self.peeked = Some(token);
        Ok(token)
    }

    fn classify_name_start(&mut self) -> Result<Token, JsonError> {
        self.skip_whitespace_and_comments()?;
        match self.peek_byte()? {
            None => Err(self.err_enc(EncodingDetail::UnexpectedEof)),
            Some(b'"') => Ok(Token::Name),
            Some(b'\'') => {
                self.require_lenient()?;
                Ok(Token::Name)
            }
            Some(c) if is_lenient_literal_start(c) => {
                self.require_lenient()?;
                Ok(Token::Name)
            }
            Some(c) => Err(self.err_enc(EncodingDetail::UnexpectedCharacter(c as char))),
        }
    }

    fn read_quoted_string(&mut self) -> Result<String, JsonError> {
        let quote = self.peek_byte()?.expect("caller verified quote present");
        self.advance_byte();
        let mut out = String::new();
        loop {
            match self.peek_byte()? {
                None => return Err(self.err_enc(EncodingDetail::UnterminatedString)),
                Some(c) if c == quote => {
                    self.advance_byte();
                    return Ok(out);
                }
                Some(b'\\') => {
                    self.advance_byte();
                    out.push(self.read_escape()?);
                }
                Some(lead) => {
                    // Decode exactly one UTF-8 scalar value, sized from
                    // its leading byte, rather than validating the
                    // whole remaining buffer on every character.
                    let width = utf8_char_width(lead);
                    self.fill(width)?;
                    let bytes = &self.buf[self.pos..self.pos + width];
                    let ch = std::str::from_utf8(bytes)
                        .ok()
                        .and_then(|s| s.chars().next())
                        .ok_or_else(|| self.err_enc(EncodingDetail::UnexpectedCharacter('\u{FFFD}')))?;
                    self.pos += width;
                    out.push(ch);
                }
            }
        }
    }

    fn read_escape(&mut self) -> Result<char, JsonError> {
        let c = self
            .peek_byte()?
            .ok_or_else(|| self.err_enc(EncodingDetail::MalformedEscape))?;
        self.advance_byte();
        Ok(match c {
            b'"' => '"',
            b'\'' => '\'',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'\n' => return Ok('\n'), // lenient: escaped literal newline
            b'u' => {
                self.fill(4)?;
                let hex = std::str::from_utf8(&self.buf[self.pos..self.pos + 4])
                    .ok()
                    .ok_or_else(|| self.err_enc(EncodingDetail::MalformedEscape))?;
                let cp = u32::from_str_radix(hex, 16)
                    .map_err(|_| self.err_enc(EncodingDetail::MalformedEscape))?;
                self.pos += 4;
                char::from_u32(cp).unwrap_or('\u{FFFD}')
            }
            _ => return Err(self.err_enc(EncodingDetail::MalformedEscape)),
        })
    }

    fn read_unquoted_literal(&mut self) -> Result<String, JsonError> {
        let mut out = String::new();
        loop {
            match self.peek_byte()? {
                Some(c) if is_lenient_literal_part(c) => {
                    out.push(c as char);
                    self.advance_byte();
                }
                _ => break,
            }
        }
        Ok(out)
    }

    fn scan_number_literal(&mut self) -> Result<String, JsonError> {
        let mut out = String::new();
        if self.peek_byte()? == Some(b'-') {
            out.push('-');
            self.advance_byte();
        }
        if self.lenient {
            if self.peek_bytes_are(b"Infinity") {
                out.push_str("Infinity");
                self.pos += 8;
                return Ok(out);
            }
        }
        if self.peek_byte()? == Some(b'N') {
            self.require_lenient()?;
            if self.peek_bytes_are(b"NaN") {
                out.push_str("NaN");
                self.pos += 3;
                return Ok(out);
            }
        }
        let mut saw_digit = false;
        while let Some(c) = self.peek_byte()? {
            if c.is_ascii_digit() {
                saw_digit = true;
                out.push(c as char);
                self.advance_byte();
            } else {
                break;
            }
        }
        if self.peek_byte()? == Some(b'.') {
            out.push('.');
            self.advance_byte();
            while let Some(c) = self.peek_byte()? {
                if c.is_ascii_digit() {
                    saw_digit = true;
                    out.push(c as char);
                    self.advance_byte();
                } else {
                    break;
                }
            }
        }
        if matches!(self.peek_byte()?, Some(b'e') | Some(b'E')) {
            out.push(self.peek_byte()?.unwrap() as char);
            self.advance_byte();
            if matches!(self.peek_byte()?, Some(b'+') | Some(b'-')) {
                out.push(self.peek_byte()?.unwrap() as char);
                self.advance_byte();
            }
            while let Some(c) = self.peek_byte()? {
                if c.is_ascii_digit() {
                    out.push(c as char);
                    self.advance_byte();
                } else {
                    break;
                }
            }
        }
        if !saw_digit {
            return Err(self.err_enc(EncodingDetail::UnexpectedCharacter(
                out.chars().last().unwrap_or('?'),
            )));
        }
        Ok(out)
    }

    /// True if the upcoming bytes spell exactly `word` followed by a
    /// token boundary (not continued by another literal character), so
    /// `"truest"` is not mistaken for the boolean `true`.
    fn word_matches(&mut self, word: &[u8]) -> bool {
        let _ = self.fill(word.len() + 1);
        if self.buf.len() - self.pos < word.len() {
            return false;
        }
        if &self.buf[self.pos..self.pos + word.len()] != word {
            return false;
        }
        match self.buf.get(self.pos + word.len()) {
            None => true,
            Some(&c) => !is_lenient_literal_part(c),
        }
    }

    fn peek_bytes_are(&mut self, expect: &[u8]) -> bool {
        if self.fill(expect.len()).unwrap_or(false) {
            &self.buf[self.pos..self.pos + expect.len()] == expect
        } else {
            false
        }
    }

    fn expect_literal(&mut self, lit: &str, value: &str) -> Result<(), JsonError> {
        if self.fill(lit.len())? && &self.buf[self.pos..self.pos + lit.len()] == lit.as_bytes() {
            self.pos += lit.len();
            Ok(())
        } else {
            Err(self.err_enc(EncodingDetail::UnexpectedCharacter(
                value.chars().next().unwrap_or('?'),
            )))
        }
    }

    /// Equivalent of the value-consuming half of `skipValue`, used both
    /// by the public `skip_value` and by `value_source`.
    fn skip_value(&mut self) -> Result<(), JsonError> {
        match self.peek()? {
            Token::BeginArray => {
                self.begin_array()?;
                while self.has_next()? {
                    self.skip_value()?;
                }
                self.end_array()
            }
            Token::BeginObject => {
                self.begin_object()?;
                while self.has_next()? {
                    self.next_name()?;
                    self.skip_value()?;
                }
                self.end_object()
            }
            Token::String => self.next_string().map(|_| ()),
            Token::Number => self.next_number().map(|_| ()),
            Token::Boolean => self.next_boolean().map(|_| ()),
            Token::Null => self.next_null(),
            Token::Name => self.next_name().map(|_| ()),
            t @ (Token::EndArray | Token::EndObject | Token::EndDocument) => {
                Err(self.err_data(DataDetail::CannotSkipUnexpected(t)))
            }
        }
    }
}

fn utf8_char_width(lead: u8) -> usize {
    if lead & 0x80 == 0 {
        1
    } else if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else {
        4
    }
}

fn is_lenient_literal_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn is_lenient_literal_part(c: u8) -> bool {
    !matches!(
        c,
        b' ' | b'\t' | b'\n' | b'\r' | b',' | b':' | b'{' | b'}' | b'[' | b']' | b'/' | b'\\' | b'"' | b'\''
    )
}

/// Classifies a name string standing in for a promoted scalar, the same
/// way the tokenizer would classify it if it had appeared unquoted at a
/// value position.
fn classify_promoted(s: &str) -> Token {
    if JsonNumber::parse(s).is_some() {
        Token::Number
    } else if s == "true" || s == "false" {
        Token::Boolean
    } else if s == "null" {
        Token::Null
    } else {
        Token::String
    }
}

impl<R: Read> JsonReader for Utf8Reader<R> {
    fn peek(&mut self) -> Result<Token, JsonError> {
        if let Some(p) = &self.promoted {
            return Ok(classify_promoted(p));
        }
        self.do_peek()
    }

    fn begin_array(&mut self) -> Result<(), JsonError> {
        match self.peek()? {
            Token::BeginArray => {
                self.peeked = None;
                self.advance_byte();
                self.mark_value_consumed();
                self.stack.push(Scope::EmptyArray, FrameKind::Array)?;
                Ok(())
            }
            other => Err(self.err_data(DataDetail::UnexpectedToken {
                expected: Token::BeginArray,
                actual: other,
            })),
        }
    }

    fn end_array(&mut self) -> Result<(), JsonError> {
        match self.peek()? {
            Token::EndArray => {
                self.peeked = None;
                self.advance_byte();
                self.stack.pop();
                self.mark_value_consumed();
                Ok(())
            }
            other => Err(self.err_data(DataDetail::UnexpectedToken {
                expected: Token::EndArray,
                actual: other,
            })),
        }
    }

    fn begin_object(&mut self) -> Result<(), JsonError> {
        match self.peek()? {
            Token::BeginObject => {
                self.peeked = None;
                self.advance_byte();
                self.mark_value_consumed();
                self.stack.push(Scope::EmptyObject, FrameKind::Object)?;
                Ok(())
            }
            other => Err(self.err_data(DataDetail::UnexpectedToken {
                expected: Token::BeginObject,
                actual: other,
            })),
        }
    }

    fn end_object(&mut self) -> Result<(), JsonError> {
        match self.peek()? {
            Token::EndObject => {
                self.peeked = None;
                self.advance_byte();
                self.stack.pop();
                self.mark_value_consumed();
                Ok(())
            }
            other => Err(self.err_data(DataDetail::UnexpectedToken {
                expected: Token::EndObject,
                actual: other,
            })),
        }
    }

    fn has_next(&mut self) -> Result<bool, JsonError> {
        let t = self.peek()?;
        Ok(!matches!(t, Token::EndArray | Token::EndObject))
    }

    fn next_name(&mut self) -> Result<String, JsonError> {
        match self.peek()? {
            Token::Name => {
                self.peeked = None;
                let name = match self.peek_byte()? {
                    Some(b'"') | Some(b'\'') => self.read_quoted_string()?,
                    _ => self.read_unquoted_literal()?,
                };
                self.stack.set_top(Scope::DanglingName);
                self.stack.set_name(name.clone());
                Ok(name)
            }
            other => Err(self.err_data(DataDetail::UnexpectedToken {
                expected: Token::Name,
                actual: other,
            })),
        }
    }

    fn next_string(&mut self) -> Result<String, JsonError> {
        if let Some(p) = self.promoted.take() {
            return Ok(p);
        }
        match self.peek()? {
            Token::String => {
                self.peeked = None;
                let s = match self.peek_byte()? {
                    Some(b'"') | Some(b'\'') => self.read_quoted_string()?,
                    _ => self.read_unquoted_literal()?,
                };
                self.mark_value_consumed();
                Ok(s)
            }
            other => Err(self.err_data(DataDetail::UnexpectedToken {
                expected: Token::String,
                actual: other,
            })),
        }
    }

    fn next_boolean(&mut self) -> Result<bool, JsonError> {
        if let Some(p) = self.promoted.take() {
            return match p.as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(self.err_data(DataDetail::UnexpectedToken {
                    expected: Token::Boolean,
                    actual: classify_promoted(&p),
                })),
            };
        }
        match self.peek()? {
            Token::Boolean => {
                self.peeked = None;
                let result = match self.peek_byte()? {
                    Some(b't') => {
                        self.expect_literal("true", "true")?;
                        true
                    }
                    Some(b'f') => {
                        self.expect_literal("false", "false")?;
                        false
                    }
                    _ => unreachable!("peek classified this as BOOLEAN"),
                };
                self.mark_value_consumed();
                Ok(result)
            }
            other => Err(self.err_data(DataDetail::UnexpectedToken {
                expected: Token::Boolean,
                actual: other,
            })),
        }
    }

    fn next_null(&mut self) -> Result<(), JsonError> {
        if let Some(p) = self.promoted.take() {
            return if p == "null" {
                Ok(())
            } else {
                Err(self.err_data(DataDetail::UnexpectedToken {
                    expected: Token::Null,
                    actual: classify_promoted(&p),
                }))
            };
        }
        match self.peek()? {
            Token::Null => {
                self.peeked = None;
                self.expect_literal("null", "null")?;
                self.mark_value_consumed();
                Ok(())
            }
            other => Err(self.err_data(DataDetail::UnexpectedToken {
                expected: Token::Null,
                actual: other,
            })),
        }
    }

    fn next_number(&mut self) -> Result<JsonNumber, JsonError> {
        if let Some(p) = self.promoted.take() {
            return JsonNumber::parse(&p)
                .ok_or_else(|| self.err_data(DataDetail::NumberNotRepresentable(p.clone())));
        }
        match self.peek()? {
            Token::Number => {
                self.peeked = None;
                let literal = self.scan_number_literal()?;
                let n = JsonNumber::parse(&literal)
                    .ok_or_else(|| self.err_data(DataDetail::NumberNotRepresentable(literal.clone())))?;
                if n.is_float() && !n.as_f64().is_finite() && !self.lenient {
                    return Err(self.err_enc(EncodingDetail::NonFiniteNotAllowed(n.as_f64())));
                }
                self.mark_value_consumed();
                Ok(n)
            }
            other => Err(self.err_data(DataDetail::UnexpectedToken {
                expected: Token::Number,
                actual: other,
            })),
        }
    }

    fn promote_name_to_value(&mut self) -> Result<(), JsonError> {
        let name = self.next_name()?;
        self.promoted = Some(name);
        Ok(())
    }

    fn next_double(&mut self) -> Result<f64, JsonError> {
        let n = self.next_number()?;
        Ok(n.as_f64())
    }

    fn skip_value(&mut self) -> Result<(), JsonError> {
        let t = self.peek()?;
        if self.fail_on_unknown {
            return Err(self.err_data(DataDetail::CannotSkipUnexpected(t)));
        }
        let in_object_name_position = t == Token::Name;
        Utf8Reader::skip_value(self)?;
        if in_object_name_position {
            self.stack.set_name_skipped();
        }
        Ok(())
    }

    fn select_name(&mut self, options: &SelectOptions) -> Result<i32, JsonError> {
        if self.peek()? != Token::Name {
            return Ok(NO_MATCH);
        }
        // Non-destructive probe: names are cheap to re-derive since the
        // underlying bytes are never discarded.
        let save_pos = self.pos;
        let save_peeked = self.peeked;
        let save_stack = self.stack.clone();
        let name = self.next_name()?;
        let idx = options.index_of(&name);
        if idx == NO_MATCH {
            // Un-consume: options that don't match must not advance past
            // unmatched content.
            self.pos = save_pos;
            self.peeked = save_peeked;
            self.stack = save_stack;
        }
        Ok(idx)
    }

    fn select_string(&mut self, options: &SelectOptions) -> Result<i32, JsonError> {
        if self.peek()? != Token::String {
            return Ok(NO_MATCH);
        }
        let save_pos = self.pos;
        let save_peeked = self.peeked;
        let save_stack = self.stack.clone();
        let s = self.next_string()?;
        let idx = options.index_of(&s);
        if idx == NO_MATCH {
            self.pos = save_pos;
            self.peeked = save_peeked;
            self.stack = save_stack;
        }
        Ok(idx)
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

    fn set_fail_on_unknown(&mut self, fail: bool) {
        self.fail_on_unknown = fail;
    }

    fn fail_on_unknown(&self) -> bool {
        self.fail_on_unknown
    }

    fn close(&mut self) -> Result<(), JsonError> {
        self.stack = PathStack::new();
        self.stack.set_top(Scope::Closed);
        Ok(())
    }
}

impl<R> Utf8Reader<R> {
    /// After consuming a scalar value or closing a container, advance
    /// the enclosing array index or flip an object scope from
    /// EMPTY/DANGLING_NAME to NONEMPTY.
    fn mark_value_consumed(&mut self) {
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
}
