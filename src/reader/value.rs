//! `ValueReader`, the tree-backed reader: walks a borrowed
//! [`JsonValue`] through the same `JsonReader` token protocol the
//! UTF-8 tokenizer implements, without ever touching bytes.

use crate::error::{DataDetail, EncodingDetail, JsonError};
use crate::number::JsonNumber;
use crate::path::{FrameKind, PathStack, Scope};
use crate::reader::JsonReader;
use crate::select::{SelectOptions, NO_MATCH};
use crate::token::Token;
use crate::value::JsonValue;

enum NavFrame<'a> {
    Array(&'a [JsonValue]),
    /// Collected `(name, value)` pairs in insertion order, plus the
    /// index of the next name to surface.
    Object(Vec<(&'a str, &'a JsonValue)>, usize),
}

pub struct ValueReader<'a> {
    stack: PathStack,
    nav: Vec<NavFrame<'a>>,
    root: &'a JsonValue,
    root_consumed: bool,
    lenient: bool,
    fail_on_unknown: bool,
    peeked: Option<Token>,
    /// Set by `promote_name_to_value`: the just-consumed object-entry
    /// name, readable once through the next scalar accessor instead of
    /// the real upcoming value.
    promoted: Option<String>,
}

/// Classifies a name string standing in for a promoted scalar, the same
/// way the underlying value would classify if it were the actual token.
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

fn token_for(v: &JsonValue) -> Token {
    match v {
        JsonValue::Null => Token::Null,
        JsonValue::Bool(_) => Token::Boolean,
        JsonValue::Number(_) => Token::Number,
        JsonValue::String(_) => Token::String,
        JsonValue::Array(_) => Token::BeginArray,
        JsonValue::Object(_) => Token::BeginObject,
    }
}

impl<'a> ValueReader<'a> {
    pub fn new(root: &'a JsonValue) -> Self {
        ValueReader {
            stack: PathStack::new(),
            nav: Vec::new(),
            root,
            root_consumed: false,
            lenient: false,
            fail_on_unknown: false,
            peeked: None,
            promoted: None,
        }
    }

    fn err_enc(&self, detail: EncodingDetail) -> JsonError {
        JsonError::encoding(self.stack.path(), detail)
    }

    fn err_data(&self, detail: DataDetail) -> JsonError {
        JsonError::data(self.stack.path(), detail)
    }

    /// The value the reader is currently positioned at, or `None` if the
    /// enclosing container/document is exhausted.
    fn current_value(&self) -> Option<&'a JsonValue> {
        match self.nav.last() {
            None => {
                if self.root_consumed {
                    None
                } else {
                    Some(self.root)
                }
            }
            Some(NavFrame::Array(items)) => {
                let idx = (self.stack.current_index().unwrap_or(-1) + 1) as usize;
                items.get(idx)
            }
            Some(NavFrame::Object(entries, idx)) => {
                if matches!(self.stack.peek(), Scope::DanglingName) {
                    entries.get(*idx).map(|(_, v)| *v)
                } else {
                    None
                }
            }
        }
    }

    fn mark_value_consumed(&mut self) {
        match self.stack.peek() {
            Scope::EmptyDocument | Scope::NonemptyDocument => {
                self.root_consumed = true;
                self.stack.set_top(Scope::NonemptyDocument);
            }
            Scope::EmptyArray | Scope::NonemptyArray => {
                self.stack.advance_index();
                self.stack.set_top(Scope::NonemptyArray);
            }
            Scope::DanglingName => {
                if let Some(NavFrame::Object(_, idx)) = self.nav.last_mut() {
                    *idx += 1;
                }
                self.stack.set_top(Scope::NonemptyObject);
            }
            _ => {}
        }
    }

    fn require(&mut self, expected: Token) -> Result<&'a JsonValue, JsonError> {
        let actual = self.peek()?;
        if actual != expected {
            return Err(self.err_data(DataDetail::UnexpectedToken { expected, actual }));
        }
        let v = self
            .current_value()
            .expect("token classification implies a value is present");
        self.peeked = None;
        Ok(v)
    }
}

impl<'a> JsonReader for ValueReader<'a> {
    fn peek(&mut self) -> Result<Token, JsonError> {
        if let Some(p) = &self.promoted {
            return Ok(classify_promoted(p));
        }
        if let Some(t) = self.peeked {
            return Ok(t);
        }
        if self.stack.is_closed() {
            return Err(self.err_enc(EncodingDetail::UnexpectedEof));
        }
        let t = match self.stack.peek() {
            Scope::EmptyDocument | Scope::NonemptyDocument => match self.current_value() {
                Some(v) => token_for(v),
                None => Token::EndDocument,
            },
            Scope::EmptyArray | Scope::NonemptyArray => match self.current_value() {
                Some(v) => token_for(v),
                None => Token::EndArray,
            },
            Scope::EmptyObject | Scope::NonemptyObject => match self.nav.last() {
                Some(NavFrame::Object(entries, idx)) if *idx < entries.len() => Token::Name,
                _ => Token::EndObject,
            },
            Scope::DanglingName => match self.current_value() {
                Some(v) => token_for(v),
                None => Token::EndObject,
            },
            Scope::StreamingValue | Scope::Closed => {
                return Err(self.err_enc(EncodingDetail::UnexpectedEof));
            }
        };
        self.peeked = Some(t);
        Ok(t)
    }

    fn begin_array(&mut self) -> Result<(), JsonError> {
        let v = self.require(Token::BeginArray)?;
        let items = v.as_array().expect("BeginArray token implies Array");
        self.mark_value_consumed();
        self.stack.push(Scope::EmptyArray, FrameKind::Array)?;
        self.nav.push(NavFrame::Array(items));
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), JsonError> {
        self.require(Token::EndArray)?;
        self.nav.pop();
        self.stack.pop();
        Ok(())
    }

    fn begin_object(&mut self) -> Result<(), JsonError> {
        let v = self.require(Token::BeginObject)?;
        let map = v.as_object().expect("BeginObject token implies Object");
        self.mark_value_consumed();
        self.stack.push(Scope::EmptyObject, FrameKind::Object)?;
        self.nav.push(NavFrame::Object(map.iter().collect(), 0));
        Ok(())
    }

    fn end_object(&mut self) -> Result<(), JsonError> {
        self.require(Token::EndObject)?;
        self.nav.pop();
        self.stack.pop();
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool, JsonError> {
        Ok(!matches!(self.peek()?, Token::EndArray | Token::EndObject))
    }

    fn next_name(&mut self) -> Result<String, JsonError> {
        let actual = self.peek()?;
        if actual != Token::Name {
            return Err(self.err_data(DataDetail::UnexpectedToken {
                expected: Token::Name,
                actual,
            }));
        }
        let name = match self.nav.last() {
            Some(NavFrame::Object(entries, idx)) => entries[*idx].0.to_string(),
            _ => unreachable!("Name token implies an object frame"),
        };
        self.stack.set_top(Scope::DanglingName);
        self.stack.set_name(&name);
        self.peeked = None;
        Ok(name)
    }

    fn next_string(&mut self) -> Result<String, JsonError> {
        if let Some(p) = self.promoted.take() {
            return Ok(p);
        }
        let v = self.require(Token::String)?;
        let s = v.as_str().expect("String token implies String").to_string();
        self.mark_value_consumed();
        Ok(s)
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
        let v = self.require(Token::Boolean)?;
        let b = v.as_bool().expect("Boolean token implies Bool");
        self.mark_value_consumed();
        Ok(b)
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
        self.require(Token::Null)?;
        self.mark_value_consumed();
        Ok(())
    }

    fn next_number(&mut self) -> Result<JsonNumber, JsonError> {
        if let Some(p) = self.promoted.take() {
            return JsonNumber::parse(&p)
                .ok_or_else(|| self.err_data(DataDetail::NumberNotRepresentable(p.clone())));
        }
        let v = self.require(Token::Number)?;
        let n = v.as_number().expect("Number token implies Number").clone();
        self.mark_value_consumed();
        Ok(n)
    }

    fn promote_name_to_value(&mut self) -> Result<(), JsonError> {
        let name = self.next_name()?;
        self.promoted = Some(name);
        Ok(())
    }

    fn next_double(&mut self) -> Result<f64, JsonError> {
        let n = self.next_number()?;
        let f = n.as_f64();
        if !self.lenient && !f.is_finite() {
            return Err(self.err_enc(EncodingDetail::NonFiniteNotAllowed(f)));
        }
        Ok(f)
    }

    fn skip_value(&mut self) -> Result<(), JsonError> {
        let t = self.peek()?;
        if self.fail_on_unknown {
            return Err(self.err_data(DataDetail::CannotSkipUnexpected(t)));
        }
        match t {
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
                self.stack.set_name_skipped();
                self.end_object()
            }
            Token::Name => {
                self.next_name()?;
                Ok(())
            }
            Token::String => self.next_string().map(|_| ()),
            Token::Number => self.next_number().map(|_| ()),
            Token::Boolean => self.next_boolean().map(|_| ()),
            Token::Null => self.next_null(),
            Token::EndArray | Token::EndObject | Token::EndDocument => {
                Err(self.err_data(DataDetail::CannotSkipUnexpected(t)))
            }
        }
    }

    fn select_name(&mut self, options: &SelectOptions) -> Result<i32, JsonError> {
        if self.peek()? != Token::Name {
            return Ok(NO_MATCH);
        }
        let name = match self.nav.last() {
            Some(NavFrame::Object(entries, idx)) => entries[*idx].0,
            _ => return Ok(NO_MATCH),
        };
        let idx_match = options.index_of(name);
        if idx_match == NO_MATCH {
            return Ok(NO_MATCH);
        }
        let owned = name.to_string();
        self.stack.set_top(Scope::DanglingName);
        self.stack.set_name(&owned);
        self.peeked = None;
        Ok(idx_match)
    }

    fn select_string(&mut self, options: &SelectOptions) -> Result<i32, JsonError> {
        if self.peek()? != Token::String {
            return Ok(NO_MATCH);
        }
        let v = self.current_value().expect("String token implies a value");
        let s = v.as_str().expect("String token implies String");
        let idx_match = options.index_of(s);
        if idx_match == NO_MATCH {
            return Ok(NO_MATCH);
        }
        self.mark_value_consumed();
        self.peeked = None;
        Ok(idx_match)
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
        self.nav.clear();
        self.stack = PathStack::new();
        self.stack.set_top(Scope::Closed);
        Ok(())
    }
}
