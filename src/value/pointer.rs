//! A read-only RFC 6901 subset for querying a [`JsonValue`] tree: the
//! same `~1`/`~0` escaping and `/`-split tokenization as a typical
//! JSON Pointer implementation, narrowed to lookups only (no
//! pointer-guided construction, which this crate's value tree has no
//! use for).

use super::JsonValue;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Index(usize),
    Property(String),
}

impl Token {
    fn parse(raw: &str) -> Token {
        let unescaped = raw.replace("~1", "/").replace("~0", "~");
        if !unescaped.is_empty() && unescaped.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(i) = unescaped.parse::<usize>() {
                return Token::Index(i);
            }
        }
        Token::Property(unescaped)
    }
}

/// A parsed JSON pointer (RFC 6901 subset: no `-` "next index" token,
/// since this pointer is read-only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pointer(Vec<Token>);

impl Pointer {
    pub fn root() -> Pointer {
        Pointer(Vec::new())
    }

    pub fn parse(s: &str) -> Pointer {
        if s.is_empty() {
            return Pointer::root();
        }
        let tokens = s
            .split('/')
            .skip(if s.starts_with('/') { 1 } else { 0 })
            .map(Token::parse)
            .collect();
        Pointer(tokens)
    }

    /// Resolves this pointer against `root`, returning `None` if any
    /// segment is missing or type-mismatched.
    pub fn query<'v>(&self, root: &'v JsonValue) -> Option<&'v JsonValue> {
        let mut cur = root;
        for tok in &self.0 {
            cur = match (tok, cur) {
                (Token::Index(i), JsonValue::Array(items)) => items.get(*i)?,
                (Token::Property(p), JsonValue::Object(map)) => map.get(p)?,
                _ => return None,
            };
        }
        Some(cur)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ordered_map::OrderedMap;

    #[test]
    fn test_root_pointer_is_identity() {
        let v = JsonValue::from(1i64);
        assert_eq!(Pointer::root().query(&v), Some(&v));
    }

    #[test]
    fn test_object_and_array_traversal() {
        let mut inner = OrderedMap::new();
        inner.insert("bar", JsonValue::from("ar/ar"));
        let mut outer = OrderedMap::new();
        outer.insert("foo", JsonValue::Array(vec![JsonValue::Null, JsonValue::Object(inner)]));
        let root = JsonValue::Object(outer);

        let p = Pointer::parse("/foo/1/bar");
        assert_eq!(p.query(&root), Some(&JsonValue::from("ar/ar")));
    }

    #[test]
    fn test_escaped_segment() {
        let mut outer = OrderedMap::new();
        outer.insert("ba/ar", JsonValue::from(3i64));
        let root = JsonValue::Object(outer);
        let p = Pointer::parse("/ba~1ar");
        assert_eq!(p.query(&root), Some(&JsonValue::from(3i64)));
    }

    #[test]
    fn test_missing_segment_is_none() {
        let root = JsonValue::Object(OrderedMap::new());
        assert_eq!(Pointer::parse("/missing").query(&root), None);
    }
}
