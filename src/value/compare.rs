//! Deep ordering over [`JsonValue`] trees: an arbitrary total order
//! across mismatched kinds, a lexicographic walk for containers, with
//! objects first sorted by key since [`OrderedMap`] iterates in
//! insertion order rather than sorted order.

use super::JsonValue;
use crate::ordered_map::OrderedMap;
use itertools::{EitherOrBoth, Itertools};
use std::cmp::Ordering;

/// Evaluates the deep ordering of `lhs` and `rhs`. Establishes an
/// arbitrary but total and stable order across mismatched value kinds:
/// `Null < Bool < Number < String < Array < Object`.
pub fn compare(lhs: &JsonValue, rhs: &JsonValue) -> Ordering {
    match (lhs, rhs) {
        (JsonValue::Null, JsonValue::Null) => Ordering::Equal,
        (JsonValue::Bool(l), JsonValue::Bool(r)) => l.cmp(r),
        (JsonValue::Number(l), JsonValue::Number(r)) => l.cmp(r),
        (JsonValue::String(l), JsonValue::String(r)) => l.cmp(r),
        (JsonValue::Array(l), JsonValue::Array(r)) => compare_arrays(l, r),
        (JsonValue::Object(l), JsonValue::Object(r)) => compare_objects(l, r),

        (JsonValue::Null, _) => Ordering::Less,
        (_, JsonValue::Null) => Ordering::Greater,
        (JsonValue::Bool(_), _) => Ordering::Less,
        (_, JsonValue::Bool(_)) => Ordering::Greater,
        (JsonValue::Number(_), _) => Ordering::Less,
        (_, JsonValue::Number(_)) => Ordering::Greater,
        (JsonValue::String(_), _) => Ordering::Less,
        (_, JsonValue::String(_)) => Ordering::Greater,
        (JsonValue::Array(_), _) => Ordering::Less,
        (_, JsonValue::Array(_)) => Ordering::Greater,
    }
}

fn compare_arrays(lhs: &[JsonValue], rhs: &[JsonValue]) -> Ordering {
    lhs.iter()
        .zip_longest(rhs.iter())
        .map(|eob| match eob {
            EitherOrBoth::Both(l, r) => compare(l, r),
            EitherOrBoth::Right(_) => Ordering::Less,
            EitherOrBoth::Left(_) => Ordering::Greater,
        })
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

fn compare_objects(lhs: &OrderedMap<JsonValue>, rhs: &OrderedMap<JsonValue>) -> Ordering {
    let mut l: Vec<_> = lhs.iter().collect();
    let mut r: Vec<_> = rhs.iter().collect();
    l.sort_by(|a, b| a.0.cmp(b.0));
    r.sort_by(|a, b| a.0.cmp(b.0));
    l.into_iter()
        .zip_longest(r)
        .map(|eob| match eob {
            EitherOrBoth::Both((lk, lv), (rk, rv)) => match lk.cmp(rk) {
                Ordering::Equal => compare(lv, rv),
                other => other,
            },
            EitherOrBoth::Right(_) => Ordering::Less,
            EitherOrBoth::Left(_) => Ordering::Greater,
        })
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::number::JsonNumber;

    #[test]
    fn test_cross_kind_ordering() {
        assert_eq!(compare(&JsonValue::Null, &JsonValue::Bool(false)), Ordering::Less);
        assert_eq!(
            compare(&JsonValue::from(1i64), &JsonValue::from("a")),
            Ordering::Less
        );
    }

    #[test]
    fn test_array_prefix_ordering() {
        let short = JsonValue::Array(vec![JsonValue::from(1i64)]);
        let long = JsonValue::Array(vec![JsonValue::from(1i64), JsonValue::from(2i64)]);
        assert_eq!(compare(&short, &long), Ordering::Less);
    }

    #[test]
    fn test_object_ordering_ignores_insertion_order() {
        let mut a = OrderedMap::new();
        a.insert("b", JsonValue::from(2i64));
        a.insert("a", JsonValue::from(1i64));
        let mut b = OrderedMap::new();
        b.insert("a", JsonValue::from(1i64));
        b.insert("b", JsonValue::from(2i64));
        assert_eq!(
            compare(&JsonValue::Object(a), &JsonValue::Object(b)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_numeric_cross_kind_equal() {
        assert_eq!(
            compare(
                &JsonValue::Number(JsonNumber::Unsigned(5)),
                &JsonValue::Number(JsonNumber::Float(5.0, None))
            ),
            Ordering::Equal
        );
    }
}
