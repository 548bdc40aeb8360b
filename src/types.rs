//! Structural type descriptors and qualifiers: the key a
//! [`crate::registry::JsonAdapterRegistry`] resolves adapters by.
//!
//! Java's `Types` utility builds descriptors by reflecting over
//! `java.lang.reflect.Type` — raw classes, `ParameterizedType`,
//! `WildcardType`, `GenericArrayType`, `TypeVariable`. Rust erases
//! generics at compile time and has no runtime `Type` object to walk,
//! so `TypeKey` only describes what a caller states explicitly: a raw
//! type via `std::any::TypeId`, plus composite forms (`Parameterized`,
//! `Array`) built by hand the way a caller would write
//! `Types.newParameterizedType(List.class, String.class)`. There is no
//! `Wildcard`/`TypeVariable` form — Rust generics are always fully
//! instantiated by the time a `TypeKey` is constructed, so
//! wildcard-flattening and super/extends-promotion canonicalization
//! rules have no input to act on here; `canonicalize` is kept as a
//! stable no-op extension point rather than deleted outright,
//! documented in DESIGN.md.

use std::any::TypeId;
use std::hash::{Hash, Hasher};

/// A structural descriptor of a type, used as half of an adapter cache
/// key (the other half is [`Qualifiers`]).
#[derive(Debug, Clone)]
pub enum TypeKey {
    /// A concrete, non-generic (or already fully instantiated) type.
    Raw {
        id: TypeId,
        name: &'static str,
    },
    /// A generic type applied to concrete type arguments, e.g. `Vec<T>`
    /// described as `Parameterized(Vec<T>, [T])`.
    Parameterized {
        raw: Box<TypeKey>,
        args: Vec<TypeKey>,
    },
    Array(Box<TypeKey>),
}

impl TypeKey {
    pub fn of<T: 'static>() -> TypeKey {
        TypeKey::Raw {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn parameterized<T: 'static>(args: Vec<TypeKey>) -> TypeKey {
        TypeKey::Parameterized {
            raw: Box::new(TypeKey::of::<T>()),
            args,
        }
    }

    pub fn array(element: TypeKey) -> TypeKey {
        TypeKey::Array(Box::new(element))
    }

    /// No-op today (see module doc); kept as the single place a future
    /// canonicalization rule would plug in, rather than scattering
    /// ad-hoc normalization across call sites.
    pub fn canonicalize(self) -> TypeKey {
        self
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TypeKey::Raw { id: a, .. }, TypeKey::Raw { id: b, .. }) => a == b,
            (
                TypeKey::Parameterized { raw: ra, args: aa },
                TypeKey::Parameterized { raw: rb, args: ab },
            ) => ra == rb && aa == ab,
            (TypeKey::Array(a), TypeKey::Array(b)) => a == b,
            _ => false,
        }
    }
}
impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            TypeKey::Raw { id, .. } => {
                0u8.hash(state);
                id.hash(state);
            }
            TypeKey::Parameterized { raw, args } => {
                1u8.hash(state);
                raw.hash(state);
                args.hash(state);
            }
            TypeKey::Array(elem) => {
                2u8.hash(state);
                elem.hash(state);
            }
        }
    }
}

/// The Rust analogue of Moshi's qualifier annotations: a small,
/// order-independent set of marker names attached to an adapter
/// lookup (e.g. `"Hex"` to select a hex-string `i64` adapter instead of
/// the default decimal one).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Qualifiers(Vec<&'static str>);

impl Qualifiers {
    pub fn none() -> Self {
        Qualifiers(Vec::new())
    }

    pub fn of(names: &[&'static str]) -> Self {
        let mut v: Vec<_> = names.to_vec();
        v.sort_unstable();
        v.dedup();
        Qualifiers(v)
    }

    pub fn names(&self) -> &[&'static str] {
        &self.0
    }
}

impl std::fmt::Display for Qualifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            write!(f, "\u{2205}")
        } else {
            write!(f, "[{}]", self.0.join(", "))
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_raw_equality_by_type_id() {
        assert_eq!(TypeKey::of::<i64>(), TypeKey::of::<i64>());
        assert_ne!(TypeKey::of::<i64>(), TypeKey::of::<u64>());
    }

    #[test]
    fn test_parameterized_equality() {
        let a = TypeKey::parameterized::<Vec<i64>>(vec![TypeKey::of::<i64>()]);
        let b = TypeKey::parameterized::<Vec<i64>>(vec![TypeKey::of::<i64>()]);
        let c = TypeKey::parameterized::<Vec<i64>>(vec![TypeKey::of::<u64>()]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_qualifiers_are_order_independent() {
        assert_eq!(Qualifiers::of(&["b", "a"]), Qualifiers::of(&["a", "b"]));
    }
}
