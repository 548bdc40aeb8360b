//! The zero-side-effect instance allocator contract.
//!
//! Moshi's `Moshi$Builder`-produced reflective allocator constructs an
//! instance of a class without running its constructor (so adapters can
//! populate fields before anyone observes a half-built object). Rust
//! has no such unsafe reflective path available safely, and doesn't
//! need one: [`std::default::Default`] already gives every adapter the
//! same guarantee (a value with no caller-visible side effects beyond
//! producing a value) through an ordinary, safe trait, so the allocator
//! contract here is just `T::default()` behind a trait a registry
//! factory can require.

/// A type with a zero-side-effect "empty" instance an adapter can fill
/// in field by field. Implemented for any `T: Default`; kept as its
/// own trait (rather than using `Default` directly everywhere) so the
/// registry's generated/derived adapters have one clearly-named bound
/// to require, rather than treating it as incidental.
pub trait Allocate: Sized {
    fn allocate() -> Self;
}

impl<T: Default> Allocate for T {
    fn allocate() -> Self {
        T::default()
    }
}
