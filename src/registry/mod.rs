//! The adapter factory pipeline, cache, and recursive (cycle-safe)
//! resolution behind [`JsonAdapterRegistry`].
//!
//! Java's `Moshi` resolves an adapter for an arbitrary `Type` reflected
//! at runtime, including generic container types it has never seen
//! before, by asking each factory in turn to build one. Rust erases
//! generics at compile time, so there is no way to hand a factory an
//! opaque `TypeKey::Parameterized` for e.g. `Vec<T>` and have it
//! reconstruct a `Vec<T>`-shaped adapter without already knowing `T` at
//! the Rust type level. The factory pipeline below is therefore scoped
//! to what it can faithfully do in Rust — resolve adapters for
//! concrete, explicitly registered `T: 'static` types, including
//! self-referential ones, with caching and cycle-safety — and the
//! generic containers a codec like this needs (`List<T>`,
//! `Map<String,V>`, a nullable wrapper) are instead `JsonAdapterRegistry`
//! methods generic over `T`, resolved at the Rust type level the way `serde`'s
//! blanket `impl<T: Serialize> Serialize for Vec<T>` is: monomorphized
//! per `T`, not looked up through the dynamic factory list. See
//! DESIGN.md.

pub mod methods;

use crate::adapter::decorators::NullSafe;
use crate::adapter::JsonAdapter;
use crate::error::{DataDetail, JsonError};
use crate::reader::JsonReader;
use crate::types::{Qualifiers, TypeKey};
use crate::writer::JsonWriter;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A type-erased [`JsonAdapter`], stored in the registry's cache behind
/// an `Arc` so cyclic references and repeated lookups share one
/// instance.
pub trait ErasedAdapter: Send + Sync {
    fn from_json_erased(&self, reader: &mut dyn JsonReader) -> Result<Box<dyn Any + Send>, JsonError>;
    fn to_json_erased(&self, writer: &mut dyn JsonWriter, value: &dyn Any) -> Result<(), JsonError>;
}

struct ErasedWrapper<T, A> {
    inner: A,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T, A> ErasedWrapper<T, A> {
    fn new(inner: A) -> Self {
        ErasedWrapper {
            inner,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T, A> ErasedAdapter for ErasedWrapper<T, A>
where
    T: 'static + Send,
    A: JsonAdapter<T> + Send + Sync,
{
    fn from_json_erased(&self, reader: &mut dyn JsonReader) -> Result<Box<dyn Any + Send>, JsonError> {
        Ok(Box::new(self.inner.from_json(reader)?))
    }

    fn to_json_erased(&self, writer: &mut dyn JsonWriter, value: &dyn Any) -> Result<(), JsonError> {
        let v = value
            .downcast_ref::<T>()
            .expect("erased value always matches the type key it was cached under");
        self.inner.to_json(writer, v)
    }
}

/// Placeholder installed in the cache while a factory is running, so a
/// self-referential type (e.g. a tree node containing a `Vec` of
/// itself) resolves against this stub instead of recursing into
/// `resolve` again. Every call through the stub defers to the real
/// adapter, which is always installed into `target` before the stub
/// could possibly be invoked: the stub only becomes reachable by being
/// embedded inside the adapter being built, and that adapter cannot run
/// until resolution (and thus `target`'s fill-in) completes.
struct Deferred {
    target: Arc<Mutex<Option<Arc<dyn ErasedAdapter>>>>,
}

impl ErasedAdapter for Deferred {
    fn from_json_erased(&self, reader: &mut dyn JsonReader) -> Result<Box<dyn Any + Send>, JsonError> {
        let target = self
            .target
            .lock()
            .unwrap()
            .clone()
            .expect("cyclic adapter used before its factory finished resolving");
        target.from_json_erased(reader)
    }

    fn to_json_erased(&self, writer: &mut dyn JsonWriter, value: &dyn Any) -> Result<(), JsonError> {
        let target = self
            .target
            .lock()
            .unwrap()
            .clone()
            .expect("cyclic adapter used before its factory finished resolving");
        target.to_json_erased(writer, value)
    }
}

type CacheKey = (TypeKey, Qualifiers);
type Factory =
    Arc<dyn Fn(&TypeKey, &Qualifiers, &JsonAdapterRegistry) -> Option<Arc<dyn ErasedAdapter>> + Send + Sync>;

/// Builds an immutable [`JsonAdapterRegistry`]: factory registration
/// is only permitted during builder construction, and the registry
/// itself is immutable once built.
pub struct JsonAdapterRegistryBuilder {
    factories: Vec<Factory>,
}

impl JsonAdapterRegistryBuilder {
    /// Registers a factory, tried in registration order (most
    /// recently added wins, matching Moshi's last-registered-first
    /// precedence) before the built-in scalar factories.
    pub fn add_factory(mut self, factory: Factory) -> Self {
        self.factories.push(factory);
        self
    }

    /// Registers a fixed adapter for exactly `TypeKey::of::<T>()` with
    /// no qualifiers — the common case of "this concrete type always
    /// uses this adapter."
    pub fn add<T, A>(self, adapter: A) -> Self
    where
        T: 'static + Send,
        A: JsonAdapter<T> + Send + Sync + Clone + 'static,
    {
        let key = TypeKey::of::<T>();
        self.add_factory(Arc::new(move |candidate, quals, _registry| {
            if *candidate == key && quals.names().is_empty() {
                let erased: Arc<dyn ErasedAdapter> = Arc::new(ErasedWrapper::<T, A>::new(adapter.clone()));
                Some(erased)
            } else {
                None
            }
        }))
    }

    pub fn build(self) -> JsonAdapterRegistry {
        JsonAdapterRegistry {
            factories: self.factories,
            cache: Mutex::new(HashMap::new()),
        }
    }
}

/// A type-directed, cycle-safe adapter cache and factory pipeline.
/// Immutable once built; call [`JsonAdapterRegistry::builder`]
/// to configure one.
pub struct JsonAdapterRegistry {
    factories: Vec<Factory>,
    cache: Mutex<HashMap<CacheKey, Arc<dyn ErasedAdapter>>>,
}

impl JsonAdapterRegistry {
    pub fn builder() -> JsonAdapterRegistryBuilder {
        JsonAdapterRegistryBuilder {
            factories: Vec::new(),
        }
    }

    /// Resolves the type-erased adapter for `key`/`quals`, trying
    /// registered factories most-recently-added first, then falling
    /// back to nothing (callers needing a guaranteed builtin should
    /// prefer the typed helpers below).
    pub fn resolve(&self, key: &TypeKey, quals: &Qualifiers) -> Result<Arc<dyn ErasedAdapter>, JsonError> {
        let cache_key = (key.clone(), quals.clone());
        if let Some(cached) = self.cache.lock().unwrap().get(&cache_key) {
            tracing::debug!(?key, "adapter cache hit");
            return Ok(cached.clone());
        }

        let cell = Arc::new(Mutex::new(None));
        let stub: Arc<dyn ErasedAdapter> = Arc::new(Deferred { target: cell.clone() });
        self.cache.lock().unwrap().insert(cache_key.clone(), stub);

        let mut resolved = None;
        for factory in self.factories.iter().rev() {
            if let Some(adapter) = factory(key, quals, self) {
                tracing::debug!(?key, "adapter factory resolved");
                resolved = Some(adapter);
                break;
            }
        }

        let adapter = match resolved {
            Some(a) => a,
            None => {
                self.cache.lock().unwrap().remove(&cache_key);
                return Err(JsonError::message(
                    DataDetail::NoAdapter(format!("{key:?} {quals:?}")).to_string(),
                ));
            }
        };

        *cell.lock().unwrap() = Some(adapter.clone());
        self.cache.lock().unwrap().insert(cache_key, adapter.clone());
        Ok(adapter)
    }

    /// Resolves a typed facade over [`Self::resolve`] for `T`, with no
    /// qualifiers.
    pub fn adapter<T: 'static + Send>(&self) -> Result<TypedAdapter<T>, JsonError> {
        self.adapter_qualified(Qualifiers::none())
    }

    pub fn adapter_qualified<T: 'static + Send>(
        &self,
        quals: Qualifiers,
    ) -> Result<TypedAdapter<T>, JsonError> {
        let erased = self.resolve(&TypeKey::of::<T>(), &quals)?;
        Ok(TypedAdapter {
            erased,
            _marker: std::marker::PhantomData,
        })
    }

    /// A `Vec<T>` adapter, expressed as a method generic over `T`
    /// rather than a dynamic factory (see module docs).
    pub fn list_of<T: 'static + Send>(&self) -> Result<ListAdapter<T>, JsonError> {
        Ok(ListAdapter {
            element: self.adapter::<T>()?,
        })
    }

    /// A `Map<String, V>` adapter, for the same reason.
    pub fn map_of<V: 'static + Send>(&self) -> Result<MapAdapter<V>, JsonError> {
        Ok(MapAdapter {
            value: self.adapter::<V>()?,
        })
    }

    /// A map adapter for non-`String` keys, written and read as a JSON
    /// object via [`JsonWriter::promote_value_to_name`]/
    /// [`JsonReader::promote_name_to_value`]: `K`'s own adapter renders
    /// or parses the key exactly as it would a value, it just ends up
    /// in name position. Represented as `Vec<(K, V)>` rather than
    /// `OrderedMap` since `K` need not be `String`, or even hashable.
    pub fn promoted_map_of<K: 'static + Send, V: 'static + Send>(
        &self,
    ) -> Result<PromotedMapAdapter<K, V>, JsonError> {
        Ok(PromotedMapAdapter {
            key: self.adapter::<K>()?,
            value: self.adapter::<V>()?,
        })
    }
}

/// A downcasting facade over an [`ErasedAdapter`], implementing
/// [`JsonAdapter<T>`] again so it composes with the decorators exactly
/// like any other adapter.
pub struct TypedAdapter<T> {
    erased: Arc<dyn ErasedAdapter>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> Clone for TypedAdapter<T> {
    fn clone(&self) -> Self {
        TypedAdapter {
            erased: self.erased.clone(),
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T: 'static> JsonAdapter<T> for TypedAdapter<T> {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<T, JsonError> {
        let boxed = self.erased.from_json_erased(reader)?;
        Ok(*boxed
            .downcast::<T>()
            .expect("erased value always matches the type key it was cached under"))
    }

    fn to_json(&self, writer: &mut dyn JsonWriter, value: &T) -> Result<(), JsonError> {
        self.erased.to_json_erased(writer, value)
    }
}

#[derive(Clone)]
pub struct ListAdapter<T> {
    element: TypedAdapter<T>,
}

impl<T: 'static> JsonAdapter<Vec<T>> for ListAdapter<T> {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<Vec<T>, JsonError> {
        reader.begin_array()?;
        let mut out = Vec::new();
        while reader.has_next()? {
            out.push(self.element.from_json(reader)?);
        }
        reader.end_array()?;
        Ok(out)
    }

    fn to_json(&self, writer: &mut dyn JsonWriter, value: &Vec<T>) -> Result<(), JsonError> {
        writer.begin_array()?;
        for item in value {
            self.element.to_json(writer, item)?;
        }
        writer.end_array()
    }
}

#[derive(Clone)]
pub struct MapAdapter<V> {
    value: TypedAdapter<V>,
}

impl<V: 'static + std::fmt::Debug> JsonAdapter<crate::ordered_map::OrderedMap<V>> for MapAdapter<V> {
    fn from_json(
        &self,
        reader: &mut dyn JsonReader,
    ) -> Result<crate::ordered_map::OrderedMap<V>, JsonError> {
        reader.begin_object()?;
        let mut out = crate::ordered_map::OrderedMap::new();
        while reader.has_next()? {
            let key = reader.next_name()?;
            let value = self.value.from_json(reader)?;
            if let Some(prev) = out.get(&key) {
                return Err(JsonError::message(
                    DataDetail::DuplicateName {
                        name: key,
                        path: reader.path().to_string(),
                        first: format!("{prev:?}"),
                        second: format!("{value:?}"),
                    }
                    .to_string(),
                ));
            }
            out.insert(key, value);
        }
        reader.end_object()?;
        Ok(out)
    }

    fn to_json(
        &self,
        writer: &mut dyn JsonWriter,
        value: &crate::ordered_map::OrderedMap<V>,
    ) -> Result<(), JsonError> {
        writer.begin_object()?;
        for (k, v) in value.iter() {
            writer.name(k)?;
            self.value.to_json(writer, v)?;
        }
        writer.end_object()
    }
}

impl<T: 'static> TypedAdapter<T> {
    pub fn null_safe_boxed(self) -> NullSafe<Self> {
        NullSafe(self)
    }
}

#[derive(Clone)]
pub struct PromotedMapAdapter<K, V> {
    key: TypedAdapter<K>,
    value: TypedAdapter<V>,
}

impl<K: 'static, V: 'static> JsonAdapter<Vec<(K, V)>> for PromotedMapAdapter<K, V> {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<Vec<(K, V)>, JsonError> {
        reader.begin_object()?;
        let mut out = Vec::new();
        while reader.has_next()? {
            reader.promote_name_to_value()?;
            let key = self.key.from_json(reader)?;
            let value = self.value.from_json(reader)?;
            out.push((key, value));
        }
        reader.end_object()?;
        Ok(out)
    }

    fn to_json(&self, writer: &mut dyn JsonWriter, value: &Vec<(K, V)>) -> Result<(), JsonError> {
        writer.begin_object()?;
        for (k, v) in value {
            writer.promote_value_to_name();
            self.key.to_json(writer, k)?;
            self.value.to_json(writer, v)?;
        }
        writer.end_object()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reader::utf8::Utf8Reader;
    use crate::writer::utf8::Utf8Writer;

    #[derive(Clone)]
    struct I64Adapter;
    impl JsonAdapter<i64> for I64Adapter {
        fn from_json(&self, reader: &mut dyn JsonReader) -> Result<i64, JsonError> {
            reader.next_long()
        }
        fn to_json(&self, writer: &mut dyn JsonWriter, value: &i64) -> Result<(), JsonError> {
            writer.value_i64(*value)
        }
    }

    fn registry() -> JsonAdapterRegistry {
        JsonAdapterRegistry::builder().add::<i64, _>(I64Adapter).build()
    }

    #[test]
    fn test_resolve_and_roundtrip() {
        let reg = registry();
        let adapter = reg.adapter::<i64>().unwrap();
        let mut r = Utf8Reader::new("42".as_bytes());
        assert_eq!(adapter.from_json(&mut r).unwrap(), 42);
    }

    #[test]
    fn test_cache_hit_returns_same_adapter() {
        let reg = registry();
        let a = reg.adapter::<i64>().unwrap();
        let b = reg.adapter::<i64>().unwrap();
        assert!(Arc::ptr_eq(&a.erased, &b.erased));
    }

    #[test]
    fn test_unregistered_type_fails() {
        let reg = registry();
        assert!(reg.adapter::<bool>().is_err());
    }

    #[test]
    fn test_list_adapter() {
        let reg = registry();
        let list = reg.list_of::<i64>().unwrap();
        let mut r = Utf8Reader::new("[1,2,3]".as_bytes());
        assert_eq!(list.from_json(&mut r).unwrap(), vec![1, 2, 3]);

        let mut w = Utf8Writer::new(Vec::new());
        list.to_json(&mut w, &vec![1, 2, 3]).unwrap();
        assert_eq!(String::from_utf8(w.into_inner()).unwrap(), "[1,2,3]");
    }

    #[test]
    fn test_map_adapter_duplicate_key_fails() {
        let reg = registry();
        let map = reg.map_of::<i64>().unwrap();
        let mut r = Utf8Reader::new(r#"{"c":1,"c":2}"#.as_bytes());
        let err = map.from_json(&mut r).unwrap_err();
        assert!(err.to_string().contains("multiple values"));
    }

    #[derive(Clone)]
    struct BoolAdapter;
    impl JsonAdapter<bool> for BoolAdapter {
        fn from_json(&self, reader: &mut dyn JsonReader) -> Result<bool, JsonError> {
            reader.next_boolean()
        }
        fn to_json(&self, writer: &mut dyn JsonWriter, value: &bool) -> Result<(), JsonError> {
            writer.value_bool(*value)
        }
    }

    #[test]
    fn test_promoted_map_adapter_round_trips_integer_keys() {
        let reg = JsonAdapterRegistry::builder()
            .add::<i64, _>(I64Adapter)
            .add::<bool, _>(BoolAdapter)
            .build();
        let map = reg.promoted_map_of::<i64, bool>().unwrap();

        let mut w = Utf8Writer::new(Vec::new());
        map.to_json(&mut w, &vec![(5, true), (6, false), (7, true)]).unwrap();
        assert_eq!(
            String::from_utf8(w.into_inner()).unwrap(),
            r#"{"5":true,"6":false,"7":true}"#
        );

        let mut r = Utf8Reader::new(r#"{"5":true,"6":false,"7":true}"#.as_bytes());
        assert_eq!(map.from_json(&mut r).unwrap(), vec![(5, true), (6, false), (7, true)]);
    }
}
