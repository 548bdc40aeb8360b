//! The adapter-methods binder, reshaped from Java's
//! `@ToJson`/`@FromJson` annotation scanning into an explicit
//! registration API: Rust has no runtime annotation processor, so a
//! caller here calls [`MethodBinder::to_json`]/[`MethodBinder::from_json`]
//! directly instead of Moshi discovering annotated methods via
//! reflection. The conflict rules (at most one direction per type+
//! qualifier pair) and the "no adapter for this direction" failure mode
//! are preserved exactly.

use crate::adapter::JsonAdapter;
use crate::error::{DataDetail, JsonError};
use crate::reader::JsonReader;
use crate::types::{Qualifiers, TypeKey};
use crate::writer::JsonWriter;
use std::collections::HashMap;
use std::sync::Arc;

type ToJsonFn<T> = Arc<dyn Fn(&mut dyn JsonWriter, &T) -> Result<(), JsonError> + Send + Sync>;
type FromJsonFn<T> = Arc<dyn Fn(&mut dyn JsonReader) -> Result<T, JsonError> + Send + Sync>;

struct Methods<T> {
    to_json: Option<(&'static str, ToJsonFn<T>)>,
    from_json: Option<(&'static str, FromJsonFn<T>)>,
}

impl<T> Default for Methods<T> {
    fn default() -> Self {
        Methods {
            to_json: None,
            from_json: None,
        }
    }
}

/// Collects `@ToJson`/`@FromJson`-equivalent closures for a set of
/// `(TypeKey, Qualifiers)` keys. One binder instance is built up, then
/// consumed into adapters with [`MethodBinder::build`].
pub struct MethodBinder<T> {
    methods: HashMap<(TypeKey, Qualifiers), Methods<T>>,
}

impl<T: 'static> Default for MethodBinder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> MethodBinder<T> {
    pub fn new() -> Self {
        MethodBinder {
            methods: HashMap::new(),
        }
    }

    /// Registers `f` as the `@ToJson`-equivalent method for `T` under
    /// `quals`. Fails at registration time if one is already bound
    /// ( `ConflictingToJson`).
    pub fn to_json(
        mut self,
        quals: Qualifiers,
        name: &'static str,
        f: impl Fn(&mut dyn JsonWriter, &T) -> Result<(), JsonError> + Send + Sync + 'static,
    ) -> Result<Self, JsonError> {
        let key = (TypeKey::of::<T>(), quals);
        let entry = self.methods.entry(key).or_default();
        if let Some((existing, _)) = &entry.to_json {
            return Err(JsonError::message(
                DataDetail::ConflictingToJson(existing.to_string(), name.to_string()).to_string(),
            ));
        }
        entry.to_json = Some((name, Arc::new(f)));
        Ok(self)
    }

    /// Registers `f` as the `@FromJson`-equivalent method for `T` under
    /// `quals`. Fails at registration time if one is already bound
    /// ( `ConflictingFromJson`).
    pub fn from_json(
        mut self,
        quals: Qualifiers,
        name: &'static str,
        f: impl Fn(&mut dyn JsonReader) -> Result<T, JsonError> + Send + Sync + 'static,
    ) -> Result<Self, JsonError> {
        let key = (TypeKey::of::<T>(), quals);
        let entry = self.methods.entry(key).or_default();
        if let Some((existing, _)) = &entry.from_json {
            return Err(JsonError::message(
                DataDetail::ConflictingFromJson(existing.to_string(), name.to_string())
                    .to_string(),
            ));
        }
        entry.from_json = Some((name, Arc::new(f)));
        Ok(self)
    }

    /// Builds a [`JsonAdapter`] for `quals` from whichever of
    /// `to_json`/`from_json` were registered. Calling the direction
    /// that was never registered fails with
    /// `DataDetail::NoMethodAdapter`, naming `quals` in the message.
    pub fn build(self, quals: Qualifiers) -> Option<MethodAdapter<T>> {
        let key = (TypeKey::of::<T>(), quals.clone());
        self.methods.get(&key).map(|m| MethodAdapter {
            to_json: m.to_json.as_ref().map(|(_, f)| f.clone()),
            from_json: m.from_json.as_ref().map(|(_, f)| f.clone()),
            quals,
        })
    }
}

/// An adapter assembled from independently-registered `to_json`/
/// `from_json` closures; each direction fails on its own if it was
/// never bound.
pub struct MethodAdapter<T> {
    to_json: Option<ToJsonFn<T>>,
    from_json: Option<FromJsonFn<T>>,
    quals: Qualifiers,
}

impl<T> JsonAdapter<T> for MethodAdapter<T> {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<T, JsonError> {
        match &self.from_json {
            Some(f) => f(reader),
            None => Err(JsonError::data(
                reader.path(),
                DataDetail::NoMethodAdapter {
                    type_name: std::any::type_name::<T>().to_string(),
                    qualifiers: self.quals.to_string(),
                },
            )),
        }
    }

    fn to_json(&self, writer: &mut dyn JsonWriter, value: &T) -> Result<(), JsonError> {
        match &self.to_json {
            Some(f) => f(writer, value),
            None => Err(JsonError::data(
                writer.path(),
                DataDetail::NoMethodAdapter {
                    type_name: std::any::type_name::<T>().to_string(),
                    qualifiers: self.quals.to_string(),
                },
            )),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::reader::utf8::Utf8Reader;
    use crate::writer::utf8::Utf8Writer;

    #[test]
    fn test_both_directions() {
        let binder = MethodBinder::<i64>::new()
            .to_json(Qualifiers::none(), "write", |w, v| w.value_i64(*v))
            .unwrap()
            .from_json(Qualifiers::none(), "read", |r| r.next_long())
            .unwrap();
        let adapter = binder.build(Qualifiers::none()).unwrap();

        let mut r = Utf8Reader::new("9".as_bytes());
        assert_eq!(adapter.from_json(&mut r).unwrap(), 9);

        let mut w = Utf8Writer::new(Vec::new());
        adapter.to_json(&mut w, &9).unwrap();
        assert_eq!(String::from_utf8(w.into_inner()).unwrap(), "9");
    }

    #[test]
    fn test_conflicting_to_json_rejected() {
        let result = MethodBinder::<i64>::new()
            .to_json(Qualifiers::none(), "first", |w, v| w.value_i64(*v))
            .unwrap()
            .to_json(Qualifiers::none(), "second", |w, v| w.value_i64(*v));
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_direction_fails_at_call_time() {
        let binder = MethodBinder::<i64>::new()
            .to_json(Qualifiers::of(&["Hex"]), "write", |w, v| w.value_i64(*v))
            .unwrap();
        let adapter = binder.build(Qualifiers::of(&["Hex"])).unwrap();
        let mut r = Utf8Reader::new("9".as_bytes());
        let err = adapter.from_json(&mut r).unwrap_err();
        assert!(err.to_string().contains("annotated [Hex]"));
    }
}
