use jsonwire::registry::methods::MethodBinder;
use jsonwire::{JsonAdapter, JsonAdapterRegistry, JsonReader, JsonWriter, Qualifiers};
use jsonwire::error::{DataDetail, JsonError};
use jsonwire::reader::utf8::Utf8Reader;
use jsonwire::writer::utf8::Utf8Writer;

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

#[derive(Clone, Debug, PartialEq)]
struct Point {
    x: i64,
    y: i64,
}

#[derive(Clone)]
struct PointAdapter;
impl JsonAdapter<Point> for PointAdapter {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<Point, JsonError> {
        reader.begin_object()?;
        let mut x = None;
        let mut y = None;
        while reader.has_next()? {
            match reader.next_name()?.as_str() {
                "x" => x = Some(reader.next_long()?),
                "y" => y = Some(reader.next_long()?),
                _ => reader.skip_value()?,
            }
        }
        reader.end_object()?;
        Ok(Point {
            x: x.ok_or_else(|| JsonError::data(reader.path(), DataDetail::NoAdapter("x".into())))?,
            y: y.ok_or_else(|| JsonError::data(reader.path(), DataDetail::NoAdapter("y".into())))?,
        })
    }

    fn to_json(&self, writer: &mut dyn JsonWriter, value: &Point) -> Result<(), JsonError> {
        writer.begin_object()?;
        writer.name("x")?;
        writer.value_i64(value.x)?;
        writer.name("y")?;
        writer.value_i64(value.y)?;
        writer.end_object()
    }
}

fn registry() -> JsonAdapterRegistry {
    JsonAdapterRegistry::builder()
        .add::<i64, _>(I64Adapter)
        .add::<Point, _>(PointAdapter)
        .build()
}

#[test]
fn resolves_a_registered_scalar_adapter() {
    let reg = registry();
    let adapter = reg.adapter::<i64>().unwrap();
    let mut r = Utf8Reader::new("42".as_bytes());
    assert_eq!(adapter.from_json(&mut r).unwrap(), 42);
}

#[test]
fn list_of_composes_over_a_registered_element_type() {
    let reg = registry();
    let list = reg.list_of::<Point>().unwrap();
    let mut r = Utf8Reader::new(r#"[{"x":1,"y":2},{"x":3,"y":4}]"#.as_bytes());
    let decoded = list.from_json(&mut r).unwrap();
    assert_eq!(decoded, vec![Point { x: 1, y: 2 }, Point { x: 3, y: 4 }]);

    let mut w = Utf8Writer::new(Vec::new());
    list.to_json(&mut w, &decoded).unwrap();
    assert_eq!(
        String::from_utf8(w.into_inner()).unwrap(),
        r#"[{"x":1,"y":2},{"x":3,"y":4}]"#
    );
}

#[test]
fn map_of_rejects_a_duplicate_key() {
    let reg = registry();
    let map = reg.map_of::<i64>().unwrap();
    let mut r = Utf8Reader::new(r#"{"a":1,"a":2}"#.as_bytes());
    let err = map.from_json(&mut r).unwrap_err();
    assert!(err.to_string().contains("multiple values"));
}

#[test]
fn an_unregistered_type_fails_to_resolve() {
    let reg = registry();
    assert!(reg.adapter::<bool>().is_err());
}

#[test]
fn repeated_lookups_share_the_cached_adapter() {
    let reg = registry();
    let a = reg.adapter::<i64>().unwrap();
    let b = reg.adapter::<i64>().unwrap();
    let mut w1 = Utf8Writer::new(Vec::new());
    let mut w2 = Utf8Writer::new(Vec::new());
    a.to_json(&mut w1, &5).unwrap();
    b.to_json(&mut w2, &5).unwrap();
    assert_eq!(w1.into_inner(), w2.into_inner());
}

struct HexWrapper;
impl jsonwire::registry::ErasedAdapter for HexWrapper {
    fn from_json_erased(
        &self,
        reader: &mut dyn JsonReader,
    ) -> Result<Box<dyn std::any::Any + Send>, JsonError> {
        let s = reader.next_string()?;
        let n = i64::from_str_radix(s.trim_start_matches("0x"), 16)
            .map_err(|_| JsonError::data(reader.path(), DataDetail::NoAdapter("hex".into())))?;
        Ok(Box::new(n))
    }
    fn to_json_erased(&self, writer: &mut dyn JsonWriter, value: &dyn std::any::Any) -> Result<(), JsonError> {
        let n = value.downcast_ref::<i64>().expect("hex adapter only ever sees i64");
        writer.value_string(&format!("0x{n:x}"))
    }
}

#[test]
fn qualifiers_select_a_distinct_adapter_from_the_unqualified_one() {
    let hex_key = jsonwire::TypeKey::of::<i64>();
    let hex_quals = Qualifiers::of(&["Hex"]);
    let reg = JsonAdapterRegistry::builder()
        .add::<i64, _>(I64Adapter)
        .add_factory(std::sync::Arc::new(move |candidate, quals, _registry| {
            if *candidate == hex_key && quals == &hex_quals {
                let erased: std::sync::Arc<dyn jsonwire::registry::ErasedAdapter> =
                    std::sync::Arc::new(HexWrapper);
                Some(erased)
            } else {
                None
            }
        }))
        .build();

    let plain = reg.adapter::<i64>().unwrap();
    let mut r = Utf8Reader::new("10".as_bytes());
    assert_eq!(plain.from_json(&mut r).unwrap(), 10);

    let hex = reg.adapter_qualified::<i64>(Qualifiers::of(&["Hex"])).unwrap();
    let mut r = Utf8Reader::new(r#""0xff""#.as_bytes());
    assert_eq!(hex.from_json(&mut r).unwrap(), 255);
}

#[test]
fn method_binder_builds_an_adapter_from_independently_registered_directions() {
    let binder = MethodBinder::<i64>::new()
        .to_json(Qualifiers::none(), "write", |w, v| w.value_i64(*v))
        .unwrap()
        .from_json(Qualifiers::none(), "read", |r| r.next_long())
        .unwrap();
    let adapter = binder.build(Qualifiers::none()).unwrap();

    let mut r = Utf8Reader::new("7".as_bytes());
    assert_eq!(adapter.from_json(&mut r).unwrap(), 7);

    let mut w = Utf8Writer::new(Vec::new());
    adapter.to_json(&mut w, &7).unwrap();
    assert_eq!(String::from_utf8(w.into_inner()).unwrap(), "7");
}

#[test]
fn method_binder_rejects_a_second_to_json_registration_for_the_same_type() {
    let result = MethodBinder::<i64>::new()
        .to_json(Qualifiers::none(), "first", |w, v| w.value_i64(*v))
        .unwrap()
        .to_json(Qualifiers::none(), "second", |w, v| w.value_i64(*v));
    assert!(result.is_err());
}
