use jsonwire::{JsonWriter, Utf8Writer};
use std::io::Write as _;

fn written(w: Utf8Writer<Vec<u8>>) -> String {
    String::from_utf8(w.into_inner()).unwrap()
}

#[test]
fn writes_a_nested_document() {
    let mut w = Utf8Writer::new(Vec::new());
    w.begin_object().unwrap();
    w.name("name").unwrap();
    w.value_string("widget").unwrap();
    w.name("tags").unwrap();
    w.begin_array().unwrap();
    w.value_string("a").unwrap();
    w.value_string("b").unwrap();
    w.end_array().unwrap();
    w.end_object().unwrap();
    assert_eq!(written(w), r#"{"name":"widget","tags":["a","b"]}"#);
}

#[test]
fn indent_pretty_prints() {
    let mut w = Utf8Writer::new(Vec::new());
    w.set_indent("  ".to_string());
    w.begin_object().unwrap();
    w.name("a").unwrap();
    w.value_i64(1).unwrap();
    w.end_object().unwrap();
    assert_eq!(written(w), "{\n  \"a\": 1\n}");
}

#[test]
fn nulls_are_suppressed_unless_enabled() {
    let mut w = Utf8Writer::new(Vec::new());
    w.begin_object().unwrap();
    w.name("a").unwrap();
    w.value_null().unwrap();
    w.name("b").unwrap();
    w.value_i64(1).unwrap();
    w.end_object().unwrap();
    assert_eq!(written(w), r#"{"b":1}"#);

    let mut w = Utf8Writer::new(Vec::new());
    w.set_serialize_nulls(true);
    w.begin_object().unwrap();
    w.name("a").unwrap();
    w.value_null().unwrap();
    w.end_object().unwrap();
    assert_eq!(written(w), r#"{"a":null}"#);
}

#[test]
fn non_finite_doubles_need_lenient_mode() {
    let mut w = Utf8Writer::new(Vec::new());
    assert!(w.value_f64(f64::NAN).is_err());

    let mut w = Utf8Writer::new(Vec::new());
    w.set_lenient(true);
    w.value_f64(f64::INFINITY).unwrap();
    assert_eq!(written(w), "Infinity");
}

#[test]
fn duplicate_object_key_fails() {
    let mut w = Utf8Writer::new(Vec::new());
    w.begin_object().unwrap();
    w.name("k").unwrap();
    w.value_i64(1).unwrap();
    w.name("k").unwrap();
    assert!(w.value_i64(2).is_err());
}

#[test]
fn promote_value_to_name_converts_next_scalar_to_a_key() {
    let mut w = Utf8Writer::new(Vec::new());
    w.begin_object().unwrap();
    w.promote_value_to_name();
    w.value_string("derived_key").unwrap();
    w.value_i64(7).unwrap();
    w.end_object().unwrap();
    assert_eq!(written(w), r#"{"derived_key":7}"#);
}

#[test]
fn value_sink_splices_raw_bytes_verbatim() {
    let mut w = Utf8Writer::new(Vec::new());
    w.begin_array().unwrap();
    {
        let mut sink = w.value_sink().unwrap();
        sink.write_all(br#"{"raw":true}"#).unwrap();
        sink.finish().unwrap();
    }
    w.value_i64(2).unwrap();
    w.end_array().unwrap();
    assert_eq!(written(w), r#"[{"raw":true},2]"#);
}

#[test]
fn leaking_a_value_sink_leaves_the_writer_unusable() {
    let mut w = Utf8Writer::new(Vec::new());
    let sink = w.value_sink().unwrap();
    std::mem::forget(sink);
    assert!(w.value_i64(1).is_err());
}
