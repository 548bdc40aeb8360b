use jsonwire::{JsonWriter, Utf8Writer};

fn written(w: Utf8Writer<Vec<u8>>) -> String {
    String::from_utf8(w.into_inner()).unwrap()
}

#[test]
fn dissolves_exactly_one_level_of_same_kind_arrays() {
    let mut w = Utf8Writer::new(Vec::new());
    w.begin_array().unwrap();
    let token = w.begin_flatten().unwrap();
    w.begin_array().unwrap();
    w.value_i64(1).unwrap();
    w.value_i64(2).unwrap();
    w.end_array().unwrap();
    w.begin_array().unwrap();
    w.value_i64(3).unwrap();
    w.end_array().unwrap();
    w.end_flatten(token).unwrap();
    w.end_array().unwrap();
    assert_eq!(written(w), "[1,2,3]");
}

#[test]
fn dissolves_exactly_one_level_of_same_kind_objects() {
    let mut w = Utf8Writer::new(Vec::new());
    w.begin_object().unwrap();
    let token = w.begin_flatten().unwrap();
    w.begin_object().unwrap();
    w.name("a").unwrap();
    w.value_i64(1).unwrap();
    w.end_object().unwrap();
    w.begin_object().unwrap();
    w.name("b").unwrap();
    w.value_i64(2).unwrap();
    w.end_object().unwrap();
    w.end_flatten(token).unwrap();
    w.end_object().unwrap();
    assert_eq!(written(w), r#"{"a":1,"b":2}"#);
}

#[test]
fn leaves_a_mismatched_kind_container_untouched() {
    let mut w = Utf8Writer::new(Vec::new());
    w.begin_array().unwrap();
    let token = w.begin_flatten().unwrap();
    w.begin_object().unwrap();
    w.name("k").unwrap();
    w.value_i64(1).unwrap();
    w.end_object().unwrap();
    w.end_flatten(token).unwrap();
    w.end_array().unwrap();
    assert_eq!(written(w), r#"[{"k":1}]"#);
}

#[test]
fn a_second_nesting_level_of_the_same_kind_is_not_dissolved() {
    let mut w = Utf8Writer::new(Vec::new());
    w.begin_array().unwrap();
    let token = w.begin_flatten().unwrap();
    w.begin_array().unwrap(); // dissolved: depth matches the flatten scope
    w.begin_array().unwrap(); // real: the flatten scope is already open
    w.value_i64(1).unwrap();
    w.end_array().unwrap();
    w.end_array().unwrap();
    w.end_flatten(token).unwrap();
    w.end_array().unwrap();
    assert_eq!(written(w), "[[1]]");
}

#[test]
fn two_sequential_flatten_regions_in_the_same_array_do_not_interfere() {
    let mut w = Utf8Writer::new(Vec::new());
    w.begin_array().unwrap();

    let first = w.begin_flatten().unwrap();
    w.begin_array().unwrap();
    w.value_i64(1).unwrap();
    w.end_array().unwrap();
    w.end_flatten(first).unwrap();

    w.value_i64(99).unwrap();

    let second = w.begin_flatten().unwrap();
    w.begin_array().unwrap();
    w.value_i64(2).unwrap();
    w.end_array().unwrap();
    w.end_flatten(second).unwrap();

    w.end_array().unwrap();
    assert_eq!(written(w), "[1,99,2]");
}

#[test]
fn ending_flatten_scopes_out_of_order_fails() {
    let mut w = Utf8Writer::new(Vec::new());
    w.begin_array().unwrap();
    let first = w.begin_flatten().unwrap();
    w.begin_array().unwrap();
    let _second = w.begin_flatten().unwrap();
    assert!(w.end_flatten(first).is_err());
}
