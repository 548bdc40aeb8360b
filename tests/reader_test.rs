use jsonwire::{
    from_json_str, DataDetail, EncodingDetail, JsonAdapter, JsonError, JsonReader, JsonWriter,
    Token, Utf8Reader,
};

struct I64Adapter;
impl JsonAdapter<i64> for I64Adapter {
    fn from_json(&self, reader: &mut dyn JsonReader) -> Result<i64, JsonError> {
        reader.next_long()
    }
    fn to_json(&self, writer: &mut dyn JsonWriter, value: &i64) -> Result<(), JsonError> {
        writer.value_i64(*value)
    }
}

#[test]
fn reads_a_nested_document() {
    let json = r#"{"name":"widget","count":3,"tags":["a","b"],"active":true,"meta":null}"#;
    let mut r = Utf8Reader::new(json.as_bytes());
    r.begin_object().unwrap();
    assert_eq!(r.next_name().unwrap(), "name");
    assert_eq!(r.next_string().unwrap(), "widget");
    assert_eq!(r.next_name().unwrap(), "count");
    assert_eq!(r.next_long().unwrap(), 3);
    assert_eq!(r.next_name().unwrap(), "tags");
    r.begin_array().unwrap();
    assert_eq!(r.next_string().unwrap(), "a");
    assert_eq!(r.next_string().unwrap(), "b");
    r.end_array().unwrap();
    assert_eq!(r.next_name().unwrap(), "active");
    assert!(r.next_boolean().unwrap());
    assert_eq!(r.next_name().unwrap(), "meta");
    r.next_null().unwrap();
    r.end_object().unwrap();
    assert_eq!(r.peek().unwrap(), Token::EndDocument);
}

#[test]
fn trailing_top_level_value_is_rejected_by_the_decode_entry_point() {
    let err = from_json_str(&I64Adapter, "1 2").unwrap_err();
    assert!(matches!(
        err,
        JsonError::Encoding {
            detail: EncodingDetail::TrailingData,
            ..
        }
    ));
}

#[test]
fn lenient_mode_accepts_unquoted_names_and_trailing_commas() {
    let mut r = Utf8Reader::new("{foo: 'bar', baz: NaN,}".as_bytes());
    r.set_lenient(true);
    r.begin_object().unwrap();
    assert_eq!(r.next_name().unwrap(), "foo");
    assert_eq!(r.next_string().unwrap(), "bar");
    assert_eq!(r.next_name().unwrap(), "baz");
    assert!(r.next_double().unwrap().is_nan());
    r.end_object().unwrap();
}

#[test]
fn fail_on_unknown_rejects_skip_value() {
    let mut r = Utf8Reader::new(r#"{"a":1,"b":2}"#.as_bytes());
    r.set_fail_on_unknown(true);
    r.begin_object().unwrap();
    assert_eq!(r.next_name().unwrap(), "a");
    assert_eq!(r.next_long().unwrap(), 1);
    assert_eq!(r.next_name().unwrap(), "b");
    let err = r.skip_value().unwrap_err();
    assert!(matches!(
        err,
        JsonError::Data {
            detail: DataDetail::CannotSkipUnexpected(_),
            ..
        }
    ));
}

#[test]
fn path_breadcrumb_tracks_position() {
    let mut r = Utf8Reader::new(r#"{"items":[1,2,{"k":3}]}"#.as_bytes());
    r.begin_object().unwrap();
    r.next_name().unwrap();
    r.begin_array().unwrap();
    r.next_long().unwrap();
    r.next_long().unwrap();
    r.begin_object().unwrap();
    r.next_name().unwrap();
    assert_eq!(r.path(), "$.items[2].k");
}

#[test]
fn value_source_splices_raw_bytes() {
    let mut r = Utf8Reader::new(r#"{"a":[1,2,3],"b":4}"#.as_bytes());
    r.begin_object().unwrap();
    assert_eq!(r.next_name().unwrap(), "a");
    let raw = r.value_source().unwrap().to_vec();
    assert_eq!(std::str::from_utf8(&raw).unwrap(), "[1,2,3]");
    assert_eq!(r.next_name().unwrap(), "b");
    assert_eq!(r.next_long().unwrap(), 4);
    r.end_object().unwrap();
}
