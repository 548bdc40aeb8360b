use jsonwire::{JsonReader, JsonValue, JsonWriter, OrderedMap, Utf8Reader, Utf8Writer, ValueReader, ValueWriter};

#[test]
fn decodes_bytes_into_a_value_tree() {
    let json = r#"{"id":1,"tags":["a","b"],"active":true,"meta":null}"#;
    let mut r = Utf8Reader::new(json.as_bytes());
    let mut w = ValueWriter::new();
    copy(&mut r, &mut w);
    let root = w.into_root().unwrap();

    let obj = root.as_object().unwrap();
    assert_eq!(obj.get("id").unwrap().as_number().unwrap().as_i64(), Some(1));
    assert_eq!(obj.get("tags").unwrap().as_array().unwrap().len(), 2);
    assert_eq!(obj.get("active").unwrap().as_bool(), Some(true));
}

#[test]
fn value_tree_round_trips_through_the_utf8_writer() {
    let mut obj = OrderedMap::new();
    obj.insert("x", JsonValue::from(1i64));
    obj.insert("y", JsonValue::Array(vec![JsonValue::from(true), JsonValue::Null]));
    let tree = JsonValue::Object(obj);

    let mut r = ValueReader::new(&tree);
    let mut w = Utf8Writer::new(Vec::new());
    copy(&mut r, &mut w);
    assert_eq!(
        String::from_utf8(w.into_inner()).unwrap(),
        r#"{"x":1,"y":[true,null]}"#
    );
}

#[test]
fn pointer_queries_navigate_the_tree() {
    let mut inner = OrderedMap::new();
    inner.insert("name", JsonValue::from("widget"));
    let mut root_map = OrderedMap::new();
    root_map.insert("items", JsonValue::Array(vec![JsonValue::Object(inner)]));
    let root = JsonValue::Object(root_map);

    let found = jsonwire::value::pointer::Pointer::parse("/items/0/name").query(&root);
    assert_eq!(found, Some(&JsonValue::from("widget")));
}

#[test]
fn cross_kind_comparison_orders_by_kind_then_value() {
    use jsonwire::value::compare::compare;
    use std::cmp::Ordering;

    assert_eq!(compare(&JsonValue::Null, &JsonValue::from(false)), Ordering::Less);
    assert_eq!(
        compare(&JsonValue::from(1i64), &JsonValue::from("a")),
        Ordering::Less
    );
    assert_eq!(
        compare(&JsonValue::from(1i64), &JsonValue::from(1.0)),
        Ordering::Equal
    );
}

fn copy(r: &mut dyn JsonReader, w: &mut dyn JsonWriter) {
    use jsonwire::Token;
    match r.peek().unwrap() {
        Token::BeginArray => {
            r.begin_array().unwrap();
            w.begin_array().unwrap();
            while r.has_next().unwrap() {
                copy(r, w);
            }
            r.end_array().unwrap();
            w.end_array().unwrap();
        }
        Token::BeginObject => {
            r.begin_object().unwrap();
            w.begin_object().unwrap();
            while r.has_next().unwrap() {
                let name = r.next_name().unwrap();
                w.name(&name).unwrap();
                copy(r, w);
            }
            r.end_object().unwrap();
            w.end_object().unwrap();
        }
        Token::String => w.value_string(&r.next_string().unwrap()).unwrap(),
        Token::Number => w.value_number(r.next_number().unwrap()).unwrap(),
        Token::Boolean => w.value_bool(r.next_boolean().unwrap()).unwrap(),
        Token::Null => {
            r.next_null().unwrap();
            w.value_null().unwrap();
        }
        Token::Name | Token::EndArray | Token::EndObject | Token::EndDocument => unreachable!(),
    }
}
