
use serde::{Deserialize, Serialize};

use std::collections::BTreeMap;

use biplist::{from_slice, from_value, to_value, to_vec, Date, Uid, Value};

#[derive(Eq, PartialEq, Serialize, Deserialize, Debug)]
struct Point {
    x: u64,
    y: u64,
}

#[test]
fn test_struct_round_trip() {
    pretty_env_logger::init();

    let document = to_vec(&Point { x: 1, y: 20 }).unwrap();
    assert_eq!(
        from_slice::<Point>(&document),
        Ok(Point { x: 1, y: 20 })
    );
}

#[test]
fn test_struct_decodes_as_a_dictionary() {
    let document = to_vec(&Point { x: 1, y: 20 }).unwrap();
    assert_eq!(
        Value::from_slice(&document),
        Ok(Value::Dictionary({
            let mut entries = BTreeMap::new();
            entries.insert(Value::string("x"), Value::Integer(1));
            entries.insert(Value::string("y"), Value::Integer(20));
            entries
        }))
    );
}

#[derive(PartialEq, Serialize, Deserialize, Debug)]
struct Track {
    title: String,
    plays: u32,
    rating: Option<f64>,
    tags: Vec<String>,
    added: Date,
    archiver_reference: Uid,
}

#[test]
fn test_nested_struct_round_trip() {
    let track = Track {
        title: String::from("Désolé"),
        plays: 42,
        rating: Some(4.5),
        tags: vec![String::from("electronic"), String::from("2008")],
        added: Date::from_unix_timestamp(1_204_329_600.0),
        archiver_reference: Uid::new(12),
    };

    let document = to_vec(&track).unwrap();
    assert_eq!(from_slice::<Track>(&document), Ok(track));
}

#[test]
fn test_absent_option_has_no_binary_representation() {
    let track = Track {
        title: String::from("untitled"),
        plays: 0,
        rating: None,
        tags: vec![],
        added: Date::from_unix_timestamp(0.0),
        archiver_reference: Uid::new(0),
    };

    // None serializes to the null marker, which cannot be written.
    assert!(matches!(
        to_vec(&track).unwrap_err(),
        biplist::Error::UnsupportedType(_)
    ));
}

#[test]
fn test_map_round_trip() {
    let mut scores = BTreeMap::new();
    scores.insert(String::from("alpha"), 3i64);
    scores.insert(String::from("beta"), -7i64);

    let document = to_vec(&scores).unwrap();
    assert_eq!(from_slice::<BTreeMap<String, i64>>(&document), Ok(scores));
}

#[test]
fn test_sequence_round_trip() {
    let values = vec![1i64, 1, 2, 3, 5, 8, 13];
    let document = to_vec(&values).unwrap();
    assert_eq!(from_slice::<Vec<i64>>(&document), Ok(values));
}

#[test]
fn test_to_value_from_value_pair() {
    let point = Point { x: 9, y: 81 };
    let value = to_value(&point).unwrap();
    assert_eq!(value.as_dictionary().map(BTreeMap::len), Some(2));
    assert_eq!(from_value::<Point>(value), Ok(point));
}
