
//! Decodes documents produced by CPython's `plistlib`, whose binary writer
//! tracks CoreFoundation, to confirm compatibility with a foreign encoder.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use biplist::{Uid, Value};

fn fixture(name: &str) -> Vec<u8> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(name);
    fs::read(path).unwrap()
}

fn entry<'a>(dictionary: &'a Value, key: &str) -> &'a Value {
    dictionary
        .as_dictionary()
        .and_then(|entries| entries.get(&Value::string(key)))
        .unwrap_or_else(|| panic!("missing key {}", key))
}

#[test]
fn test_decode_plistlib_settings() {
    let decoded = Value::from_slice(&fixture("settings.plist")).unwrap();

    assert_eq!(entry(&decoded, "name"), &Value::string("aperture"));
    assert_eq!(entry(&decoded, "count"), &Value::Integer(3));
    assert_eq!(entry(&decoded, "enabled"), &Value::Boolean(true));
    assert_eq!(entry(&decoded, "ratio"), &Value::from(0.5));
    assert_eq!(entry(&decoded, "blob"), &Value::Data(vec![0x00, 0x01, 0x02]));
    assert_eq!(entry(&decoded, "big"), &Value::Integer(70_000));
    assert_eq!(entry(&decoded, "negative"), &Value::Integer(-42));
    assert_eq!(entry(&decoded, "ref"), &Value::Uid(Uid::new(7)));

    // Non-ASCII text arrives under the UTF-16 tag.
    assert_eq!(
        entry(&decoded, "unicode"),
        &Value::Utf16String(String::from("héllo wörld"))
    );

    // plistlib deduplicates the repeated integers; the references must
    // still resolve positionally.
    assert_eq!(
        entry(&decoded, "items"),
        &Value::Array(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3),
            Value::Integer(2),
            Value::Integer(1),
        ])
    );

    // 2021-06-01T12:00:00Z.
    let when = entry(&decoded, "when").as_date().unwrap();
    assert!((when.unix_timestamp() - 1_622_548_800.0).abs() < 1e-6);
    assert!((when.absolute_time() - 644_241_600.0).abs() < 1e-6);
}

#[test]
fn test_decode_plistlib_nested_containers() {
    let decoded = Value::from_slice(&fixture("deep.plist")).unwrap();

    let rows = entry(&decoded, "rows").as_array().unwrap();
    assert_eq!(rows.len(), 5);
    for (row_index, row) in rows.iter().enumerate() {
        let cells = row.as_array().unwrap();
        assert_eq!(cells.len(), 4);
        for (cell_index, cell) in cells.iter().enumerate() {
            assert_eq!(
                cell.as_string(),
                Some(format!("cell-{}-{}", row_index, cell_index).as_str())
            );
        }
    }

    assert_eq!(
        entry(&decoded, "repeated"),
        &Value::Array(vec![
            Value::string("same"),
            Value::string("same"),
            Value::string("same"),
        ])
    );

    assert_eq!(entry(&decoded, "empty"), &Value::Dictionary(BTreeMap::new()));
    assert_eq!(entry(&decoded, "nothing"), &Value::Array(vec![]));

    // Twenty elements exceed the inline count nibble.
    let wide = entry(&decoded, "wide").as_array().unwrap();
    let expected = (0i64 .. 20).map(Value::Integer).collect::<Vec<Value>>();
    assert_eq!(wide, &expected[..]);
}

#[test]
fn test_plistlib_document_survives_a_rewrite() {
    let decoded = Value::from_slice(&fixture("settings.plist")).unwrap();
    let rewritten = decoded.to_vec().unwrap();
    assert_eq!(Value::from_slice(&rewritten), Ok(decoded));
}
