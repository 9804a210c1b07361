//! Cross-checks the document parser against `serde_json`.

use glint_core::document::{parse_document, to_string, to_string_pretty, Value};

const DOCUMENTS: &[&str] = &[
    "null",
    "true",
    "[]",
    "{}",
    r#"{"a": 1, "b": [1, 2, 3], "c": "x"}"#,
    r#"[0.5, -2.25, 1e3, 1.5E2, -7, 0, 42]"#,
    r#"{"nested": {"deeper": {"list": [[], [{}], [null, false]]}}}"#,
    r#"  {"asset": {"version": "2.0", "generator": "hand written"},
          "scenes": [{"nodes": [0]}],
          "nodes": [{"translation": [1.0, 2.0, 3.0], "name": "root"}]}  "#,
    "\n[\t1,\r\n 2 ]\n",
];

fn oracle(text: &str) -> serde_json::Value {
    serde_json::from_str(text).expect("oracle rejects test document")
}

#[test]
fn test_parser_agrees_with_serde_json() {
    for text in DOCUMENTS {
        let ours = parse_document(text).unwrap();
        let theirs = serde_json::to_value(&ours).unwrap();
        assert_eq!(theirs, oracle(text), "document: {text}");
    }
}

#[test]
fn test_writer_output_is_valid_json() {
    for text in DOCUMENTS {
        let value = parse_document(text).unwrap();

        assert_eq!(oracle(&to_string(&value)), oracle(text), "compact: {text}");
        assert_eq!(oracle(&to_string_pretty(&value)), oracle(text), "pretty: {text}");
    }
}

#[test]
fn test_serialize_parse_round_trip() {
    for text in DOCUMENTS {
        let first = parse_document(text).unwrap();
        let second = parse_document(&to_string(&first)).unwrap();
        let third = parse_document(&to_string_pretty(&first)).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, third);
    }
}

#[test]
fn test_number_kinds() {
    let value = parse_document("[1, 1.0, 1e2, -3]").unwrap();
    let items = value.as_array().unwrap();

    assert_eq!(items[0], Value::Int(1));
    assert_eq!(items[1], Value::Float(1.0));
    assert_eq!(items[2], Value::Float(100.0));
    assert_eq!(items[3], Value::Int(-3));
}
