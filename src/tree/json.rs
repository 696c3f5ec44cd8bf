//! JSON Traversal Driver
//!
//! Walks a parsed `serde_json::Value` and reports it as tree events. The
//! root and every array element are named `__anonymous__`, so a top-level
//! array of objects has the record path `["__anonymous__", "__anonymous__"]`.

use serde_json::Value;

use super::{Leaf, TreeEvents, ANONYMOUS};
use crate::projection::CellValue;

/// Parse JSON bytes
pub fn parse(input: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(input)
}

/// Emit events for a whole document
pub fn walk<H: TreeEvents>(document: &Value, handler: &mut H) {
    walk_value(ANONYMOUS, document, handler);
}

fn walk_value<H: TreeEvents>(name: &str, value: &Value, handler: &mut H) {
    if handler.is_done() {
        return;
    }

    match value {
        Value::Object(map) => {
            handler.enter_group(name);
            for (key, child) in map {
                if handler.is_done() {
                    break;
                }
                walk_value(key, child, handler);
            }
            handler.exit_group();
        }
        Value::Array(items) => {
            handler.enter_group(name);
            for item in items {
                if handler.is_done() {
                    break;
                }
                walk_value(ANONYMOUS, item, handler);
            }
            handler.exit_group();
        }
        Value::String(s) => handler.leaf(Some(name), Leaf::Text(s)),
        Value::Null => handler.leaf(Some(name), Leaf::Null),
        Value::Bool(b) => handler.leaf(Some(name), Leaf::Typed(CellValue::Boolean(*b))),
        Value::Number(n) => handler.leaf(Some(name), Leaf::Typed(number_value(n))),
    }
}

fn number_value(n: &serde_json::Number) -> CellValue {
    match n.as_i64() {
        Some(i) => CellValue::Integer(i),
        None => CellValue::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::testing::Recorder;

    fn events(input: &str) -> Vec<String> {
        let doc = parse(input.as_bytes()).unwrap();
        let mut recorder = Recorder::default();
        walk(&doc, &mut recorder);
        recorder.events
    }

    #[test]
    fn test_array_of_objects() {
        let got = events(r#"[{"a": "x"}, {"a": 1}]"#);
        assert_eq!(
            got,
            vec![
                "enter __anonymous__",
                "enter __anonymous__",
                "leaf a \"x\"",
                "exit",
                "enter __anonymous__",
                "leaf a Integer(1)",
                "exit",
                "exit",
            ]
        );
    }

    #[test]
    fn test_nested_object_and_scalars() {
        let got = events(r#"{"n": null, "ok": true, "f": 1.5, "o": {"k": "v"}}"#);
        assert_eq!(
            got,
            vec![
                "enter __anonymous__",
                "leaf n null",
                "leaf ok Boolean(true)",
                "leaf f Float(1.5)",
                "enter o",
                "leaf k \"v\"",
                "exit",
                "exit",
            ]
        );
    }

    #[test]
    fn test_scalar_array_elements_are_anonymous() {
        let got = events(r#"{"tags": ["a", "b"]}"#);
        assert_eq!(
            got,
            vec![
                "enter __anonymous__",
                "enter tags",
                "leaf __anonymous__ \"a\"",
                "leaf __anonymous__ \"b\"",
                "exit",
                "exit",
            ]
        );
    }

    #[test]
    fn test_large_unsigned_becomes_float() {
        let got = events("18446744073709551615");
        assert_eq!(got, vec!["leaf __anonymous__ Float(1.8446744073709552e19)"]);
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse(b"{\"a\": ").is_err());
    }
}
