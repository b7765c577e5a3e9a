// Structural deep copy of payload values
//
// Depth-first recursion over the value tree. Every sequence, mapping,
// reference cell and record in the output is freshly allocated, so the copy
// shares no mutable storage with its source. Absent containers stay absent and
// empty containers stay empty.
//
// Opaque host handles are the single exception: they cannot be duplicated, so
// the copy shares them. That is counted in `CopyReport::shared` and logged.
//
// There is no cycle detection. Owned trees cannot form cycles; a cycle smuggled
// in through an opaque handle is never traversed.

use tracing::debug;

use crate::value::{Map, Record, Value};

/// What a deep copy visited
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Number of value nodes visited
    pub nodes: usize,
    /// Number of opaque handles passed through without copying
    pub shared: usize,
}

impl CopyReport {
    /// True when nothing in the copy is shared with the source
    pub fn is_deep(&self) -> bool {
        self.shared == 0
    }
}

/// Deep copy a payload value
pub fn deep_copy(src: &Value) -> Value {
    let mut report = CopyReport::default();
    copy_value(src, &mut report)
}

/// Deep copy a payload value and report any shallow pass-through
pub fn deep_copy_with_report(src: &Value) -> (Value, CopyReport) {
    let mut report = CopyReport::default();
    let copied = copy_value(src, &mut report);
    (copied, report)
}

/// Deep copy a mapping (keys and values)
pub fn deep_copy_map(src: &Map) -> Map {
    let mut report = CopyReport::default();
    copy_map(src, &mut report)
}

pub(crate) fn deep_copy_record(src: &Record) -> Record {
    let mut report = CopyReport::default();
    copy_record(src, &mut report)
}

fn copy_value(src: &Value, report: &mut CopyReport) -> Value {
    report.nodes += 1;
    match src {
        Value::Null => Value::Null,
        Value::Bool(b) => Value::Bool(*b),
        Value::Number(n) => Value::Number(*n),
        Value::String(s) => Value::String(s.clone()),
        Value::Ref(None) => Value::Ref(None),
        Value::Ref(Some(inner)) => Value::Ref(Some(Box::new(copy_value(inner, report)))),
        Value::Sequence(None) => Value::Sequence(None),
        Value::Sequence(Some(items)) => Value::Sequence(Some(copy_sequence(items, report))),
        Value::Mapping(None) => Value::Mapping(None),
        Value::Mapping(Some(map)) => Value::Mapping(Some(copy_map(map, report))),
        Value::Record(record) => Value::Record(copy_record(record, report)),
        Value::Opaque(handle) => {
            report.shared += 1;
            debug!(
                type_name = handle.type_name(),
                "opaque payload value shared with the copy"
            );
            Value::Opaque(handle.clone())
        }
    }
}

// Takes the Vec itself so the copy can match its capacity
#[allow(clippy::ptr_arg)]
fn copy_sequence(src: &Vec<Value>, report: &mut CopyReport) -> Vec<Value> {
    let mut dst = Vec::with_capacity(src.capacity());
    for item in src {
        dst.push(copy_value(item, report));
    }
    dst
}

// Cloning the table keeps the source's hasher and bucket layout, so the copy
// iterates (and serializes) its keys in the same order. Each value is copied by
// `Value::clone`, which is `deep_copy`; the report is tallied from the source.
fn copy_map(src: &Map, report: &mut CopyReport) -> Map {
    let dst = src.clone();
    for value in src.values() {
        tally(value, report);
    }
    dst
}

fn tally(src: &Value, report: &mut CopyReport) {
    report.nodes += 1;
    match src {
        Value::Ref(Some(inner)) => tally(inner, report),
        Value::Sequence(Some(items)) => items.iter().for_each(|item| tally(item, report)),
        Value::Mapping(Some(map)) => map.values().for_each(|value| tally(value, report)),
        Value::Record(record) => record
            .fields
            .iter()
            .for_each(|(_, value)| tally(value, report)),
        Value::Opaque(_) => report.shared += 1,
        _ => {}
    }
}

fn copy_record(src: &Record, report: &mut CopyReport) -> Record {
    let mut dst = Record::new(src.type_name.clone());
    dst.fields.reserve(src.fields.len());
    for (name, value) in &src.fields {
        dst.fields.push((name.clone(), copy_value(value, report)));
    }
    dst
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{map_from_json, Number, Opaque};
    use serde_json::json;

    const MODIFIED: &str = "modified";

    #[test]
    fn test_scalars_copy_by_value() {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::from(42),
            Value::from(2.5),
            Value::from("test string"),
        ] {
            assert_eq!(deep_copy(&value), value);
        }
    }

    #[test]
    fn test_sequence_copy_is_independent() {
        let mut original = Value::from(vec!["a", "b", "c"]);
        let copy = deep_copy(&original);

        *original.at_mut(0).unwrap() = Value::from(MODIFIED);

        assert_eq!(copy.at(0).and_then(Value::as_str), Some("a"));
        assert_eq!(copy.as_sequence().map(Vec::len), Some(3));
    }

    #[test]
    fn test_mixed_sequence_with_null() {
        let original = Value::from(json!(["string", 42, true, null]));
        let copy = deep_copy(&original);
        assert_eq!(copy, original);
        assert!(copy.at(3).unwrap().is_null());
    }

    #[test]
    fn test_mapping_copy_is_independent() {
        let mut original = Value::from(json!({
            "string": "value",
            "number": 42,
            "bool": true,
            "null": null
        }));
        let copy = deep_copy(&original);
        assert_eq!(copy, original);

        original
            .as_mapping_mut()
            .unwrap()
            .insert("string".to_string(), Value::from(MODIFIED));

        assert_eq!(copy.get("string").and_then(Value::as_str), Some("value"));
    }

    #[test]
    fn test_deeply_nested_mutation_does_not_reach_copy() {
        let mut original = Value::from(json!({
            "level1": {
                "level2": {"level3": ["deep", "nested", "data"]},
                "siblings": ["a", "b"]
            },
            "array": [{"key": "value1"}, {"key": "value2"}]
        }));
        let copy = deep_copy(&original);

        *original
            .get_mut("level1")
            .and_then(|v| v.get_mut("level2"))
            .and_then(|v| v.get_mut("level3"))
            .and_then(|v| v.at_mut(0))
            .unwrap() = Value::from(MODIFIED);
        *original
            .get_mut("array")
            .and_then(|v| v.at_mut(0))
            .and_then(|v| v.get_mut("key"))
            .unwrap() = Value::from(MODIFIED);

        let level3 = copy
            .get("level1")
            .and_then(|v| v.get("level2"))
            .and_then(|v| v.get("level3"))
            .unwrap();
        assert_eq!(level3.at(0).and_then(Value::as_str), Some("deep"));
        let first = copy.get("array").and_then(|v| v.at(0)).unwrap();
        assert_eq!(first.get("key").and_then(Value::as_str), Some("value1"));
    }

    #[test]
    fn test_record_fields_are_copied() {
        let original = Value::from(
            Record::new("Config")
                .with_field("name", "test")
                .with_field("value", 123),
        );
        let (copy, report) = deep_copy_with_report(&original);
        assert_eq!(copy, original);
        assert_eq!(report.nodes, 3);
        assert!(report.is_deep());
    }

    #[test]
    fn test_record_copy_is_independent() {
        let mut original = Value::from(
            Record::new("Config")
                .with_field("name", "test")
                .with_field("limits", json!({"max": [1, 2]})),
        );
        let copy = deep_copy(&original);

        if let Value::Record(record) = &mut original {
            *record.field_mut("name").unwrap() = Value::from(MODIFIED);
            *record
                .field_mut("limits")
                .and_then(|v| v.get_mut("max"))
                .and_then(|v| v.at_mut(0))
                .unwrap() = Value::from(99);
        }

        assert_eq!(copy.get("name").and_then(Value::as_str), Some("test"));
        let max = copy.get("limits").and_then(|v| v.get("max")).unwrap();
        assert_eq!(max.at(0).and_then(Value::as_i64), Some(1));
        assert_ne!(copy, original);
    }

    #[test]
    fn test_map_copy_serializes_keys_in_source_order() {
        for _ in 0..20 {
            let original = map_from_json(json!({
                "a": 1, "b": 2, "c": 3, "d": 4,
                "e": {"x": 1, "y": 2, "z": 3},
                "f": [6], "g": "seven", "h": true
            }));
            let copy = deep_copy_map(&original);
            assert_eq!(
                serde_json::to_string(&copy).unwrap(),
                serde_json::to_string(&original).unwrap()
            );
        }
    }

    #[test]
    fn test_report_counts_nodes_inside_mappings() {
        let original = Value::from(json!({"a": [1, 2], "b": {"c": null}}));
        let (_, report) = deep_copy_with_report(&original);
        // root, a, 1, 2, b, c
        assert_eq!(report.nodes, 6);

        let mut map = Map::new();
        map.insert("handle".to_string(), Value::from(Opaque::new(1u8)));
        let (_, report) = deep_copy_with_report(&Value::from(map));
        assert_eq!(report.shared, 1);
    }

    #[test]
    fn test_reference_cell_is_reallocated() {
        let mut original = Value::from(Some(42));
        let copy = deep_copy(&original);

        let (Value::Ref(Some(src)), Value::Ref(Some(dst))) = (&original, &copy) else {
            panic!("expected present references");
        };
        assert!(!std::ptr::eq(src.as_ref(), dst.as_ref()));

        if let Value::Ref(Some(inner)) = &mut original {
            **inner = Value::from(999);
        }
        assert_eq!(copy.as_i64(), Some(42));
    }

    #[test]
    fn test_absent_and_empty_stay_distinct() {
        assert_eq!(deep_copy(&Value::Sequence(None)), Value::Sequence(None));
        assert_eq!(deep_copy(&Value::Mapping(None)), Value::Mapping(None));
        assert_eq!(deep_copy(&Value::Ref(None)), Value::Ref(None));

        let empty_seq = deep_copy(&Value::sequence());
        assert_eq!(empty_seq.as_sequence().map(Vec::len), Some(0));
        let empty_map = deep_copy(&Value::mapping());
        assert_eq!(empty_map.as_mapping().map(Map::len), Some(0));
        assert_ne!(empty_seq, Value::Sequence(None));
        assert_ne!(empty_map, Value::Mapping(None));
    }

    #[test]
    fn test_sequence_capacity_is_kept() {
        let mut items = Vec::with_capacity(16);
        items.push(Value::from(1));
        let copy = deep_copy(&Value::Sequence(Some(items)));
        assert!(copy.as_sequence().unwrap().capacity() >= 16);
        assert_eq!(copy.as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn test_opaque_handle_is_shared_and_reported() {
        let handle = Opaque::new(vec![1u8, 2, 3]);
        let original = Value::from(vec![Value::from("x"), Value::from(handle.clone())]);

        let (copy, report) = deep_copy_with_report(&original);

        assert_eq!(report.shared, 1);
        assert!(!report.is_deep());
        match copy.at(1) {
            Some(Value::Opaque(copied)) => assert!(copied.ptr_eq(&handle)),
            other => panic!("expected opaque handle, got {:?}", other),
        }
    }

    #[test]
    fn test_map_keys_and_values_copied() {
        let original = map_from_json(json!({"temperature": 0.7, "max_tokens": 100}));
        let copy = deep_copy_map(&original);
        assert_eq!(copy, original);
        assert_eq!(copy.get("max_tokens"), Some(&Value::Number(Number::Int(100))));
    }

    #[test]
    fn test_clone_delegates_to_deep_copy() {
        let mut original = Value::from(json!({"nested": {"inner": "data"}}));
        let cloned = original.clone();
        *original
            .get_mut("nested")
            .and_then(|v| v.get_mut("inner"))
            .unwrap() = Value::from(MODIFIED);
        assert_eq!(
            cloned.get("nested").and_then(|v| v.get("inner")).and_then(Value::as_str),
            Some("data")
        );
    }
}
