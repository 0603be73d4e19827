//! Shape predicates and merge helpers over JSON-LD values.

use serde_json::{Map, Value};

use crate::iri::is_blank_node_id;

pub(crate) fn is_value(v: &Value) -> bool {
    v.as_object().is_some_and(|o| o.contains_key("@value"))
}

pub(crate) fn is_list(v: &Value) -> bool {
    v.as_object().is_some_and(|o| o.contains_key("@list"))
}

/// A node object that carries more than just `@id`.
pub(crate) fn is_subject(v: &Value) -> bool {
    v.as_object().is_some_and(|o| {
        !(o.contains_key("@value") || o.contains_key("@set") || o.contains_key("@list"))
            && (o.len() > 1 || !o.contains_key("@id"))
    })
}

pub(crate) fn is_subject_reference(v: &Value) -> bool {
    v.as_object()
        .is_some_and(|o| o.len() == 1 && o.contains_key("@id"))
}

pub(crate) fn is_reference_node(node: &Map<String, Value>) -> bool {
    node.len() == 1 && node.contains_key("@id")
}

/// A node without an `@id`, or with a `_:` one.
pub(crate) fn is_blank_node(v: &Value) -> bool {
    let Some(o) = v.as_object() else {
        return false;
    };
    match o.get("@id") {
        Some(id) => id.as_str().is_some_and(is_blank_node_id),
        None => !(o.contains_key("@value") || o.contains_key("@set") || o.contains_key("@list")),
    }
}

/// Loose equality used to avoid duplicate property values.
///
/// Scalars compare strictly, value objects on `@value`/`@type`/`@language`/`@index`
/// and node references on `@id`. Lists never compare equal.
pub(crate) fn compare_values(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(x), Value::Object(y)) => {
            if x.contains_key("@value") && y.contains_key("@value") {
                ["@value", "@type", "@language", "@index"]
                    .iter()
                    .all(|k| x.get(*k) == y.get(*k))
            } else {
                match (x.get("@id"), y.get("@id")) {
                    (Some(l), Some(r)) => l == r,
                    _ => false,
                }
            }
        }
        (Value::Array(_), _) | (_, Value::Array(_)) => false,
        _ => a == b,
    }
}

/// Append `value` under `key`, flattening arrays.
///
/// With `as_array` the entry always ends up an array, even when empty.
pub(crate) fn add_value(map: &mut Map<String, Value>, key: &str, value: Value, as_array: bool) {
    if let Value::Array(items) = value {
        if items.is_empty() && as_array && !map.contains_key(key) {
            map.insert(key.to_string(), Value::Array(Vec::new()));
        }
        for item in items {
            add_value(map, key, item, as_array);
        }
        return;
    }
    match map.get_mut(key) {
        Some(Value::Array(existing)) => existing.push(value),
        Some(existing) => {
            let previous = existing.take();
            *existing = Value::Array(vec![previous, value]);
        }
        None => {
            let value = if as_array { Value::Array(vec![value]) } else { value };
            map.insert(key.to_string(), value);
        }
    }
}

/// Like [add_value] with `as_array`, skipping values already present.
pub(crate) fn add_unique_value(map: &mut Map<String, Value>, key: &str, value: Value) {
    if let Value::Array(items) = value {
        if items.is_empty() && !map.contains_key(key) {
            map.insert(key.to_string(), Value::Array(Vec::new()));
        }
        for item in items {
            add_unique_value(map, key, item);
        }
        return;
    }
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !slot.is_array() {
        let previous = slot.take();
        *slot = Value::Array(vec![previous]);
    }
    if let Value::Array(existing) = slot
        && !existing.iter().any(|v| compare_values(v, &value))
    {
        existing.push(value);
    }
}

pub(crate) fn into_array(v: Value) -> Vec<Value> {
    match v {
        Value::Array(items) => items,
        other => vec![other],
    }
}

pub(crate) fn as_slice(v: &Value) -> &[Value] {
    match v {
        Value::Array(items) => items,
        other => std::slice::from_ref(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shape_predicates() {
        assert!(is_value(&json!({"@value": 1})));
        assert!(is_list(&json!({"@list": []})));
        assert!(is_subject(&json!({"@id": "http://e/a", "http://e/p": 1})));
        assert!(!is_subject(&json!({"@id": "http://e/a"})));
        assert!(is_subject_reference(&json!({"@id": "http://e/a"})));
        assert!(is_blank_node(&json!({"http://e/p": 1})));
        assert!(is_blank_node(&json!({"@id": "_:x"})));
        assert!(!is_blank_node(&json!({"@id": "http://e/a"})));
        assert!(!is_blank_node(&json!({"@value": "x"})));
    }

    #[test]
    fn value_comparison() {
        assert!(compare_values(&json!("a"), &json!("a")));
        assert!(compare_values(
            &json!({"@value": "a", "@language": "en"}),
            &json!({"@value": "a", "@language": "en"})
        ));
        assert!(!compare_values(
            &json!({"@value": "a", "@language": "en"}),
            &json!({"@value": "a"})
        ));
        assert!(compare_values(
            &json!({"@id": "_:b0"}),
            &json!({"@id": "_:b0", "http://e/p": 1})
        ));
        assert!(!compare_values(&json!({"@list": []}), &json!({"@list": []})));
    }

    #[test]
    fn add_value_variants() {
        let mut map = Map::new();
        add_value(&mut map, "k", json!(1), false);
        assert_eq!(map["k"], json!(1));
        add_value(&mut map, "k", json!(1), false);
        assert_eq!(map["k"], json!([1, 1]));

        add_value(&mut map, "empty", json!([]), true);
        assert_eq!(map["empty"], json!([]));

        add_unique_value(&mut map, "u", json!({"@id": "x"}));
        add_unique_value(&mut map, "u", json!({"@id": "x"}));
        add_unique_value(&mut map, "u", json!({"@id": "y"}));
        assert_eq!(map["u"], json!([{"@id": "x"}, {"@id": "y"}]));
    }
}
