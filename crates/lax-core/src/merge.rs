//! Structural merge of article-json fragments

use serde_json::{Map, Value};

/// Top-level fields copied into an article version's snippet
pub const SNIPPET_KEYS: [&str; 14] = [
    "copyright",
    "doi",
    "elocationId",
    "id",
    "impactStatement",
    "pdf",
    "published",
    "research-organisms",
    "status",
    "subjects",
    "title",
    "type",
    "version",
    "volume",
];

/// Merge `overlay` into `base`, returning the combined document
///
/// When both sides hold an object under the same key the objects are merged
/// recursively; in every other case the overlay value replaces the base
/// value, lists included. `overlay` is only read.
pub fn deep_merge(base: Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut acc), Value::Object(next)) => {
            for (key, value) in next {
                let merged = match acc.remove(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                acc.insert(key.clone(), merged);
            }
            Value::Object(acc)
        }
        (_, replacement) => replacement.clone(),
    }
}

/// Fold documents left to right with [`deep_merge`], starting from `{}`
pub fn merge_all<'a, I>(documents: I) -> Value
where
    I: IntoIterator<Item = &'a Value>,
{
    documents
        .into_iter()
        .fold(Value::Object(Map::new()), deep_merge)
}

/// Keep only the given top-level keys of an object
pub fn subdict(document: &Value, keys: &[&str]) -> Value {
    let Some(map) = document.as_object() else {
        return Value::Object(Map::new());
    };
    Value::Object(
        map.iter()
            .filter(|(k, _)| keys.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

/// The lightweight listing view of a merged document
pub fn extract_snippet(merged: &Value) -> Value {
    subdict(merged, &SNIPPET_KEYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_objects_merge() {
        let base = json!({"a": {"x": 1, "y": 2}, "b": 1});
        let overlay = json!({"a": {"y": 3, "z": 4}});
        assert_eq!(
            deep_merge(base, &overlay),
            json!({"a": {"x": 1, "y": 3, "z": 4}, "b": 1})
        );
    }

    #[test]
    fn test_lists_are_replaced() {
        let base = json!({"subjects": ["a", "b"]});
        let overlay = json!({"subjects": ["c"]});
        assert_eq!(deep_merge(base, &overlay), json!({"subjects": ["c"]}));
    }

    #[test]
    fn test_scalar_replaces_object() {
        let base = json!({"pdf": {"uri": "x"}});
        let overlay = json!({"pdf": null});
        assert_eq!(deep_merge(base, &overlay), json!({"pdf": null}));
    }

    #[test]
    fn test_merge_all_of_nothing_is_empty_object() {
        assert_eq!(merge_all(std::iter::empty()), json!({}));
    }

    #[test]
    fn test_snippet_keeps_allow_listed_keys() {
        let merged = json!({"title": "t", "id": "01968", "body": [1, 2], "volume": 4});
        assert_eq!(
            extract_snippet(&merged),
            json!({"title": "t", "id": "01968", "volume": 4})
        );
    }

    #[test]
    fn test_subdict_of_non_object_is_empty() {
        assert_eq!(subdict(&json!([1, 2]), &["a"]), json!({}));
    }
}
