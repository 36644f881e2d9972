//! Recursive partial-update merging.

use serde_json::Value;

/// Deep-merges `patch` into `base` and returns the merged value.
///
/// The walk follows the patch's keys. A patch value that is itself an
/// object merges recursively into the base's value at that key; every other
/// patch value kind, scalar or sequence, replaces the base's value
/// wholesale. Sequences are never merged element-wise. This asymmetry is
/// what makes updates with nested objects preserve untouched sibling
/// fields while array-valued fields are swapped out entirely.
pub fn merge(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(mut merged), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match merged.get_mut(&key) {
                    // Merging in place keeps the key at its original position
                    Some(slot) => {
                        let base_value = slot.take();
                        *slot = merge(base_value, patch_value);
                    }
                    None => {
                        merged.insert(key, patch_value);
                    }
                }
            }
            Value::Object(merged)
        }
        (_, patch) => patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_leaves_union_with_patch_winning() {
        let merged = merge(
            json!({ "forename": "Foo", "surname": "Bar" }),
            json!({ "forename": "Biz", "title": "Mrs" }),
        );
        assert_eq!(
            merged,
            json!({ "forename": "Biz", "surname": "Bar", "title": "Mrs" })
        );
    }

    #[test]
    fn nested_mappings_merge_recursively() {
        let merged = merge(
            json!({ "profile": { "name": "Foo", "account": { "active": false, "username": "u1" } } }),
            json!({ "profile": { "account": { "username": "u2" } } }),
        );
        assert_eq!(merged["profile"]["account"]["active"], json!(false));
        assert_eq!(merged["profile"]["account"]["username"], json!("u2"));
        assert_eq!(merged["profile"]["name"], json!("Foo"));
    }

    #[test]
    fn sequences_replace_wholesale() {
        let merged = merge(json!({ "tags": ["a", "b"] }), json!({ "tags": ["c"] }));
        assert_eq!(merged["tags"], json!(["c"]));
    }

    #[test]
    fn patch_objects_land_on_absent_or_scalar_bases() {
        let merged = merge(
            json!({ "count": 3 }),
            json!({ "count": { "total": 3 }, "extra": { "a": 1 } }),
        );
        assert_eq!(merged["count"], json!({ "total": 3 }));
        assert_eq!(merged["extra"], json!({ "a": 1 }));
    }
}
