//! Value-tree helpers shared by the registry and the secret store.

use serde_json::{Map, Value};

/// Deep merge two JSON values.
///
/// If both values are objects they merge recursively with `overlay` taking
/// precedence. Any other pairing replaces `base` with `overlay` outright, so
/// scalars and sequences are never merged element-wise.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                if let Some(base_val) = base_map.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_map.insert(key.clone(), overlay_val.clone());
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Flatten a tree into dotted-path entries.
///
/// Nested objects contribute path segments; scalars and sequences are
/// leaves. Empty objects contribute nothing.
pub fn flatten(tree: &Value) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(&mut flat, "", tree);
    flat
}

fn flatten_into(flat: &mut Map<String, Value>, prefix: &str, node: &Value) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(flat, &path, child);
            }
        }
        leaf => {
            flat.insert(prefix.to_string(), leaf.clone());
        }
    }
}
