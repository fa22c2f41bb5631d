//! Merging configuration layers
//!
//! Layers are JSON values. Objects merge key by key; anything else in a
//! later layer (arrays, scalars, null) replaces the earlier value whole.

use serde_json::Value;

/// Overlay `overlay` onto `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut merged), Value::Object(overlay)) => {
            for (key, value) in overlay {
                let value = match merged.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                merged.insert(key, value);
            }
            Value::Object(merged)
        }
        (_, overlay) => overlay,
    }
}

/// Merge layers lowest precedence first.
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

/// Dot-separated paths of every non-object value in `value`.
pub fn leaf_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_leaves(value, String::new(), &mut paths);
    paths
}

fn collect_leaves(value: &Value, path: String, paths: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                collect_leaves(child, child_path, paths);
            }
        }
        _ if !path.is_empty() => paths.push(path),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let base = json!({"workers": 4});
        let overlay = json!({"workers": 8});
        let result = deep_merge(base, overlay);
        assert_eq!(result["workers"], 8);
    }

    #[test]
    fn test_object_deep_merge() {
        let base = json!({
            "maven_local": {
                "enabled": true,
                "repo_local": "/a"
            }
        });
        let overlay = json!({
            "maven_local": {
                "enabled": false
            }
        });
        let result = deep_merge(base, overlay);

        assert_eq!(result["maven_local"]["enabled"], false);
        // Untouched keys survive
        assert_eq!(result["maven_local"]["repo_local"], "/a");
    }

    #[test]
    fn test_array_replace() {
        let base = json!({"excludes": ["a:b", "c:d", "e:f"]});
        let overlay = json!({"excludes": ["x:y"]});
        let result = deep_merge(base, overlay);

        let excludes = result["excludes"].as_array().unwrap();
        assert_eq!(excludes.len(), 1);
        assert_eq!(excludes[0], "x:y");
    }

    #[test]
    fn test_null_override() {
        let base = json!({"value": 100});
        let overlay = json!({"value": null});
        let result = deep_merge(base, overlay);

        assert!(result["value"].is_null());
    }

    #[test]
    fn test_merge_layers() {
        let builtin = json!({
            "workers": 4,
            "maven_local": {"enabled": true}
        });
        let user = json!({"workers": 2});
        let env = json!({"maven_local": {"repo_local": "/env"}});
        let cli = json!({"workers": 16});

        let result = merge_layers(vec![builtin, user, env, cli]);

        assert_eq!(result["workers"], 16);
        assert_eq!(result["maven_local"]["enabled"], true);
        assert_eq!(result["maven_local"]["repo_local"], "/env");
    }

    #[test]
    fn test_leaf_paths() {
        let value = json!({
            "workers": 1,
            "maven_local": {"enabled": true, "repo_local": "/r"}
        });
        let mut paths = leaf_paths(&value);
        paths.sort();
        assert_eq!(
            paths,
            vec!["maven_local.enabled", "maven_local.repo_local", "workers"]
        );
    }
}
