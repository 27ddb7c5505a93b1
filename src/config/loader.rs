//! Configuration loading and environment parsing.

use super::validation::validate_config_security;
use super::Config;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load configuration with the following precedence (highest first):
/// 1) `WORLD_LIVE_CONFIG_JSON` env var containing raw JSON
/// 2) File pointed at by `WORLD_LIVE_CONFIG_PATH`
/// 3) config.json in the current working directory
/// 4) Defaults compiled into the binary
///
/// Individual fields can additionally be overridden by environment variables
/// with the `WORLD_LIVE__` prefix and `__` as a nesting separator, e.g.
/// `WORLD_LIVE__PORT=8080` or `WORLD_LIVE__SECURITY__TOKEN_SECRET=...`.
///
/// Validation errors are printed to stderr but not propagated; `load()`
/// always returns a `Config`. main.rs re-validates and fails startup
/// properly.
#[must_use]
pub fn load() -> Config {
    use std::env;
    use std::path::PathBuf;

    let defaults = Config::default();
    let mut merged =
        serde_json::to_value(&defaults).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

    // Lowest-precedence document source first: config.json in CWD
    merge_file_source(&mut merged, &PathBuf::from("config.json"));

    // Explicit path via env var
    if let Ok(path) = env::var("WORLD_LIVE_CONFIG_PATH") {
        merge_file_source(&mut merged, &PathBuf::from(path));
    }

    // Inline JSON via env var
    if let Ok(json) = env::var("WORLD_LIVE_CONFIG_JSON") {
        if let Some(value) = parse_json_document(&json, "WORLD_LIVE_CONFIG_JSON") {
            merge_values(&mut merged, value);
        }
    }

    // Environment overrides with prefix WORLD_LIVE__
    apply_env_overrides(&mut merged);

    let config = match serde_json::from_value::<Config>(merged) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to deserialize config; using defaults: {e}");
            defaults
        }
    };

    if let Err(e) = validate_config_security(&config) {
        eprintln!("Configuration validation error: {e}");
    }

    config
}

fn parse_json_document(raw: &str, label: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }

    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            eprintln!("Failed to parse config from {label}: {err}");
            None
        }
    }
}

fn merge_file_source(target: &mut Value, path: &Path) {
    if path.as_os_str().is_empty() || !path.exists() {
        return;
    }

    match fs::read_to_string(path) {
        Ok(contents) => {
            if let Some(value) = parse_json_document(&contents, &format!("file {}", path.display()))
            {
                merge_values(target, value);
            }
        }
        Err(err) => {
            eprintln!("Failed to read config from {}: {}", path.display(), err);
        }
    }
}

fn merge_values(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        target_map.insert(key, value);
                    }
                }
            }
        }
        (target_slot, source_value) => {
            *target_slot = source_value;
        }
    }
}

fn apply_env_overrides(root: &mut Value) {
    for (key, raw_value) in std::env::vars() {
        let Some(stripped) = key.strip_prefix("WORLD_LIVE__") else {
            continue;
        };

        let segments: Vec<String> = stripped
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        if segments.is_empty() {
            continue;
        }

        // Scalars that parse as JSON keep their type; everything else is a
        // plain string.
        let value = serde_json::from_str::<Value>(&raw_value)
            .unwrap_or_else(|_| Value::String(raw_value.clone()));

        let mut cursor = &mut *root;
        for (index, segment) in segments.iter().enumerate() {
            let map = match cursor {
                Value::Object(map) => map,
                other => {
                    *other = Value::Object(serde_json::Map::new());
                    match other {
                        Value::Object(map) => map,
                        // Just assigned an object above.
                        _ => unreachable!(),
                    }
                }
            };

            if index == segments.len() - 1 {
                map.insert(segment.clone(), value);
                break;
            }
            cursor = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overlays_nested_objects() {
        let mut base = serde_json::json!({
            "port": 3702,
            "security": { "cors_origins": "*", "token_secret": "" }
        });
        let overlay = serde_json::json!({
            "security": { "token_secret": "super-secret" }
        });
        merge_values(&mut base, overlay);
        assert_eq!(base["port"], 3702);
        assert_eq!(base["security"]["cors_origins"], "*");
        assert_eq!(base["security"]["token_secret"], "super-secret");
    }

    #[test]
    fn merge_replaces_scalars_and_arrays() {
        let mut base = serde_json::json!({ "directory": [{"id": 1}] });
        let overlay = serde_json::json!({ "directory": [] });
        merge_values(&mut base, overlay);
        assert_eq!(base["directory"], serde_json::json!([]));
    }

    #[test]
    fn parse_json_document_ignores_blank_input() {
        assert!(parse_json_document("   ", "test").is_none());
        assert!(parse_json_document("{}", "test").is_some());
    }
}
