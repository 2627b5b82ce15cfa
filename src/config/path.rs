//! Dotted key paths over a nested JSON object

use serde_json::{Map, Value};

use super::ConfigError;

/// Follow `key` split on `.`; `None` when a segment is absent or a non-object is hit.
pub(crate) fn lookup<'a>(doc: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let mut segments = key.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Store `value` at `key`, creating intermediate objects as needed.
pub(crate) fn insert(doc: &mut Map<String, Value>, key: &str, value: Value) -> Result<(), ConfigError> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ConfigError::InvalidPath(key.to_string()));
    }
    let Some((last, parents)) = segments.split_last() else {
        return Err(ConfigError::InvalidPath(key.to_string()));
    };

    let mut current = doc;
    for segment in parents {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        current = match entry {
            Value::Object(map) => map,
            _ => return Err(ConfigError::InvalidPath(key.to_string())),
        };
    }
    current.insert(last.to_string(), value);
    Ok(())
}
