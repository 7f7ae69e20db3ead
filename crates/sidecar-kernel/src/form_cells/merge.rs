use serde_json::{Map, Value};
use thiserror::Error;

use super::cell::SETTINGS_FIELD;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeError {
    #[error("update targets id '{update}' but the cell is '{current}'")]
    IdMismatch { current: String, update: String },
    #[error("'{0}' must be an object")]
    NotAnObject(String),
}

/// Deep-merges a partial update onto a full dump of a cell.
///
/// Nested objects merge key by key with the update winning; any other value
/// replaces. `settings` must be an object when present (null leaves it as is).
pub fn merge_update(
    current: &Map<String, Value>,
    update: &Map<String, Value>,
) -> Result<Map<String, Value>, MergeError> {
    if let Some(id) = update.get("id") {
        let current_id = current.get("id").and_then(Value::as_str).unwrap_or_default();
        if id.as_str() != Some(current_id) {
            return Err(MergeError::IdMismatch {
                current: current_id.to_string(),
                update: id.to_string(),
            });
        }
    }

    let mut merged = current.clone();
    for (key, value) in update {
        if key == SETTINGS_FIELD {
            match value {
                Value::Null => continue,
                Value::Object(_) => {}
                _ => return Err(MergeError::NotAnObject(SETTINGS_FIELD.to_string())),
            }
        }
        merge_value(&mut merged, key, value);
    }
    Ok(merged)
}

fn merge_value(target: &mut Map<String, Value>, key: &str, value: &Value) {
    match (target.get_mut(key), value) {
        (Some(Value::Object(existing)), Value::Object(patch)) => {
            for (k, v) in patch {
                merge_value(existing, k, v);
            }
        }
        _ => {
            target.insert(key.to_string(), value.clone());
        }
    }
}
