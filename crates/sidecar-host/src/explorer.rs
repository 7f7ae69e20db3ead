use serde::Serialize;
use serde_json::{Map, Value};
use sidecar_kernel::{HostNamespace, KernelValue, NamespaceError};

use crate::config::{ExplorerConfig, SidecarConfig};

/// What the variable explorer shows for one namespace entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub size: Option<usize>,
    pub size_bytes: usize,
    /// JSON-safe sample of the value.
    pub value: Value,
}

pub fn summarize(name: &str, value: &KernelValue, config: &ExplorerConfig) -> VariableSummary {
    let json = value.to_json();
    let size = match value {
        KernelValue::Json(Value::Array(items)) => Some(items.len()),
        KernelValue::Json(Value::Object(map)) => Some(map.len()),
        KernelValue::Json(Value::String(s)) => Some(s.chars().count()),
        _ => None,
    };
    let size_bytes = json.to_string().len();

    let sample = match (value, json) {
        (KernelValue::Json(_), Value::Array(items)) => {
            Value::Array(items.into_iter().take(config.max_list_sample).collect())
        }
        (KernelValue::Json(_), Value::Object(map)) => {
            Value::Array(map.keys().cloned().map(Value::String).collect())
        }
        (KernelValue::Json(_), json) if size_bytes <= config.max_repr_len => json,
        (KernelValue::Json(_), _) => {
            Value::String(format!("{}...", truncate(&value.repr(), config.max_repr_len)))
        }
        (_, _) => Value::String(truncate(&value.repr(), config.max_repr_len).to_string()),
    };

    VariableSummary {
        name: name.to_string(),
        type_name: value.type_name(),
        size,
        size_bytes,
        value: sample,
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Summaries of every visible name, in binding order.
pub fn get_kernel_variables(
    namespace: &dyn HostNamespace,
    config: &SidecarConfig,
) -> Map<String, Value> {
    let mut out = Map::new();
    for name in namespace.names() {
        if config.is_hidden(&name) {
            continue;
        }
        let Some(value) = namespace.get(&name) else {
            continue;
        };
        let summary = summarize(&name, &value, &config.explorer);
        match serde_json::to_value(&summary) {
            Ok(summary) => {
                out.insert(name, summary);
            }
            Err(err) => tracing::warn!(%name, %err, "skipping unserializable variable"),
        }
    }
    out
}

fn rename(
    namespace: &dyn HostNamespace,
    old_name: &str,
    new_name: &str,
) -> Result<(), NamespaceError> {
    let value = namespace
        .get(old_name)
        .ok_or_else(|| NamespaceError::NotDefined(old_name.to_string()))?;
    if new_name == old_name {
        return Ok(());
    }
    if !new_name.is_empty() {
        namespace.set(new_name, value)?;
    }
    namespace.delete(old_name)?;
    Ok(())
}

/// Moves `old_name` to `new_name`, or deletes it when `new_name` is empty.
/// Returns `"success"` or the error text.
pub fn rename_kernel_variable(
    namespace: &dyn HostNamespace,
    old_name: &str,
    new_name: &str,
) -> String {
    match rename(namespace, old_name, new_name) {
        Ok(()) => "success".to_string(),
        Err(err) => err.to_string(),
    }
}
