use indexmap::IndexMap;
use sidecar_kernel::{HostNamespace, KernelValue};

/// Names that are never looked up.
pub const FORBIDDEN_PREFIXES: [&str; 5] = ["os.", "sys.", "openai.", "ipython.", "get_ipython"];

/// Trailing punctuation that stays on a candidate name.
const KEPT_SUFFIXES: &str = "().]_";

fn describe(value: &KernelValue) -> String {
    match value {
        KernelValue::Json(serde_json::Value::String(s)) => s.clone(),
        other => other.repr(),
    }
}

/// Prepends `name type=<type>` and `name=<value>` lines for every word of
/// `prompt` that names a bound variable. Only plain lookups; nothing is
/// evaluated.
pub fn look_up_mentioned_variables(prompt: &str, namespace: &dyn HostNamespace) -> String {
    let mut definitions: IndexMap<String, String> = IndexMap::new();
    for word in prompt.split_whitespace() {
        if !word.starts_with(|c: char| c.is_ascii_alphabetic()) {
            continue;
        }
        let name =
            word.trim_end_matches(|c: char| c.is_ascii_punctuation() && !KEPT_SUFFIXES.contains(c));
        if FORBIDDEN_PREFIXES.iter().any(|p| name.starts_with(p)) {
            continue;
        }
        let Some(value) = namespace.get(name) else {
            continue;
        };
        definitions.insert(format!("{name} type"), value.type_name());
        definitions.insert(name.to_string(), describe(&value));
    }

    if definitions.is_empty() {
        return prompt.to_string();
    }
    let defs = definitions
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{defs}\n\n{prompt}")
}

pub fn generate_prompt(prompt: &str, namespace: &dyn HostNamespace) -> String {
    let prompt = look_up_mentioned_variables(prompt, namespace);
    format!("write a Markdown snippet for the following:\n{prompt}")
}
