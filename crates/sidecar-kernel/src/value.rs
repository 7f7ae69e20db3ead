use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::form_cells::{FormCell, datetime::format_datetime};

/// A value bound in the host namespace.
#[derive(Debug, Clone)]
pub enum KernelValue {
    Json(Value),
    Timestamp(DateTime<Utc>),
    FormCell(FormCell),
}

impl KernelValue {
    /// Runtime type name as the frontend displays it.
    pub fn type_name(&self) -> String {
        match self {
            KernelValue::Json(value) => json_type_name(value).to_string(),
            KernelValue::Timestamp(_) => "datetime".to_string(),
            KernelValue::FormCell(cell) => cell.input_type().variant_name().to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            KernelValue::Json(value) => value.clone(),
            KernelValue::Timestamp(ts) => Value::String(format_datetime(ts)),
            KernelValue::FormCell(cell) => Value::Object(cell.dump()),
        }
    }

    /// Short textual representation used by the explorer and prompt helpers.
    pub fn repr(&self) -> String {
        match self {
            KernelValue::Json(value) => value.to_string(),
            KernelValue::Timestamp(ts) => format_datetime(ts),
            KernelValue::FormCell(cell) => cell.to_string(),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            KernelValue::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            KernelValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    pub fn as_form_cell(&self) -> Option<&FormCell> {
        match self {
            KernelValue::FormCell(cell) => Some(cell),
            _ => None,
        }
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

impl PartialEq for KernelValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (KernelValue::Json(a), KernelValue::Json(b)) => a == b,
            (KernelValue::Timestamp(a), KernelValue::Timestamp(b)) => a == b,
            (KernelValue::FormCell(a), KernelValue::FormCell(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<Value> for KernelValue {
    fn from(value: Value) -> Self {
        KernelValue::Json(value)
    }
}

impl From<DateTime<Utc>> for KernelValue {
    fn from(ts: DateTime<Utc>) -> Self {
        KernelValue::Timestamp(ts)
    }
}

impl From<FormCell> for KernelValue {
    fn from(cell: FormCell) -> Self {
        KernelValue::FormCell(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn type_names_follow_python_conventions() {
        assert_eq!(KernelValue::from(json!(null)).type_name(), "NoneType");
        assert_eq!(KernelValue::from(json!(3)).type_name(), "int");
        assert_eq!(KernelValue::from(json!(3.5)).type_name(), "float");
        assert_eq!(KernelValue::from(json!("x")).type_name(), "str");
        assert_eq!(KernelValue::from(json!([1])).type_name(), "list");
        assert_eq!(KernelValue::from(json!({"a": 1})).type_name(), "dict");
        let ts = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(KernelValue::from(ts).type_name(), "datetime");
    }

    #[test]
    fn timestamps_render_with_explicit_offset() {
        let ts = Utc.with_ymd_and_hms(2023, 3, 3, 0, 0, 0).unwrap();
        assert_eq!(
            KernelValue::from(ts).to_json(),
            json!("2023-03-03T00:00:00+00:00")
        );
        assert_ne!(KernelValue::from(ts), KernelValue::from(json!("2023-03-03T00:00:00+00:00")));
    }
}
