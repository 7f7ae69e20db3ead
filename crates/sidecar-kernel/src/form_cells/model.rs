use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use sidecar_observable::{Record, ValidationError};

use super::datetime::{format_datetime, parse_datetime_value};
use crate::value::KernelValue;

/// Discriminator selecting a form-cell variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Checkboxes,
    Datetime,
    Dropdown,
    Slider,
    Text,
    /// Open variant; also the fallback for unrecognized tags.
    Custom,
}

impl InputType {
    pub const KNOWN: [InputType; 5] = [
        InputType::Checkboxes,
        InputType::Datetime,
        InputType::Dropdown,
        InputType::Slider,
        InputType::Text,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InputType::Checkboxes => "checkboxes",
            InputType::Datetime => "datetime",
            InputType::Dropdown => "dropdown",
            InputType::Slider => "slider",
            InputType::Text => "text",
            InputType::Custom => "custom",
        }
    }

    pub fn variant_name(self) -> &'static str {
        match self {
            InputType::Checkboxes => "Checkboxes",
            InputType::Datetime => "Datetime",
            InputType::Dropdown => "Dropdown",
            InputType::Slider => "Slider",
            InputType::Text => "Text",
            InputType::Custom => "Custom",
        }
    }

    /// Known tag, or `Custom` for anything else (including a missing tag).
    pub fn resolve(tag: Option<&str>) -> Self {
        tag.and_then(|tag| Self::KNOWN.into_iter().find(|known| known.as_str() == tag))
            .unwrap_or(InputType::Custom)
    }
}

/// Tags of the named variants. Anything else parses as `custom`.
pub fn valid_model_input_types() -> Vec<&'static str> {
    InputType::KNOWN.iter().map(|t| t.as_str()).collect()
}

/// Frontend hint for what to run after the bound variable changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionTriggerBehavior {
    #[default]
    ChangeVariableOnly,
    ChangeVariableAndExecuteAllBelow,
    ChangeVariableAndExecuteAll,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DropdownValue {
    Single(String),
    Multiple(Vec<String>),
}

/// A cell's `value`, typed per variant.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Checkboxes(Vec<String>),
    Datetime(DateTime<Utc>),
    Dropdown(DropdownValue),
    Slider(Number),
    Text(String),
    Custom(Value),
}

impl CellValue {
    pub fn default_for(input_type: InputType) -> Self {
        match input_type {
            InputType::Checkboxes => CellValue::Checkboxes(Vec::new()),
            InputType::Datetime => CellValue::Datetime(Utc::now()),
            InputType::Dropdown => CellValue::Dropdown(DropdownValue::Single(String::new())),
            InputType::Slider => CellValue::Slider(Number::from(0)),
            InputType::Text => CellValue::Text(String::new()),
            InputType::Custom => CellValue::Custom(Value::Null),
        }
    }

    pub fn from_json(input_type: InputType, value: Value) -> Result<Self, ValidationError> {
        let invalid = |constraint: String| ValidationError::new("value", constraint);
        match input_type {
            InputType::Checkboxes => string_list(&value)
                .map(CellValue::Checkboxes)
                .ok_or_else(|| invalid(format!("expected a list of strings, got {value}"))),
            InputType::Datetime => parse_datetime_value(&value)
                .map(CellValue::Datetime)
                .map_err(invalid),
            InputType::Dropdown => match value {
                Value::String(s) => Ok(CellValue::Dropdown(DropdownValue::Single(s))),
                other => string_list(&other)
                    .map(|items| CellValue::Dropdown(DropdownValue::Multiple(items)))
                    .ok_or_else(|| {
                        invalid(format!("expected a string or list of strings, got {other}"))
                    }),
            },
            InputType::Slider => match value {
                Value::Number(n) => Ok(CellValue::Slider(n)),
                other => Err(invalid(format!("expected a number, got {other}"))),
            },
            InputType::Text => match value {
                Value::String(s) => Ok(CellValue::Text(s)),
                other => Err(invalid(format!("expected a string, got {other}"))),
            },
            InputType::Custom => Ok(CellValue::Custom(value)),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Checkboxes(items) => Value::from(items.clone()),
            CellValue::Datetime(ts) => Value::String(format_datetime(ts)),
            CellValue::Dropdown(DropdownValue::Single(s)) => Value::String(s.clone()),
            CellValue::Dropdown(DropdownValue::Multiple(items)) => Value::from(items.clone()),
            CellValue::Slider(n) => Value::Number(n.clone()),
            CellValue::Text(s) => Value::String(s.clone()),
            CellValue::Custom(value) => value.clone(),
        }
    }

    /// What the value variable in the host namespace is bound to.
    pub fn to_kernel_value(&self) -> KernelValue {
        match self {
            CellValue::Datetime(ts) => KernelValue::Timestamp(*ts),
            other => KernelValue::Json(other.to_json()),
        }
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

/// Top-level fields of a form cell, without its settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CellModel {
    pub id: String,
    pub input_type: InputType,
    pub label: String,
    pub model_variable_name: String,
    pub value_variable_name: String,
    pub variable_type: String,
    pub value: CellValue,
    pub execution_trigger_behavior: ExecutionTriggerBehavior,
    /// Undeclared fields; only `Custom` cells carry any.
    pub extra: Map<String, Value>,
}

impl CellModel {
    pub const FIELDS: [&'static str; 8] = [
        "id",
        "label",
        "model_variable_name",
        "value_variable_name",
        "variable_type",
        "value",
        "execution_trigger_behavior",
        "input_type",
    ];

    pub fn new(id: impl Into<String>, input_type: InputType) -> Self {
        Self {
            id: id.into(),
            input_type,
            label: String::new(),
            model_variable_name: String::new(),
            value_variable_name: String::new(),
            variable_type: String::new(),
            value: CellValue::default_for(input_type),
            execution_trigger_behavior: ExecutionTriggerBehavior::default(),
            extra: Map::new(),
        }
    }
}

fn expect_string(field: &str, value: Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(ValidationError::new(field, format!("expected a string, got {other}"))),
    }
}

impl Record for CellModel {
    fn field_names(&self) -> Vec<String> {
        Self::FIELDS
            .iter()
            .map(|f| f.to_string())
            .chain(self.extra.keys().cloned())
            .collect()
    }

    fn dump(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("id".into(), Value::String(self.id.clone()));
        map.insert("label".into(), Value::String(self.label.clone()));
        map.insert(
            "model_variable_name".into(),
            Value::String(self.model_variable_name.clone()),
        );
        map.insert(
            "value_variable_name".into(),
            Value::String(self.value_variable_name.clone()),
        );
        map.insert("variable_type".into(), Value::String(self.variable_type.clone()));
        map.insert("value".into(), self.value.to_json());
        map.insert(
            "execution_trigger_behavior".into(),
            serde_json::to_value(self.execution_trigger_behavior).unwrap_or(Value::Null),
        );
        map.insert("input_type".into(), Value::String(self.input_type.as_str().into()));
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    fn with_field(&self, field: &str, value: Value) -> Result<Self, ValidationError> {
        let mut next = self.clone();
        match field {
            "id" => {
                if value.as_str() != Some(self.id.as_str()) {
                    return Err(ValidationError::new("id", "is immutable"));
                }
            }
            "input_type" => {
                if value.as_str() != Some(self.input_type.as_str()) {
                    return Err(ValidationError::new(
                        "input_type",
                        "cannot change on a live cell; use update_form_cell",
                    ));
                }
            }
            "label" => next.label = expect_string(field, value)?,
            "model_variable_name" => next.model_variable_name = expect_string(field, value)?,
            "value_variable_name" => next.value_variable_name = expect_string(field, value)?,
            "variable_type" => next.variable_type = expect_string(field, value)?,
            "value" => next.value = CellValue::from_json(self.input_type, value)?,
            "execution_trigger_behavior" => {
                next.execution_trigger_behavior = serde_json::from_value(value)
                    .map_err(|err| ValidationError::new(field, err.to_string()))?;
            }
            other if self.allows_extra_fields() => {
                next.extra.insert(other.to_string(), value);
            }
            other => return Err(ValidationError::new(other, "not a declared field")),
        }
        Ok(next)
    }

    fn allows_extra_fields(&self) -> bool {
        self.input_type == InputType::Custom
    }
}
