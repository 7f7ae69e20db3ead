use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use sidecar_observable::{Record, ValidationError, dump_serde, replace_field};

use super::model::InputType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderSettings {
    pub min: Number,
    pub max: Number,
    pub step: Number,
}

impl Default for SliderSettings {
    fn default() -> Self {
        Self {
            min: Number::from(0),
            max: Number::from(10),
            step: Number::from(1),
        }
    }
}

/// Choices for dropdowns and checkboxes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionsSettings {
    #[serde(default, deserialize_with = "one_or_many")]
    pub options: Vec<String>,
}

/// A lone scalar becomes a one-element list.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    fn scalar<E: de::Error>(value: Value) -> Result<String, E> {
        match value {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(E::custom(format!("expected a string option, got {other}"))),
        }
    }

    match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(scalar::<D::Error>).collect(),
        other => Ok(vec![scalar::<D::Error>(other)?]),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    pub min_length: u64,
    pub max_length: u64,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            min_length: 0,
            max_length: 1000,
        }
    }
}

/// The nested `settings` record; its shape is fixed by the cell's input type.
#[derive(Debug, Clone, PartialEq)]
pub enum Settings {
    /// Datetime cells have no settings.
    Empty,
    Slider(SliderSettings),
    Options(OptionsSettings),
    Text(TextSettings),
    Custom(Map<String, Value>),
}

impl Settings {
    pub fn default_for(input_type: InputType) -> Self {
        match input_type {
            InputType::Datetime => Settings::Empty,
            InputType::Slider => Settings::Slider(SliderSettings::default()),
            InputType::Checkboxes | InputType::Dropdown => {
                Settings::Options(OptionsSettings::default())
            }
            InputType::Text => Settings::Text(TextSettings::default()),
            InputType::Custom => Settings::Custom(Map::new()),
        }
    }

    /// Decodes and validates `raw` for `input_type`. Missing or null means
    /// defaults. Errors are reported under `settings.<field>`.
    pub fn from_value(input_type: InputType, raw: Option<Value>) -> Result<Self, ValidationError> {
        let map = match raw {
            None | Some(Value::Null) => return Ok(Self::default_for(input_type)),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(ValidationError::new(
                    "settings",
                    format!("expected an object, got {other}"),
                ));
            }
        };

        let settings = match input_type {
            InputType::Custom => Settings::Custom(map),
            InputType::Datetime => {
                warn_ignored(input_type, map.keys());
                Settings::Empty
            }
            _ => {
                let declared = Self::default_for(input_type).field_names();
                warn_ignored(input_type, map.keys().filter(|k| !declared.contains(k)));
                let value = Value::Object(map);
                let decoded = match input_type {
                    InputType::Slider => serde_json::from_value(value).map(Settings::Slider),
                    InputType::Text => serde_json::from_value(value).map(Settings::Text),
                    _ => serde_json::from_value(value).map(Settings::Options),
                };
                decoded.map_err(|err| ValidationError::new("settings", err.to_string()))?
            }
        };
        settings.validate().map_err(|err| err.nested("settings"))?;
        Ok(settings)
    }
}

fn warn_ignored<'a>(input_type: InputType, keys: impl Iterator<Item = &'a String>) {
    let ignored: Vec<&String> = keys.collect();
    if !ignored.is_empty() {
        tracing::warn!(
            input_type = input_type.as_str(),
            ?ignored,
            "ignoring undeclared settings"
        );
    }
}

fn positive(n: &Number) -> bool {
    n.as_f64().is_some_and(|v| v > 0.0)
}

impl Record for Settings {
    fn field_names(&self) -> Vec<String> {
        let names: &[&str] = match self {
            Settings::Empty => &[],
            Settings::Slider(_) => &["min", "max", "step"],
            Settings::Options(_) => &["options"],
            Settings::Text(_) => &["min_length", "max_length"],
            Settings::Custom(map) => return map.keys().cloned().collect(),
        };
        names.iter().map(|n| n.to_string()).collect()
    }

    fn dump(&self) -> Map<String, Value> {
        match self {
            Settings::Empty => Map::new(),
            Settings::Slider(s) => dump_serde(s),
            Settings::Options(s) => dump_serde(s),
            Settings::Text(s) => dump_serde(s),
            Settings::Custom(map) => map.clone(),
        }
    }

    fn with_field(&self, field: &str, value: Value) -> Result<Self, ValidationError> {
        match self {
            Settings::Slider(s) => replace_field(s, field, value).map(Settings::Slider),
            Settings::Options(s) => replace_field(s, field, value).map(Settings::Options),
            Settings::Text(s) => replace_field(s, field, value).map(Settings::Text),
            Settings::Custom(map) => {
                let mut map = map.clone();
                map.insert(field.to_string(), value);
                Ok(Settings::Custom(map))
            }
            Settings::Empty => Err(ValidationError::new(field, "not a declared field")),
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Settings::Slider(s) if !positive(&s.step) => {
                Err(ValidationError::new("step", "must be greater than 0"))
            }
            Settings::Text(s) if s.min_length > s.max_length => Err(ValidationError::new(
                "min_length",
                "must not exceed max_length",
            )),
            _ => Ok(()),
        }
    }

    fn allows_extra_fields(&self) -> bool {
        matches!(self, Settings::Custom(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_per_input_type() {
        let slider = Settings::from_value(InputType::Slider, None).unwrap();
        let expected = json!({"min": 0, "max": 10, "step": 1});
        assert_eq!(slider.dump(), expected.as_object().cloned().unwrap());
        let text = Settings::from_value(InputType::Text, Some(json!(null))).unwrap();
        assert_eq!(text, Settings::Text(TextSettings::default()));
        assert_eq!(
            Settings::from_value(InputType::Datetime, Some(json!({}))).unwrap(),
            Settings::Empty
        );
    }

    #[test]
    fn zero_step_is_rejected() {
        let err = Settings::from_value(InputType::Slider, Some(json!({"step": 0}))).unwrap_err();
        assert_eq!(err.field, "settings.step");
        assert!(Settings::from_value(InputType::Slider, Some(json!({"step": -0.5}))).is_err());
        assert!(Settings::from_value(InputType::Slider, Some(json!({"step": 0.1}))).is_ok());
    }

    #[test]
    fn scalar_option_becomes_list() {
        let settings =
            Settings::from_value(InputType::Dropdown, Some(json!({"options": "only"}))).unwrap();
        assert_eq!(
            settings,
            Settings::Options(OptionsSettings { options: vec!["only".into()] })
        );
        let settings =
            Settings::from_value(InputType::Checkboxes, Some(json!({"options": [1, "b"]})))
                .unwrap();
        assert_eq!(settings.field("options"), Some(json!(["1", "b"])));
        let nested = Settings::from_value(InputType::Checkboxes, Some(json!({"options": [{}]})));
        assert!(nested.is_err());
    }

    #[test]
    fn non_object_settings_are_rejected() {
        let err = Settings::from_value(InputType::Text, Some(json!([1]))).unwrap_err();
        assert_eq!(err.field, "settings");
    }

    #[test]
    fn custom_settings_keep_everything() {
        let settings =
            Settings::from_value(InputType::Custom, Some(json!({"min_foo": 0, "max_bar": 50})))
                .unwrap();
        assert_eq!(settings.field("max_bar"), Some(json!(50)));
        assert!(settings.allows_extra_fields());
        let next = settings.with_field("color", json!("red")).unwrap();
        assert_eq!(next.field_names(), vec!["min_foo", "max_bar", "color"]);
    }

    #[test]
    fn typed_field_replacement_revalidates_types() {
        let settings = Settings::default_for(InputType::Text);
        assert!(settings.with_field("max_length", json!("long")).is_err());
        let next = settings.with_field("max_length", json!(20)).unwrap();
        assert_eq!(next.field("max_length"), Some(json!(20)));
    }
}
