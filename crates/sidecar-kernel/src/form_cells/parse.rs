use serde_json::{Map, Value};
use sidecar_observable::{Record, ValidationError};

use super::cell::SETTINGS_FIELD;
use super::model::{CellModel, CellValue, InputType};
use super::settings::Settings;

/// A validated form-cell payload that has not been wired to a comm,
/// registry, or namespace yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFormCell {
    pub model: CellModel,
    pub settings: Settings,
}

fn take_string(
    payload: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<String>, ValidationError> {
    match payload.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(ValidationError::new(
            key,
            format!("expected a string, got {other}"),
        )),
    }
}

impl ParsedFormCell {
    /// Validates an untyped payload into the variant named by `input_type`.
    /// An unknown or missing tag yields a `custom` cell that keeps every
    /// undeclared key.
    pub fn from_payload(mut payload: Map<String, Value>) -> Result<Self, ValidationError> {
        let tag = take_string(&mut payload, "input_type")?;
        let input_type = InputType::resolve(tag.as_deref());
        if let Some(tag) = tag.as_deref()
            && input_type.as_str() != tag
        {
            tracing::debug!(tag, "unrecognized input_type, parsing as custom");
        }

        let id = take_string(&mut payload, "id")?
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut model = CellModel::new(id, input_type);
        model.label = take_string(&mut payload, "label")?.unwrap_or_default();
        model.model_variable_name =
            take_string(&mut payload, "model_variable_name")?.unwrap_or_default();
        model.value_variable_name =
            take_string(&mut payload, "value_variable_name")?.unwrap_or_default();
        model.variable_type = take_string(&mut payload, "variable_type")?.unwrap_or_default();

        match payload.remove("execution_trigger_behavior") {
            None | Some(Value::Null) => {}
            Some(raw) => {
                model.execution_trigger_behavior = serde_json::from_value(raw).map_err(|err| {
                    ValidationError::new("execution_trigger_behavior", err.to_string())
                })?;
            }
        }

        if let Some(raw) = payload.remove("value") {
            model.value = CellValue::from_json(input_type, raw)?;
        }

        let settings = Settings::from_value(input_type, payload.remove(SETTINGS_FIELD))?;

        if input_type == InputType::Custom {
            model.extra = payload;
        } else if !payload.is_empty() {
            let ignored: Vec<&String> = payload.keys().collect();
            tracing::warn!(
                input_type = input_type.as_str(),
                ?ignored,
                "ignoring undeclared fields"
            );
        }

        model.validate()?;
        Ok(Self { model, settings })
    }

    pub fn input_type(&self) -> InputType {
        self.model.input_type
    }

    /// Wire form: the model's fields with `settings` placed after `value`.
    pub fn dump(&self) -> Map<String, Value> {
        dump_with_settings(self.model.dump(), self.settings.dump())
    }
}

pub(crate) fn dump_with_settings(
    model: Map<String, Value>,
    settings: Map<String, Value>,
) -> Map<String, Value> {
    let mut out = Map::new();
    let mut settings = Some(Value::Object(settings));
    for (key, value) in model {
        let after_value = key == "value";
        out.insert(key, value);
        if after_value && let Some(settings) = settings.take() {
            out.insert(SETTINGS_FIELD.to_string(), settings);
        }
    }
    if let Some(settings) = settings {
        out.insert(SETTINGS_FIELD.to_string(), settings);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use crate::form_cells::model::DropdownValue;

    fn parse(value: Value) -> Result<ParsedFormCell, ValidationError> {
        match value {
            Value::Object(map) => ParsedFormCell::from_payload(map),
            _ => unreachable!("fixtures are objects"),
        }
    }

    #[test]
    fn parse_checkboxes() {
        let parsed = parse(json!({
            "input_type": "checkboxes",
            "model_variable_name": "test",
            "value": ["test"],
            "variable_type": "str",
            "settings": {"options": ["test"]},
        }))
        .unwrap();
        assert_eq!(parsed.input_type(), InputType::Checkboxes);
        assert_eq!(parsed.model.model_variable_name, "test");
        assert_eq!(parsed.model.value, CellValue::Checkboxes(vec!["test".into()]));
        assert_eq!(parsed.model.variable_type, "str");
        assert_eq!(parsed.settings.field("options"), Some(json!(["test"])));
    }

    #[test]
    fn parse_datetime() {
        let parsed = parse(json!({
            "input_type": "datetime",
            "model_variable_name": "test",
            "value": "2023-01-01T00:00:00Z",
            "variable_type": "datetime",
            "settings": {},
        }))
        .unwrap();
        assert_eq!(
            parsed.model.value,
            CellValue::Datetime(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
        );
        assert_eq!(parsed.dump()["value"], json!("2023-01-01T00:00:00+00:00"));
        assert_eq!(parsed.settings, Settings::Empty);
    }

    #[test]
    fn parse_dropdown() {
        let parsed = parse(json!({
            "input_type": "dropdown",
            "model_variable_name": "test",
            "value": ["a"],
            "variable_type": "str",
            "settings": {"options": ["a", "b", "c"]},
        }))
        .unwrap();
        assert_eq!(
            parsed.model.value,
            CellValue::Dropdown(DropdownValue::Multiple(vec!["a".into()]))
        );
        assert_eq!(parsed.settings.field("options"), Some(json!(["a", "b", "c"])));
    }

    #[test]
    fn parse_slider() {
        let parsed = parse(json!({
            "input_type": "slider",
            "model_variable_name": "test",
            "value": 0,
            "variable_type": "int",
            "settings": {"min": 0, "max": 100, "step": 1},
        }))
        .unwrap();
        assert_eq!(parsed.input_type(), InputType::Slider);
        assert_eq!(parsed.dump()["settings"], json!({"min": 0, "max": 100, "step": 1}));
    }

    #[test]
    fn parse_text() {
        let parsed = parse(json!({
            "input_type": "text",
            "model_variable_name": "test",
            "value": "test",
            "settings": {"min_length": 0, "max_length": 1000},
        }))
        .unwrap();
        assert_eq!(parsed.model.value, CellValue::Text("test".into()));
        assert_eq!(parsed.settings.field("max_length"), Some(json!(1000)));
    }

    #[test]
    fn parse_custom() {
        let parsed = parse(json!({
            "input_type": "my_new_form_cell_type",
            "model_variable_name": "test",
            "value": "test",
            "settings": {"min_foo": 0, "max_bar": 50},
            "form_type": "new_plugin",
        }))
        .unwrap();
        assert_eq!(parsed.input_type(), InputType::Custom);
        assert_eq!(parsed.model.value, CellValue::Custom(json!("test")));
        assert_eq!(parsed.settings.field("min_foo"), Some(json!(0)));
        assert_eq!(parsed.model.extra.get("form_type"), Some(&json!("new_plugin")));
        assert_eq!(parsed.dump()["input_type"], json!("custom"));
    }

    #[test]
    fn missing_input_type_is_custom() {
        let parsed = parse(json!({"model_variable_name": "m", "shape": "round"})).unwrap();
        assert_eq!(parsed.input_type(), InputType::Custom);
        assert_eq!(parsed.model.extra.get("shape"), Some(&json!("round")));
    }

    #[test]
    fn validation_errors_name_the_field() {
        let err = parse(json!({"input_type": "slider", "settings": {"step": 0}})).unwrap_err();
        assert_eq!(err.field, "settings.step");
        let err = parse(json!({"input_type": "slider", "value": "high"})).unwrap_err();
        assert_eq!(err.field, "value");
        let err = parse(json!({"input_type": "text", "label": 4})).unwrap_err();
        assert_eq!(err.field, "label");
        let err =
            parse(json!({"input_type": "text", "execution_trigger_behavior": "sometimes"}))
                .unwrap_err();
        assert_eq!(err.field, "execution_trigger_behavior");
    }

    #[test]
    fn keeps_supplied_id_and_generates_missing_ones() {
        let parsed = parse(json!({"input_type": "text", "id": "fixed"})).unwrap();
        assert_eq!(parsed.model.id, "fixed");
        let a = parse(json!({"input_type": "text"})).unwrap();
        let b = parse(json!({"input_type": "text"})).unwrap();
        assert_ne!(a.model.id, b.model.id);
    }

    #[test]
    fn dump_places_settings_after_value() {
        let parsed = parse(json!({"input_type": "text", "id": "x"})).unwrap();
        let dump = parsed.dump();
        let keys: Vec<&str> = dump.keys().map(String::as_str).collect();
        let value_at = keys.iter().position(|k| *k == "value").unwrap();
        assert_eq!(keys[value_at + 1], "settings");
    }

    #[test]
    fn dump_then_parse_round_trips() {
        let parsed = parse(json!({
            "input_type": "slider",
            "label": "Level",
            "model_variable_name": "level",
            "value": 3.5,
            "settings": {"min": -1, "max": 5, "step": 0.5},
            "execution_trigger_behavior": "change_variable_and_execute_all_below",
        }))
        .unwrap();
        let again = ParsedFormCell::from_payload(parsed.dump()).unwrap();
        assert_eq!(again, parsed);
    }
}
