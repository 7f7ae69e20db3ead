use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Operations the frontend can request, discriminated by the body's `msg` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg", rename_all = "snake_case")]
pub enum InboundMessage {
    GetKernelVariables,
    RenameKernelVariable(RenameKernelVariable),
    CreateFormCell(CreateFormCell),
    UpdateFormCell(UpdateFormCell),
    DeleteFormCell(DeleteFormCell),
    AssignValueVariable(AssignValueVariable),
}

impl InboundMessage {
    pub fn decode(body: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(body)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InboundMessage::GetKernelVariables => "get_kernel_variables",
            InboundMessage::RenameKernelVariable(_) => "rename_kernel_variable",
            InboundMessage::CreateFormCell(_) => "create_form_cell",
            InboundMessage::UpdateFormCell(_) => "update_form_cell",
            InboundMessage::DeleteFormCell(_) => "delete_form_cell",
            InboundMessage::AssignValueVariable(_) => "assign_value_variable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenameKernelVariable {
    pub old_name: String,
    /// Empty means delete.
    #[serde(default)]
    pub new_name: String,
}

/// `cell_id` is the notebook cell correlation token; everything else is the
/// form-cell payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFormCell {
    pub cell_id: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateFormCell {
    pub form_cell_id: String,
    #[serde(flatten)]
    pub update: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteFormCell {
    pub variable_name: String,
    pub cell_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignValueVariable {
    pub form_cell_id: String,
    pub value_variable_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_create_with_payload() {
        let body = json!({
            "msg": "create_form_cell",
            "cell_id": "cell-1",
            "input_type": "slider",
            "model_variable_name": "x",
            "settings": {"min": 0}
        });
        let InboundMessage::CreateFormCell(req) = InboundMessage::decode(&body).unwrap() else {
            panic!("expected create");
        };
        assert_eq!(req.cell_id, "cell-1");
        assert_eq!(req.payload.get("input_type"), Some(&json!("slider")));
        assert_eq!(req.payload.get("settings"), Some(&json!({"min": 0})));
        assert!(!req.payload.contains_key("msg"));
        assert!(!req.payload.contains_key("cell_id"));
    }

    #[test]
    fn decodes_update_and_rename() {
        let body = json!({"msg": "update_form_cell", "form_cell_id": "f1", "value": 3});
        let msg = InboundMessage::decode(&body).unwrap();
        assert_eq!(msg.kind(), "update_form_cell");
        let InboundMessage::UpdateFormCell(req) = msg else {
            panic!("expected update");
        };
        assert_eq!(req.form_cell_id, "f1");
        assert_eq!(req.update.len(), 1);

        let body = json!({"msg": "rename_kernel_variable", "old_name": "a"});
        assert_eq!(
            InboundMessage::decode(&body).unwrap(),
            InboundMessage::RenameKernelVariable(RenameKernelVariable {
                old_name: "a".into(),
                new_name: String::new(),
            })
        );
    }

    #[test]
    fn rejects_unknown_and_incomplete_messages() {
        assert!(InboundMessage::decode(&json!({"msg": "launch_rockets"})).is_err());
        assert!(InboundMessage::decode(&json!({"old_name": "a"})).is_err());
        let missing = json!({"msg": "delete_form_cell", "cell_id": "c"});
        assert!(InboundMessage::decode(&missing).is_err());
    }
}
