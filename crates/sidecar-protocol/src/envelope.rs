use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Value of `source` on every envelope this bridge produces.
pub const SOURCE: &str = "sidecar_comms";

/// Envelope carried in both directions over a comm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommMessage {
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default = "empty_body")]
    pub body: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comm_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<String>,
}

fn default_source() -> String {
    SOURCE.to_string()
}

fn empty_body() -> Value {
    Value::Object(Map::new())
}

impl CommMessage {
    pub fn new(body: Value) -> Self {
        Self {
            source: default_source(),
            body,
            comm_id: None,
            target_name: None,
            handler: None,
        }
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    pub fn addressed(mut self, comm_id: impl Into<String>, target_name: impl Into<String>) -> Self {
        self.comm_id = Some(comm_id.into());
        self.target_name = Some(target_name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_serializes_without_empty_routing_fields() {
        let msg = CommMessage::new(json!({"status": "connected"}));
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"source": "sidecar_comms", "body": {"status": "connected"}})
        );

        let msg = msg.addressed("c1", "form_cells").with_handler("update_form_cell");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "source": "sidecar_comms",
                "body": {"status": "connected"},
                "comm_id": "c1",
                "target_name": "form_cells",
                "handler": "update_form_cell"
            })
        );
    }

    #[test]
    fn envelope_defaults_source_and_body() {
        let msg: CommMessage = serde_json::from_value(json!({"comm_id": "x"})).unwrap();
        assert_eq!(msg.source, SOURCE);
        assert_eq!(msg.body, json!({}));
        assert_eq!(msg.comm_id.as_deref(), Some("x"));
    }
}
