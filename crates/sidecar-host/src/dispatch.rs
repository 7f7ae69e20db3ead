use std::rc::Rc;

use serde_json::{Map, Value, json};
use sidecar_kernel::form_cells::{
    CellContext, assign_value_variable, create_form_cell, delete_form_cell,
    update_form_cell_by_id,
};
use sidecar_protocol::handlers::{self, STATUS_CONNECTED, STATUS_ERROR, STATUS_RECEIVED};
use sidecar_protocol::{Channel, ChannelError, InboundMessage, SharedChannel};

use crate::config::SidecarConfig;
use crate::error::HostError;
use crate::explorer::{get_kernel_variables, rename_kernel_variable};
use crate::prompt::generate_prompt;

/// Keys that address a message rather than describe a form cell.
const ENVELOPE_KEYS: [&str; 3] = ["msg", "cell_id", "form_cell_id"];

/// An outbound body and the handler it is addressed to.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub handler: &'static str,
    pub body: Value,
}

impl Reply {
    pub fn new(handler: &'static str, body: Value) -> Self {
        Self { handler, body }
    }

    /// Structured error echoing the offending inbound body.
    pub fn error(err: &HostError, raw: &Value) -> Self {
        Self::new(
            handlers::ERROR,
            json!({
                "status": STATUS_ERROR,
                "error": err.to_string(),
                "message": raw,
            }),
        )
    }
}

/// Routes inbound frontend requests to kernel operations, one at a time.
pub struct Dispatcher {
    ctx: CellContext,
    config: SidecarConfig,
}

impl Dispatcher {
    pub fn new(ctx: CellContext, config: SidecarConfig) -> Self {
        let ctx = ctx.with_target(config.form_cell_target.clone());
        Self { ctx, config }
    }

    pub fn context(&self) -> &CellContext {
        &self.ctx
    }

    pub fn config(&self) -> &SidecarConfig {
        &self.config
    }

    /// Completion prompt for `prompt`, with the variables it mentions looked
    /// up in this session's namespace.
    pub fn prompt_for(&self, prompt: &str) -> String {
        generate_prompt(prompt, &*self.ctx.namespace)
    }

    /// Handles every message arriving on `channel` and announces the
    /// connection on it.
    pub fn attach(self: &Rc<Self>, channel: &SharedChannel) -> Result<(), ChannelError> {
        let dispatcher = Rc::downgrade(self);
        let reply_to = Rc::downgrade(channel);
        channel.on_message(Box::new(move |body| {
            let (Some(dispatcher), Some(channel)) = (dispatcher.upgrade(), reply_to.upgrade())
            else {
                tracing::debug!("dropping message for a detached dispatcher");
                return;
            };
            dispatcher.handle_msg(&body, &*channel);
        }));
        channel.send(None, json!({"status": STATUS_CONNECTED}))
    }

    /// Dispatches `body` and sends the reply (or error) on `channel`.
    /// Never fails; send errors are logged.
    pub fn handle_msg(&self, body: &Value, channel: &dyn Channel) {
        if self.config.echo_inbound {
            send_logged(channel, None, json!({"status": STATUS_RECEIVED, "data": body}));
        }
        if let Some(reply) = self.respond(body) {
            send_logged(channel, Some(reply.handler), reply.body);
        }
    }

    /// [`Dispatcher::dispatch`] with failures turned into error replies.
    pub fn respond(&self, body: &Value) -> Option<Reply> {
        match self.dispatch(body) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(%err, "dispatch failed");
                Some(Reply::error(&err, body))
            }
        }
    }

    pub fn dispatch(&self, body: &Value) -> Result<Option<Reply>, HostError> {
        let msg = InboundMessage::decode(body)?;
        tracing::debug!(kind = msg.kind(), "dispatching");

        let reply = match msg {
            InboundMessage::GetKernelVariables => {
                let vars = get_kernel_variables(&*self.ctx.namespace, &self.config);
                Reply::new(handlers::GET_KERNEL_VARIABLES, Value::Object(vars))
            }
            InboundMessage::RenameKernelVariable(req) => {
                let status = rename_kernel_variable(
                    &*self.ctx.namespace,
                    &req.old_name,
                    &req.new_name,
                );
                Reply::new(handlers::RENAME_KERNEL_VARIABLE, json!({"status": status}))
            }
            InboundMessage::CreateFormCell(req) => {
                require(&req.payload, "input_type")?;
                require(&req.payload, "model_variable_name")?;
                let cell = create_form_cell(&self.ctx, strip_envelope_keys(req.payload))?;
                Reply::new(
                    handlers::CREATE_FORM_CELL,
                    json!({"cell_id": req.cell_id, "form_cell": cell.dump()}),
                )
            }
            InboundMessage::UpdateFormCell(req) => {
                let cell = update_form_cell_by_id(
                    &self.ctx,
                    &req.form_cell_id,
                    strip_envelope_keys(req.update),
                )?;
                Reply::new(handlers::UPDATE_FORM_CELL, Value::Object(cell.dump()))
            }
            InboundMessage::DeleteFormCell(req) => {
                let cell = delete_form_cell(&self.ctx, &req.variable_name)?;
                Reply::new(
                    handlers::DELETE_FORM_CELL,
                    json!({"cell_id": req.cell_id, "form_cell": cell.dump()}),
                )
            }
            InboundMessage::AssignValueVariable(req) => {
                assign_value_variable(&self.ctx, &req.form_cell_id, &req.value_variable_name)?;
                return Ok(None);
            }
        };
        Ok(Some(reply))
    }
}

fn require(payload: &Map<String, Value>, key: &'static str) -> Result<(), HostError> {
    match payload.get(key) {
        None | Some(Value::Null) => Err(HostError::MissingField(key)),
        Some(_) => Ok(()),
    }
}

fn strip_envelope_keys(mut payload: Map<String, Value>) -> Map<String, Value> {
    for key in ENVELOPE_KEYS {
        if payload.remove(key).is_some() {
            tracing::warn!(key, "dropping envelope key from form cell payload");
        }
    }
    payload
}

fn send_logged(channel: &dyn Channel, handler: Option<&str>, body: Value) {
    if let Err(err) = channel.send(handler, body) {
        tracing::error!(%err, comm_id = channel.comm_id(), "failed to send reply");
    }
}
