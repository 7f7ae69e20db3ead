use std::cell::RefCell;

use serde_json::Value;

use crate::channel::{Channel, ChannelError, MessageHandler, MessageHandlers};
use crate::envelope::CommMessage;

/// In-memory channel: records outbound envelopes and feeds inbound bodies to
/// registered handlers.
pub struct MemChannel {
    comm_id: String,
    target_name: String,
    sent: RefCell<Vec<CommMessage>>,
    handlers: MessageHandlers,
}

impl MemChannel {
    pub fn new(target_name: impl Into<String>) -> Self {
        Self::with_comm_id(uuid::Uuid::new_v4().to_string(), target_name)
    }

    pub fn with_comm_id(comm_id: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            comm_id: comm_id.into(),
            target_name: target_name.into(),
            sent: RefCell::new(Vec::new()),
            handlers: MessageHandlers::new(),
        }
    }

    pub fn sent(&self) -> Vec<CommMessage> {
        self.sent.borrow().clone()
    }

    pub fn take_sent(&self) -> Vec<CommMessage> {
        self.sent.take()
    }

    pub fn sent_with_handler(&self, handler: &str) -> Vec<CommMessage> {
        self.sent
            .borrow()
            .iter()
            .filter(|m| m.handler.as_deref() == Some(handler))
            .cloned()
            .collect()
    }

    pub fn last_sent(&self) -> Option<CommMessage> {
        self.sent.borrow().last().cloned()
    }

    /// Simulates the frontend sending `body` over this comm.
    pub fn deliver(&self, body: Value) {
        self.handlers.deliver(body);
    }
}

impl Channel for MemChannel {
    fn comm_id(&self) -> &str {
        &self.comm_id
    }

    fn target_name(&self) -> &str {
        &self.target_name
    }

    fn send_message(&self, message: CommMessage) -> Result<(), ChannelError> {
        self.sent.borrow_mut().push(message);
        Ok(())
    }

    fn on_message(&self, handler: MessageHandler) {
        self.handlers.push(handler);
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use serde_json::json;

    use super::*;

    #[test]
    fn handlers_can_reply_and_subscribe_while_delivering() {
        let channel = Rc::new(MemChannel::with_comm_id("c1", "inbound"));
        let weak = Rc::downgrade(&channel);
        channel.on_message(Box::new(move |body| {
            let Some(channel) = weak.upgrade() else {
                return;
            };
            channel.send(Some("echo"), body).unwrap();
            channel.on_message(Box::new(|_| {}));
        }));

        channel.deliver(json!({"n": 1}));
        let sent = channel.take_sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, json!({"n": 1}));
        assert_eq!(sent[0].comm_id.as_deref(), Some("c1"));
    }
}
