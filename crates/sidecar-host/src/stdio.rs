use std::cell::RefCell;
use std::io::{Stdout, Write};

use serde_json::Value;
use sidecar_protocol::{Channel, ChannelError, CommMessage, MessageHandler, MessageHandlers};

/// Channel that writes each outbound envelope as one JSON line.
pub struct WriterChannel<W: Write> {
    comm_id: String,
    target_name: String,
    writer: RefCell<W>,
    handlers: MessageHandlers,
}

impl<W: Write> WriterChannel<W> {
    pub fn new(comm_id: impl Into<String>, target_name: impl Into<String>, writer: W) -> Self {
        Self {
            comm_id: comm_id.into(),
            target_name: target_name.into(),
            writer: RefCell::new(writer),
            handlers: MessageHandlers::new(),
        }
    }

    /// Hands an inbound body to the registered handlers.
    pub fn deliver(&self, body: Value) {
        self.handlers.deliver(body);
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl WriterChannel<Stdout> {
    pub fn stdout(comm_id: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self::new(comm_id, target_name, std::io::stdout())
    }
}

impl<W: Write> Channel for WriterChannel<W> {
    fn comm_id(&self) -> &str {
        &self.comm_id
    }

    fn target_name(&self) -> &str {
        &self.target_name
    }

    fn send_message(&self, message: CommMessage) -> Result<(), ChannelError> {
        let mut line = serde_json::to_string(&message)?;
        line.push('\n');
        let mut writer = self.writer.borrow_mut();
        writer.write_all(line.as_bytes())?;
        writer.flush()?;
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
    fn writes_one_envelope_per_line() {
        let channel = WriterChannel::new("c1", "form_cells", Vec::new());
        channel.send(Some("update_form_cell"), json!({"id": "x"})).unwrap();
        channel.send(None, json!({"status": "connected"})).unwrap();

        let out = String::from_utf8(channel.into_inner()).unwrap();
        let lines: Vec<Value> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![
                json!({
                    "source": "sidecar_comms",
                    "body": {"id": "x"},
                    "comm_id": "c1",
                    "target_name": "form_cells",
                    "handler": "update_form_cell"
                }),
                json!({
                    "source": "sidecar_comms",
                    "body": {"status": "connected"},
                    "comm_id": "c1",
                    "target_name": "form_cells"
                }),
            ]
        );
    }

    #[test]
    fn deliver_reaches_handlers() {
        let channel = WriterChannel::new("c1", "inbound", Vec::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        channel.on_message(Box::new(move |body| sink.borrow_mut().push(body)));
        channel.deliver(json!({"msg": "get_kernel_variables"}));
        assert_eq!(*seen.borrow(), vec![json!({"msg": "get_kernel_variables"})]);
    }
}
