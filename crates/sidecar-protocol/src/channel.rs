use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;

use crate::envelope::CommMessage;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("comm '{0}' is closed")]
    Closed(String),
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Callback receiving the `body` of each inbound message.
pub type MessageHandler = Box<dyn Fn(Value)>;

/// Handlers registered on one channel, called in registration order.
///
/// Delivery works on a snapshot, so a handler may register further handlers;
/// those see the next message, not the current one.
#[derive(Default)]
pub struct MessageHandlers {
    handlers: RefCell<Vec<Rc<dyn Fn(Value)>>>,
}

impl MessageHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, handler: MessageHandler) {
        self.handlers.borrow_mut().push(Rc::from(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.borrow().is_empty()
    }

    pub fn deliver(&self, body: Value) {
        let handlers = self.handlers.borrow().clone();
        for handler in handlers {
            handler(body.clone());
        }
    }
}

/// Reliable, ordered, in-process duplex pipe to the frontend.
pub trait Channel {
    fn comm_id(&self) -> &str;

    fn target_name(&self) -> &str;

    fn send_message(&self, message: CommMessage) -> Result<(), ChannelError>;

    fn on_message(&self, handler: MessageHandler);

    /// Wraps `body` in an envelope addressed from this comm.
    fn send(&self, handler: Option<&str>, body: Value) -> Result<(), ChannelError> {
        let mut message = CommMessage::new(body).addressed(self.comm_id(), self.target_name());
        if let Some(handler) = handler {
            message = message.with_handler(handler);
        }
        self.send_message(message)
    }
}

pub type SharedChannel = Rc<dyn Channel>;

pub trait CommOpener {
    fn open_comm(&self, target_name: &str) -> Result<SharedChannel, ChannelError>;
}

pub type SharedCommOpener = Rc<dyn CommOpener>;
