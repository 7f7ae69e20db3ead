//! Wire types and channel contracts shared by the kernel side and the host.

pub mod channel;
pub mod comm;
pub mod envelope;
pub mod handlers;
pub mod inbound;
pub mod mem;

pub use channel::{
    Channel, ChannelError, CommOpener, MessageHandler, MessageHandlers, SharedChannel,
    SharedCommOpener,
};
pub use comm::CommManager;
pub use envelope::{CommMessage, SOURCE};
pub use inbound::{
    AssignValueVariable, CreateFormCell, DeleteFormCell, InboundMessage, RenameKernelVariable,
    UpdateFormCell,
};
pub use mem::MemChannel;
