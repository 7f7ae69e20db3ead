use sidecar_kernel::{FormCellError, NamespaceError};
use sidecar_protocol::ChannelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("invalid message: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("form cell error: {0}")]
    FormCell(#[from] FormCellError),
    #[error("namespace error: {0}")]
    Namespace(#[from] NamespaceError),
    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),
}
