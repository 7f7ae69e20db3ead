use sidecar_observable::{ObservableError, ValidationError};
use sidecar_protocol::ChannelError;
use thiserror::Error;

use crate::form_cells::MergeError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    #[error("name '{0}' is not defined")]
    NotDefined(String),
    #[error("'{0}' is not a valid variable name")]
    InvalidName(String),
}

#[derive(Debug, Error)]
pub enum FormCellError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("form cell '{0}' not found")]
    NotFound(String),
    #[error("'{0}' is not a form cell")]
    NotAFormCell(String),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error(transparent)]
    Namespace(#[from] NamespaceError),
    #[error(transparent)]
    Channel(#[from] ChannelError),
    #[error(transparent)]
    Observable(ObservableError),
}

impl From<ObservableError> for FormCellError {
    fn from(err: ObservableError) -> Self {
        match err {
            ObservableError::Validation(err) => FormCellError::Validation(err),
            other => FormCellError::Observable(other),
        }
    }
}
