use thiserror::Error;

/// A payload or assignment that violates a field's type or constraint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid '{field}': {constraint}")]
pub struct ValidationError {
    pub field: String,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
        }
    }

    /// Re-roots the error under a parent field, e.g. `step` -> `settings.step`.
    pub fn nested(self, parent: &str) -> Self {
        Self {
            field: format!("{parent}.{}", self.field),
            constraint: self.constraint,
        }
    }
}

#[derive(Debug, Error)]
pub enum ObservableError {
    #[error("'{0}' is not a declared field")]
    UnknownField(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("observer for '{field}' failed: {source}")]
    Observer {
        field: String,
        #[source]
        source: anyhow::Error,
    },
}
