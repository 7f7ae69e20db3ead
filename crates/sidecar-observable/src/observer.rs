use std::fmt;
use std::rc::Rc;

use crate::change::Change;

pub type ObserverFn = dyn Fn(&Change) -> anyhow::Result<()>;

/// Who installed an observer. Builtin observers belong to the record's owner
/// and are recreated rather than copied when a record is rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverOrigin {
    Builtin,
    External,
}

/// Field selection for `observe`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Fields {
    /// Every field declared at registration time.
    #[default]
    All,
    Named(Vec<String>),
}

impl Fields {
    pub fn resolve(self, declared: impl FnOnce() -> Vec<String>) -> Vec<String> {
        match self {
            Fields::All => declared(),
            Fields::Named(names) => names,
        }
    }
}

impl From<&str> for Fields {
    fn from(name: &str) -> Self {
        Fields::Named(vec![name.to_string()])
    }
}

impl From<String> for Fields {
    fn from(name: String) -> Self {
        Fields::Named(vec![name])
    }
}

impl From<Vec<String>> for Fields {
    fn from(names: Vec<String>) -> Self {
        Fields::Named(names)
    }
}

impl From<&[&str]> for Fields {
    fn from(names: &[&str]) -> Self {
        Fields::Named(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Fields {
    fn from(names: [&str; N]) -> Self {
        Fields::Named(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Handle to a registered callback.
///
/// Cloning shares the same callback; equality is identity, so a handle
/// registered under several fields is removed from all of them at once.
#[derive(Clone)]
pub struct Observer {
    inner: Rc<ObserverInner>,
}

struct ObserverInner {
    label: String,
    fields: Vec<String>,
    origin: ObserverOrigin,
    callback: Box<ObserverFn>,
}

impl Observer {
    pub fn new<F>(
        label: impl Into<String>,
        fields: Vec<String>,
        origin: ObserverOrigin,
        callback: F,
    ) -> Self
    where
        F: Fn(&Change) -> anyhow::Result<()> + 'static,
    {
        Self {
            inner: Rc::new(ObserverInner {
                label: label.into(),
                fields,
                origin,
                callback: Box::new(callback),
            }),
        }
    }

    pub fn external<F>(fields: Vec<String>, callback: F) -> Self
    where
        F: Fn(&Change) -> anyhow::Result<()> + 'static,
    {
        Self::new("external", fields, ObserverOrigin::External, callback)
    }

    pub fn builtin<F>(label: &str, fields: Vec<String>, callback: F) -> Self
    where
        F: Fn(&Change) -> anyhow::Result<()> + 'static,
    {
        Self::new(label, fields, ObserverOrigin::Builtin, callback)
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Fields this observer was registered for when it was created.
    pub fn fields(&self) -> &[String] {
        &self.inner.fields
    }

    pub fn origin(&self) -> ObserverOrigin {
        self.inner.origin
    }

    pub fn is_builtin(&self) -> bool {
        self.inner.origin == ObserverOrigin::Builtin
    }

    pub fn notify(&self, change: &Change) -> anyhow::Result<()> {
        (self.inner.callback)(change)
    }
}

impl PartialEq for Observer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Observer {}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("label", &self.inner.label)
            .field("fields", &self.inner.fields)
            .field("origin", &self.inner.origin)
            .finish_non_exhaustive()
    }
}
