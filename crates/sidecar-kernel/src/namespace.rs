use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::NamespaceError;
use crate::value::KernelValue;

/// The live variable scope of the interactive session. Form cells only
/// reach host state through this accessor.
pub trait HostNamespace {
    fn get(&self, name: &str) -> Option<KernelValue>;

    fn set(&self, name: &str, value: KernelValue) -> Result<(), NamespaceError>;

    /// Removes `name` and returns what was bound to it.
    fn delete(&self, name: &str) -> Result<KernelValue, NamespaceError>;

    /// Bound names in binding order.
    fn names(&self) -> Vec<String>;

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

pub type SharedNamespace = Rc<dyn HostNamespace>;

/// Namespace kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemNamespace {
    vars: RefCell<IndexMap<String, KernelValue>>,
}

impl MemNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vars.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.borrow().is_empty()
    }
}

fn check_name(name: &str) -> Result<(), NamespaceError> {
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(NamespaceError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl HostNamespace for MemNamespace {
    fn get(&self, name: &str) -> Option<KernelValue> {
        self.vars.borrow().get(name).cloned()
    }

    fn set(&self, name: &str, value: KernelValue) -> Result<(), NamespaceError> {
        check_name(name)?;
        self.vars.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<KernelValue, NamespaceError> {
        self.vars
            .borrow_mut()
            .shift_remove(name)
            .ok_or_else(|| NamespaceError::NotDefined(name.to_string()))
    }

    fn names(&self) -> Vec<String> {
        self.vars.borrow().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_get_delete() {
        let ns = MemNamespace::new();
        ns.set("x", json!(1).into()).unwrap();
        ns.set("y", json!("two").into()).unwrap();
        assert_eq!(ns.get("x"), Some(KernelValue::Json(json!(1))));
        assert_eq!(ns.names(), vec!["x", "y"]);

        assert_eq!(ns.delete("x").unwrap(), KernelValue::Json(json!(1)));
        assert!(!ns.contains("x"));
        assert_eq!(
            ns.delete("x").unwrap_err(),
            NamespaceError::NotDefined("x".into())
        );
    }

    #[test]
    fn rejects_blank_names() {
        let ns = MemNamespace::new();
        assert!(matches!(
            ns.set("", json!(1).into()),
            Err(NamespaceError::InvalidName(_))
        ));
        assert!(ns.set("a b", json!(1).into()).is_err());
        assert!(ns.is_empty());
    }
}
