use std::cell::RefCell;
use std::fmt;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::change::Change;
use crate::error::{ObservableError, ValidationError};
use crate::observer::{Fields, Observer};
use crate::registry::ObserverRegistry;

/// A structured value with named fields that can be replaced one at a time.
pub trait Record: Clone + fmt::Debug {
    /// Currently declared field names, in declaration order.
    fn field_names(&self) -> Vec<String>;

    /// Full field-name to JSON mapping.
    fn dump(&self) -> Map<String, Value>;

    /// Copy of `self` with `field` decoded from `value`. Type errors are
    /// reported here; cross-field constraints belong in [`Record::validate`].
    fn with_field(&self, field: &str, value: Value) -> Result<Self, ValidationError>;

    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Records that accept arbitrary additional fields store undeclared
    /// assignments instead of applying the unknown-field policy.
    fn allows_extra_fields(&self) -> bool {
        false
    }

    fn field(&self, name: &str) -> Option<Value> {
        self.dump().remove(name)
    }

    fn has_field(&self, name: &str) -> bool {
        self.field_names().iter().any(|f| f == name)
    }
}

/// JSON object form of a serde record. Non-object serializations map to an empty object.
pub fn dump_serde<T: Serialize>(record: &T) -> Map<String, Value> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// `with_field` for plain serde records: dump, replace, decode.
pub fn replace_field<T>(record: &T, field: &str, value: Value) -> Result<T, ValidationError>
where
    T: Serialize + DeserializeOwned,
{
    let mut map = dump_serde(record);
    map.insert(field.to_string(), value);
    serde_json::from_value(Value::Object(map))
        .map_err(|err| ValidationError::new(field, err.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownFieldPolicy {
    #[default]
    Reject,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservableConfig {
    /// Run [`Record::validate`] on every assignment.
    pub validate_assignment: bool,
    pub unknown_fields: UnknownFieldPolicy,
}

impl Default for ObservableConfig {
    fn default() -> Self {
        Self {
            validate_assignment: true,
            unknown_fields: UnknownFieldPolicy::Reject,
        }
    }
}

/// A record whose assignments notify registered observers.
///
/// Single-threaded: state and observers live in `RefCell`s, and no borrow is
/// held while callbacks run, so observers may read the record (or mutate it).
pub struct ObservableRecord<R: Record> {
    state: RefCell<R>,
    observers: RefCell<ObserverRegistry>,
    config: ObservableConfig,
}

impl<R: Record> ObservableRecord<R> {
    pub fn new(record: R) -> Self {
        Self::with_config(record, ObservableConfig::default())
    }

    pub fn with_config(record: R, config: ObservableConfig) -> Self {
        Self {
            state: RefCell::new(record),
            observers: RefCell::new(ObserverRegistry::new()),
            config,
        }
    }

    pub fn config(&self) -> &ObservableConfig {
        &self.config
    }

    pub fn snapshot(&self) -> R {
        self.state.borrow().clone()
    }

    pub fn with<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.state.borrow())
    }

    pub fn dump(&self) -> Map<String, Value> {
        self.state.borrow().dump()
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        self.state.borrow().field(name)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.state.borrow().field_names()
    }

    /// Registers `callback` for future changes of `fields`. `Fields::All`
    /// resolves to the fields declared right now.
    pub fn observe<F>(&self, callback: F, fields: impl Into<Fields>) -> Observer
    where
        F: Fn(&Change) -> anyhow::Result<()> + 'static,
    {
        let names = fields.into().resolve(|| self.field_names());
        let observer = Observer::external(names, callback);
        self.register(&observer);
        observer
    }

    /// Attaches a prebuilt observer under each of its own fields.
    pub fn register(&self, observer: &Observer) {
        let mut registry = self.observers.borrow_mut();
        for field in observer.fields() {
            registry.attach(field, observer.clone());
        }
    }

    pub fn attach(&self, field: &str, observer: Observer) {
        self.observers.borrow_mut().attach(field, observer);
    }

    pub fn remove_observer(&self, observer: &Observer) -> bool {
        self.observers.borrow_mut().remove(observer)
    }

    pub fn observers(&self) -> ObserverRegistry {
        self.observers.borrow().clone()
    }

    /// Swaps in a whole record without notifying anyone. Returns the old one.
    pub fn replace(&self, record: R) -> R {
        self.state.replace(record)
    }

    /// Assigns `field`. Observers of that field run only when the stored
    /// value differs from the previous one; the first observer error stops
    /// notification and is returned (the assignment itself stays applied).
    pub fn set(&self, field: &str, value: Value) -> Result<bool, ObservableError> {
        let (next, old, new) = {
            let current = self.state.borrow();
            if !current.has_field(field) && !current.allows_extra_fields() {
                match self.config.unknown_fields {
                    UnknownFieldPolicy::Reject => {
                        return Err(ObservableError::UnknownField(field.to_string()));
                    }
                    UnknownFieldPolicy::Ignore => {
                        tracing::debug!(field, "ignoring assignment to undeclared field");
                        return Ok(false);
                    }
                }
            }
            let old = current.field(field).unwrap_or(Value::Null);
            let next = current.with_field(field, value)?;
            if self.config.validate_assignment {
                next.validate()?;
            }
            let new = next.field(field).unwrap_or(Value::Null);
            (next, old, new)
        };
        *self.state.borrow_mut() = next;

        if old == new {
            return Ok(false);
        }
        self.notify(&Change::new(field, old, new))?;
        Ok(true)
    }

    /// Runs every observer registered for `change.field`, in order.
    pub fn notify(&self, change: &Change) -> Result<(), ObservableError> {
        let observers = self.observers.borrow().for_field(&change.field);
        for observer in observers {
            observer
                .notify(change)
                .map_err(|source| ObservableError::Observer {
                    field: change.field.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}

impl<R: Record> fmt::Debug for ObservableRecord<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableRecord")
            .field("state", &*self.state.borrow())
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}
