//! Field-level change tracking for structured records.
//!
//! A [`Record`] describes its declared fields and how to produce a validated
//! copy with one field replaced. [`ObservableRecord`] wraps a record, owns an
//! [`ObserverRegistry`], and notifies observers synchronously, in registration
//! order, whenever `set` actually changes a field.

pub mod change;
pub mod error;
pub mod observer;
pub mod record;
pub mod registry;

pub use change::Change;
pub use error::{ObservableError, ValidationError};
pub use observer::{Fields, Observer, ObserverOrigin};
pub use record::{
    ObservableConfig, ObservableRecord, Record, UnknownFieldPolicy, dump_serde, replace_field,
};
pub use registry::ObserverRegistry;
