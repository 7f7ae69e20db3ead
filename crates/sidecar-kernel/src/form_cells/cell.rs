use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};
use sidecar_observable::{Change, Fields, ObservableRecord, Observer, ObserverRegistry, Record};
use sidecar_protocol::handlers::{DISPLAY_FORM_CELL, UPDATE_FORM_CELL};
use sidecar_protocol::{ChannelError, SharedChannel};

use super::context::CellContext;
use super::model::{CellModel, CellValue, ExecutionTriggerBehavior, InputType};
use super::parse::{ParsedFormCell, dump_with_settings};
use super::settings::Settings;
use crate::error::{FormCellError, NamespaceError};
use crate::namespace::HostNamespace;
use crate::value::KernelValue;

/// Label of the builtin observer that mirrors every change to the frontend.
pub const SYNC_OBSERVER: &str = "sync_sidecar";
/// Label of the builtin observer that republishes `value` to the namespace.
pub const VALUE_OBSERVER: &str = "on_value_update";
pub const SETTINGS_FIELD: &str = "settings";

/// A live form cell.
///
/// Cloning yields another handle to the same cell; a reconciled update
/// produces a new cell with the same id.
#[derive(Clone)]
pub struct FormCell {
    inner: Rc<FormCellInner>,
}

struct FormCellInner {
    record: ObservableRecord<CellModel>,
    settings: ObservableRecord<Settings>,
    comm: SharedChannel,
    namespace: Weak<dyn HostNamespace>,
}

type Callback = Box<dyn Fn(&Change) -> anyhow::Result<()>>;

fn on_cell(weak: Weak<FormCellInner>, f: fn(&FormCell) -> anyhow::Result<()>) -> Callback {
    Box::new(move |_| match weak.upgrade() {
        Some(inner) => f(&FormCell { inner }),
        None => Ok(()),
    })
}

/// A cell that is wired up but not yet registered or published.
pub(crate) struct PendingCell {
    pub(crate) cell: FormCell,
    /// The payload left `value_variable_name` empty and it was filled in.
    pub(crate) defaulted_value_name: bool,
}

impl FormCell {
    /// Opens the comm and installs the builtin observers. Nothing outside
    /// the new cell is touched.
    pub(crate) fn build(
        parsed: ParsedFormCell,
        ctx: &CellContext,
    ) -> Result<PendingCell, FormCellError> {
        let comm = ctx.comms.open_comm(&ctx.target_name)?;
        let mut model = parsed.model;
        let defaulted_value_name = model.value_variable_name.is_empty();
        if defaulted_value_name {
            model.value_variable_name = format!("{}_value", model.model_variable_name);
        }
        let cell = FormCell {
            inner: Rc::new(FormCellInner {
                record: ObservableRecord::new(model),
                settings: ObservableRecord::new(parsed.settings),
                comm,
                namespace: Rc::downgrade(&ctx.namespace),
            }),
        };
        cell.install_builtin_observers();
        Ok(PendingCell {
            cell,
            defaulted_value_name,
        })
    }

    fn install_builtin_observers(&self) {
        let weak = Rc::downgrade(&self.inner);

        let mut fields = self.inner.record.field_names();
        fields.push(SETTINGS_FIELD.to_string());
        self.inner.record.register(&Observer::builtin(
            SYNC_OBSERVER,
            fields,
            on_cell(weak.clone(), |cell| Ok(cell.sync_sidecar()?)),
        ));
        self.inner.record.register(&Observer::builtin(
            VALUE_OBSERVER,
            vec!["value".to_string()],
            on_cell(weak.clone(), |cell| Ok(cell.publish_value()?)),
        ));
        self.inner.settings.register(&Observer::builtin(
            SYNC_OBSERVER,
            self.inner.settings.field_names(),
            on_cell(weak, |cell| Ok(cell.sync_sidecar()?)),
        ));
    }

    pub fn id(&self) -> String {
        self.inner.record.with(|m| m.id.clone())
    }

    pub fn input_type(&self) -> InputType {
        self.inner.record.with(|m| m.input_type)
    }

    pub fn label(&self) -> String {
        self.inner.record.with(|m| m.label.clone())
    }

    pub fn model_variable_name(&self) -> String {
        self.inner.record.with(|m| m.model_variable_name.clone())
    }

    pub fn value_variable_name(&self) -> String {
        self.inner.record.with(|m| m.value_variable_name.clone())
    }

    pub fn variable_type(&self) -> String {
        self.inner.record.with(|m| m.variable_type.clone())
    }

    pub fn execution_trigger_behavior(&self) -> ExecutionTriggerBehavior {
        self.inner.record.with(|m| m.execution_trigger_behavior)
    }

    pub fn value(&self) -> CellValue {
        self.inner.record.with(|m| m.value.clone())
    }

    pub fn snapshot(&self) -> CellModel {
        self.inner.record.snapshot()
    }

    /// Full wire form, `settings` included.
    pub fn dump(&self) -> Map<String, Value> {
        dump_with_settings(self.inner.record.dump(), self.inner.settings.dump())
    }

    pub fn field(&self, name: &str) -> Option<Value> {
        if name == SETTINGS_FIELD {
            return Some(Value::Object(self.inner.settings.dump()));
        }
        self.inner.record.field(name)
    }

    /// Assigns one top-level field. Assigning `settings` replaces the whole
    /// settings record and notifies observers of `settings`.
    pub fn set(&self, field: &str, value: Value) -> Result<bool, FormCellError> {
        if field == SETTINGS_FIELD {
            return self.replace_settings(value);
        }
        Ok(self.inner.record.set(field, value)?)
    }

    fn replace_settings(&self, value: Value) -> Result<bool, FormCellError> {
        let next = Settings::from_value(self.input_type(), Some(value))?;
        let old = Value::Object(self.inner.settings.dump());
        let new = Value::Object(next.dump());
        self.inner.settings.replace(next);
        if old == new {
            return Ok(false);
        }
        self.inner
            .record
            .notify(&Change::new(SETTINGS_FIELD, old, new))?;
        Ok(true)
    }

    /// The nested settings record. Its assignments sync like the cell's own.
    pub fn settings(&self) -> &ObservableRecord<Settings> {
        &self.inner.settings
    }

    /// Registers an external observer. `Fields::All` covers every declared
    /// field plus `settings`.
    pub fn observe<F>(&self, callback: F, fields: impl Into<Fields>) -> Observer
    where
        F: Fn(&Change) -> anyhow::Result<()> + 'static,
    {
        let names = fields.into().resolve(|| {
            let mut names = self.inner.record.field_names();
            names.push(SETTINGS_FIELD.to_string());
            names
        });
        let observer = Observer::external(names, callback);
        self.inner.record.register(&observer);
        observer
    }

    /// Removes `observer` from the cell and its settings.
    pub fn remove_observer(&self, observer: &Observer) -> bool {
        let from_record = self.inner.record.remove_observer(observer);
        let from_settings = self.inner.settings.remove_observer(observer);
        from_record || from_settings
    }

    pub fn observers(&self) -> ObserverRegistry {
        self.inner.record.observers()
    }

    pub fn settings_observers(&self) -> ObserverRegistry {
        self.inner.settings.observers()
    }

    pub(crate) fn record(&self) -> &ObservableRecord<CellModel> {
        &self.inner.record
    }

    pub fn comm(&self) -> &SharedChannel {
        &self.inner.comm
    }

    pub fn ptr_eq(&self, other: &FormCell) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Sends the full current state to the frontend.
    pub fn sync_sidecar(&self) -> Result<(), ChannelError> {
        self.inner
            .comm
            .send(Some(UPDATE_FORM_CELL), Value::Object(self.dump()))
    }

    /// Binds the current value under `value_variable_name`.
    pub fn publish_value(&self) -> Result<(), NamespaceError> {
        let Some(namespace) = self.inner.namespace.upgrade() else {
            tracing::warn!(id = %self.id(), "host namespace dropped; value not published");
            return Ok(());
        };
        let (name, value) = self.value_binding();
        namespace.set(&name, value)
    }

    /// `(value_variable_name, value)` as it would be published.
    pub(crate) fn value_binding(&self) -> (String, KernelValue) {
        self.inner
            .record
            .with(|m| (m.value_variable_name.clone(), m.value.to_kernel_value()))
    }

    /// Asks the frontend to render this cell as a form and returns its text form.
    pub fn display(&self) -> Result<String, ChannelError> {
        self.inner
            .comm
            .send(Some(DISPLAY_FORM_CELL), Value::Object(self.dump()))?;
        Ok(self.to_string())
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

impl fmt::Display for FormCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let input_type = self.input_type();
        if input_type == InputType::Custom {
            f.write_str(&title_case(&self.model_variable_name()))?;
        }
        let props = self
            .dump()
            .into_iter()
            .filter(|(key, _)| key != "id")
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "<{} {}>", input_type.variant_name(), props)
    }
}

impl fmt::Debug for FormCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormCell")
            .field("model", &self.snapshot())
            .field("settings", &self.inner.settings.snapshot())
            .finish_non_exhaustive()
    }
}
