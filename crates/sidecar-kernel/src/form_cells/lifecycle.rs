use serde_json::{Map, Value};

use super::cell::{FormCell, PendingCell};
use super::context::CellContext;
use super::merge::merge_update;
use super::parse::ParsedFormCell;
use crate::error::{FormCellError, NamespaceError};
use crate::namespace::HostNamespace;
use crate::value::KernelValue;

/// Validates `payload` and wires the result into a live, registered cell
/// whose value is published.
pub fn parse_as_form_cell(
    ctx: &CellContext,
    payload: Map<String, Value>,
) -> Result<FormCell, FormCellError> {
    let parsed = ParsedFormCell::from_payload(payload)?;
    let pending = FormCell::build(parsed, ctx)?;
    commit(ctx, pending, Commit::ValueOnly)
}

/// [`parse_as_form_cell`] plus binding the cell under its model variable.
pub fn create_form_cell(
    ctx: &CellContext,
    payload: Map<String, Value>,
) -> Result<FormCell, FormCellError> {
    let parsed = ParsedFormCell::from_payload(payload)?;
    let pending = FormCell::build(parsed, ctx)?;
    let cell = commit(ctx, pending, Commit::Bind)?;
    tracing::info!(
        id = %cell.id(),
        input_type = cell.input_type().as_str(),
        model_variable_name = %cell.model_variable_name(),
        "created form cell"
    );
    Ok(cell)
}

/// Reconciles a partial update into a new cell with the same id.
///
/// Either every step succeeds and the new cell replaces the old one in the
/// registry and namespace, or the old cell stays live and unchanged.
/// External observers move to the new cell; builtin ones are recreated for it.
pub fn update_form_cell(
    ctx: &CellContext,
    cell: &FormCell,
    update: Map<String, Value>,
) -> Result<FormCell, FormCellError> {
    let merged = merge_update(&cell.dump(), &update)?;
    let parsed = ParsedFormCell::from_payload(merged)?;
    let keys = update.keys().collect::<Vec<_>>();
    tracing::debug!(id = %cell.id(), ?keys, "reconciling form cell");

    let pending = FormCell::build(parsed, ctx)?;
    copy_custom_observers(cell, &pending.cell);
    commit(ctx, pending, Commit::Replace(cell))
}

enum Commit<'a> {
    /// Publish the value only.
    ValueOnly,
    /// Also bind the model variable.
    Bind,
    /// Bind, and unbind the replaced cell's model variable if it moved.
    Replace(&'a FormCell),
}

/// Publishes and binds `pending`, then registers it. Namespace writes are
/// undone if any step fails; the registry is only touched on success.
fn commit(
    ctx: &CellContext,
    pending: PendingCell,
    mode: Commit<'_>,
) -> Result<FormCell, FormCellError> {
    let mut journal = Journal::new(&*ctx.namespace);
    if let Err(err) = stage(&mut journal, &pending, &mode) {
        journal.rollback();
        return Err(err);
    }
    ctx.registry.insert(pending.cell.clone());
    Ok(pending.cell)
}

fn stage(
    journal: &mut Journal<'_>,
    pending: &PendingCell,
    mode: &Commit<'_>,
) -> Result<(), FormCellError> {
    let cell = &pending.cell;
    let (value_name, value) = cell.value_binding();
    journal.set(&value_name, value)?;

    if !matches!(mode, Commit::ValueOnly) {
        let name = cell.model_variable_name();
        if !name.is_empty() {
            journal.set(&name, KernelValue::FormCell(cell.clone()))?;
        }
        if let Commit::Replace(old) = mode {
            let old_name = old.model_variable_name();
            let still_bound = old_name != name
                && !old_name.is_empty()
                && journal
                    .get(&old_name)
                    .is_some_and(|bound| bound == KernelValue::FormCell((*old).clone()));
            if still_bound {
                journal.delete(&old_name)?;
            }
        }
    }

    // the defaulted name is a change the frontend has not seen yet
    if pending.defaulted_value_name {
        cell.sync_sidecar()?;
    }
    Ok(())
}

/// Namespace writes made during a commit, in order, with what they replaced.
struct Journal<'a> {
    namespace: &'a dyn HostNamespace,
    undo: Vec<(String, Option<KernelValue>)>,
}

impl<'a> Journal<'a> {
    fn new(namespace: &'a dyn HostNamespace) -> Self {
        Self {
            namespace,
            undo: Vec::new(),
        }
    }

    fn get(&self, name: &str) -> Option<KernelValue> {
        self.namespace.get(name)
    }

    fn set(&mut self, name: &str, value: KernelValue) -> Result<(), NamespaceError> {
        let previous = self.namespace.get(name);
        self.namespace.set(name, value)?;
        self.undo.push((name.to_string(), previous));
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), NamespaceError> {
        let previous = self.namespace.delete(name)?;
        self.undo.push((name.to_string(), Some(previous)));
        Ok(())
    }

    fn rollback(self) {
        for (name, previous) in self.undo.into_iter().rev() {
            let restored = match previous {
                Some(value) => self.namespace.set(&name, value),
                None => self.namespace.delete(&name).map(drop),
            };
            if let Err(err) = restored {
                tracing::warn!(%name, %err, "could not restore namespace binding");
            }
        }
    }
}

pub fn update_form_cell_by_id(
    ctx: &CellContext,
    id: &str,
    update: Map<String, Value>,
) -> Result<FormCell, FormCellError> {
    let cell = ctx
        .registry
        .get(id)
        .ok_or_else(|| FormCellError::NotFound(id.to_string()))?;
    update_form_cell(ctx, &cell, update)
}

/// Re-registers every non-builtin observer of `from` on `to`, per field.
pub fn copy_custom_observers(from: &FormCell, to: &FormCell) {
    for (field, observer) in from.observers().iter() {
        if !observer.is_builtin() {
            to.record().attach(field, observer.clone());
        }
    }
    for (field, observer) in from.settings_observers().iter() {
        if !observer.is_builtin() {
            to.settings().attach(field, observer.clone());
        }
    }
}

/// Removes the cell bound to `variable_name` from the namespace and the
/// registry. Falls back to a registry lookup when the name is bound to
/// something else or nothing at all.
pub fn delete_form_cell(
    ctx: &CellContext,
    variable_name: &str,
) -> Result<FormCell, FormCellError> {
    let bound = ctx
        .namespace
        .get(variable_name)
        .and_then(|value| value.as_form_cell().cloned());
    let cell = match bound {
        Some(cell) => {
            ctx.namespace.delete(variable_name)?;
            cell
        }
        None => ctx
            .registry
            .find_by_model_variable(variable_name)
            .ok_or_else(|| FormCellError::NotAFormCell(variable_name.to_string()))?,
    };
    ctx.registry.remove(&cell.id());
    tracing::info!(id = %cell.id(), variable_name, "deleted form cell");
    Ok(cell)
}

/// Publishes the cell's value under `name`, then points its value variable
/// there. A name the namespace rejects leaves the cell as it was.
pub fn assign_value_variable(
    ctx: &CellContext,
    id: &str,
    name: &str,
) -> Result<FormCell, FormCellError> {
    let cell = ctx
        .registry
        .get(id)
        .ok_or_else(|| FormCellError::NotFound(id.to_string()))?;
    ctx.namespace.set(name, cell.value().to_kernel_value())?;
    cell.set("value_variable_name", Value::String(name.to_string()))?;
    Ok(cell)
}
