//! Form cells: observable records backing interactive inputs in the notebook.
//!
//! A cell is created from an untyped payload (`parse_as_form_cell`), kept in a
//! [`FormCellRegistry`] under its id, mirrored into the host namespace, and
//! rebuilt in place when the frontend sends a partial update
//! (`update_form_cell`).

mod cell;
mod context;
pub mod datetime;
mod lifecycle;
mod merge;
mod model;
mod parse;
mod registry;
mod settings;

pub use cell::{FormCell, SETTINGS_FIELD, SYNC_OBSERVER, VALUE_OBSERVER};
pub use context::{CellContext, DEFAULT_FORM_CELL_TARGET, InMemoryContext};
pub use lifecycle::{
    assign_value_variable, copy_custom_observers, create_form_cell, delete_form_cell,
    parse_as_form_cell, update_form_cell, update_form_cell_by_id,
};
pub use merge::{MergeError, merge_update};
pub use model::{
    CellModel, CellValue, DropdownValue, ExecutionTriggerBehavior, InputType,
    valid_model_input_types,
};
pub use parse::ParsedFormCell;
pub use registry::FormCellRegistry;
pub use settings::{OptionsSettings, Settings, SliderSettings, TextSettings};
