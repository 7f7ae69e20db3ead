//! Kernel-side state: the host namespace contract and the form-cell model.

pub mod error;
pub mod form_cells;
pub mod namespace;
pub mod value;

pub use error::{FormCellError, NamespaceError};
pub use form_cells::{
    CellContext, CellModel, CellValue, DropdownValue, ExecutionTriggerBehavior, FormCell,
    FormCellRegistry, InputType, ParsedFormCell, Settings, create_form_cell, delete_form_cell,
    parse_as_form_cell, update_form_cell, valid_model_input_types,
};
pub use namespace::{HostNamespace, MemNamespace, SharedNamespace};
pub use value::KernelValue;
