//! Handler names stamped on outbound envelopes.

pub const GET_KERNEL_VARIABLES: &str = "get_kernel_variables";
pub const RENAME_KERNEL_VARIABLE: &str = "rename_kernel_variable";
pub const CREATE_FORM_CELL: &str = "create_form_cell";
pub const UPDATE_FORM_CELL: &str = "update_form_cell";
pub const DELETE_FORM_CELL: &str = "delete_form_cell";
pub const DISPLAY_FORM_CELL: &str = "display_form_cell";
pub const ERROR: &str = "error";

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";
pub const STATUS_CONNECTED: &str = "connected";
pub const STATUS_RECEIVED: &str = "received";
