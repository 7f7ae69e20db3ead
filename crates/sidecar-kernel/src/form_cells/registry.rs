use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use super::cell::FormCell;

/// Live form cells keyed by id. Clones share the same table.
#[derive(Clone, Default)]
pub struct FormCellRegistry {
    cells: Rc<RefCell<IndexMap<String, FormCell>>>,
}

impl FormCellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `cell.id()`.
    pub fn insert(&self, cell: FormCell) -> Option<FormCell> {
        self.cells.borrow_mut().insert(cell.id(), cell)
    }

    pub fn get(&self, id: &str) -> Option<FormCell> {
        self.cells.borrow().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<FormCell> {
        self.cells.borrow_mut().shift_remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cells.borrow().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.cells.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.borrow().is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.cells.borrow().keys().cloned().collect()
    }

    pub fn find_by_model_variable(&self, name: &str) -> Option<FormCell> {
        self.cells
            .borrow()
            .values()
            .find(|cell| cell.model_variable_name() == name)
            .cloned()
    }
}

impl std::fmt::Debug for FormCellRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormCellRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}
