use std::rc::Rc;

use sidecar_protocol::{CommManager, MemChannel, SharedCommOpener};

use super::registry::FormCellRegistry;
use crate::namespace::{MemNamespace, SharedNamespace};

pub const DEFAULT_FORM_CELL_TARGET: &str = "form_cells";

/// Collaborators a form cell is created against.
#[derive(Clone)]
pub struct CellContext {
    pub registry: FormCellRegistry,
    pub namespace: SharedNamespace,
    pub comms: SharedCommOpener,
    /// Comm target that cells sync over.
    pub target_name: String,
}

impl CellContext {
    pub fn new(namespace: SharedNamespace, comms: SharedCommOpener) -> Self {
        Self {
            registry: FormCellRegistry::new(),
            namespace,
            comms,
            target_name: DEFAULT_FORM_CELL_TARGET.to_string(),
        }
    }

    pub fn with_target(mut self, target_name: impl Into<String>) -> Self {
        self.target_name = target_name.into();
        self
    }

    pub fn with_registry(mut self, registry: FormCellRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// A context backed by an in-memory namespace and recording channels.
    pub fn in_memory() -> InMemoryContext {
        let namespace = Rc::new(MemNamespace::new());
        let comms = Rc::new(CommManager::in_memory());
        let ctx = CellContext::new(namespace.clone(), comms.clone());
        InMemoryContext {
            ctx,
            namespace,
            comms,
        }
    }
}

impl std::fmt::Debug for CellContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellContext")
            .field("registry", &self.registry)
            .field("target_name", &self.target_name)
            .finish_non_exhaustive()
    }
}

/// [`CellContext::in_memory`] with typed handles on the fakes.
pub struct InMemoryContext {
    pub ctx: CellContext,
    pub namespace: Rc<MemNamespace>,
    pub comms: Rc<CommManager<MemChannel>>,
}

impl InMemoryContext {
    /// The channel cells sync over, once one has been opened.
    pub fn channel(&self) -> Option<Rc<MemChannel>> {
        self.comms.get(&self.ctx.target_name)
    }
}
