use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::channel::{Channel, ChannelError, CommOpener, SharedChannel};
use crate::mem::MemChannel;

type ChannelFactory<C> = Box<dyn Fn(&str, &str) -> Result<C, ChannelError>>;

/// Opens comms through a factory and keeps one per target name.
pub struct CommManager<C> {
    factory: ChannelFactory<C>,
    comms: RefCell<IndexMap<String, Rc<C>>>,
}

impl<C: Channel + 'static> CommManager<C> {
    /// `factory` receives a fresh comm id and the target name.
    pub fn new(factory: impl Fn(&str, &str) -> Result<C, ChannelError> + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            comms: RefCell::new(IndexMap::new()),
        }
    }

    pub fn get(&self, target_name: &str) -> Option<Rc<C>> {
        self.comms.borrow().get(target_name).cloned()
    }

    pub fn targets(&self) -> Vec<String> {
        self.comms.borrow().keys().cloned().collect()
    }

    pub fn close(&self, target_name: &str) -> Option<Rc<C>> {
        self.comms.borrow_mut().shift_remove(target_name)
    }

    fn open(&self, target_name: &str) -> Result<Rc<C>, ChannelError> {
        if let Some(existing) = self.get(target_name) {
            return Ok(existing);
        }
        let comm_id = uuid::Uuid::new_v4().to_string();
        let channel = Rc::new((self.factory)(&comm_id, target_name)?);
        self.comms
            .borrow_mut()
            .insert(target_name.to_string(), channel.clone());
        Ok(channel)
    }
}

impl CommManager<MemChannel> {
    pub fn in_memory() -> Self {
        Self::new(|comm_id, target_name| Ok(MemChannel::with_comm_id(comm_id, target_name)))
    }
}

impl<C: Channel + 'static> CommOpener for CommManager<C> {
    fn open_comm(&self, target_name: &str) -> Result<SharedChannel, ChannelError> {
        let channel: SharedChannel = self.open(target_name)?;
        Ok(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reuses_comm_per_target() {
        let comms = CommManager::in_memory();
        let a = comms.open_comm("form_cells").unwrap();
        let b = comms.open_comm("form_cells").unwrap();
        let other = comms.open_comm("kernel_status").unwrap();
        assert_eq!(a.comm_id(), b.comm_id());
        assert_ne!(a.comm_id(), other.comm_id());
        assert_eq!(comms.targets(), vec!["form_cells", "kernel_status"]);

        a.send(Some("update_form_cell"), json!({"id": "1"})).unwrap();
        let sent = comms.get("form_cells").unwrap().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].target_name.as_deref(), Some("form_cells"));
        assert_eq!(sent[0].handler.as_deref(), Some("update_form_cell"));
    }

    #[test]
    fn close_forgets_the_comm() {
        let comms = CommManager::in_memory();
        let first = comms.open_comm("t").unwrap();
        assert!(comms.close("t").is_some());
        let second = comms.open_comm("t").unwrap();
        assert_ne!(first.comm_id(), second.comm_id());
    }
}
