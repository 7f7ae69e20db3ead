use indexmap::IndexMap;

use crate::observer::Observer;

/// Per-record mapping from field name to observers, in registration order.
///
/// The same [`Observer`] may be listed under several fields.
#[derive(Debug, Clone, Default)]
pub struct ObserverRegistry {
    by_field: IndexMap<String, Vec<Observer>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, field: &str, observer: Observer) {
        self.by_field
            .entry(field.to_string())
            .or_default()
            .push(observer);
    }

    /// Observers registered for `field`, cloned so callers can invoke them
    /// without holding a borrow on the registry.
    pub fn for_field(&self, field: &str) -> Vec<Observer> {
        self.by_field.get(field).cloned().unwrap_or_default()
    }

    /// Removes `observer` from every field list. Returns whether anything was removed.
    pub fn remove(&mut self, observer: &Observer) -> bool {
        let mut removed = false;
        for list in self.by_field.values_mut() {
            let before = list.len();
            list.retain(|o| o != observer);
            removed |= list.len() != before;
        }
        removed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Observer)> + '_ {
        self.by_field
            .iter()
            .flat_map(|(field, list)| list.iter().map(move |o| (field.as_str(), o)))
    }

    /// Total number of (field, observer) registrations.
    pub fn len(&self) -> usize {
        self.by_field.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, field: &str, observer: &Observer) -> bool {
        self.by_field
            .get(field)
            .is_some_and(|list| list.contains(observer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(fields: &[&str]) -> Observer {
        Observer::external(fields.iter().map(|f| f.to_string()).collect(), |_| Ok(()))
    }

    #[test]
    fn remove_drops_observer_from_every_field() {
        let mut registry = ObserverRegistry::new();
        let shared = noop(&["a", "b"]);
        let other = noop(&["a"]);
        registry.attach("a", shared.clone());
        registry.attach("b", shared.clone());
        registry.attach("a", other.clone());
        assert_eq!(registry.len(), 3);

        assert!(registry.remove(&shared));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("a", &other));
        assert!(!registry.contains("b", &shared));
        assert!(!registry.remove(&shared));
    }

    #[test]
    fn for_field_preserves_registration_order() {
        let mut registry = ObserverRegistry::new();
        let first = noop(&["x"]);
        let second = noop(&["x"]);
        registry.attach("x", first.clone());
        registry.attach("x", second.clone());
        assert_eq!(registry.for_field("x"), vec![first, second]);
        assert!(registry.for_field("missing").is_empty());
    }
}
