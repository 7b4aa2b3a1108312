//! Ordered registry of live system instances.

use std::any::TypeId;

use crate::ecs::system::{EntitySystem, SystemOrder};

/// Unique identifier of a registered system instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemId(u64);

pub(crate) struct SystemEntry {
    id: SystemId,
    type_id: TypeId,
    type_name: &'static str,
    system: Box<dyn EntitySystem>,
}

impl SystemEntry {
    pub(crate) fn id(&self) -> SystemId {
        self.id
    }

    pub(crate) fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn system_mut(&mut self) -> &mut dyn EntitySystem {
        self.system.as_mut()
    }
}

/// Ordered sequence of systems, unique by instance.
///
/// Membership changes re-sort the sequence by each system's declared
/// [`SystemOrder`]; the sort is stable, so systems with equal orders keep
/// their insertion order. `update`/`draw` traversal always follows this
/// order.
#[derive(Default)]
pub struct SystemRegistry {
    entries: Vec<SystemEntry>,
    next_id: u64,
}

impl SystemRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a system instance under its concrete type.
    pub fn insert_system<S: EntitySystem + 'static>(&mut self, system: S) -> SystemId {
        self.insert(
            TypeId::of::<S>(),
            std::any::type_name::<S>(),
            Box::new(system),
        )
    }

    /// Register an already-boxed system under an explicit type identity, then
    /// re-sort the registry by declared order.
    pub fn insert(
        &mut self,
        type_id: TypeId,
        type_name: &'static str,
        system: Box<dyn EntitySystem>,
    ) -> SystemId {
        self.next_id += 1;
        let id = SystemId(self.next_id);
        self.entries.push(SystemEntry {
            id,
            type_id,
            type_name,
            system,
        });
        self.entries.sort_by_key(|entry| entry.system.order());
        id
    }

    /// Whether a system of the given concrete type is registered.
    pub fn contains_type(&self, type_id: TypeId) -> bool {
        self.entries.iter().any(|entry| entry.type_id == type_id)
    }

    /// Number of registered systems.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Type names of the registered systems in sweep order.
    pub fn type_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.type_name).collect()
    }

    pub(crate) fn get_mut(&mut self, id: SystemId) -> Option<&mut SystemEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut SystemEntry> {
        self.entries.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::component::ComponentRef;

    struct Ordered {
        order: i32,
    }

    impl EntitySystem for Ordered {
        fn order(&self) -> SystemOrder {
            SystemOrder(self.order)
        }

        fn accepts(&self, _component_type: TypeId) -> bool {
            false
        }

        fn process(&mut self, _component: &ComponentRef, _removal: bool) {}
    }

    struct Other;

    impl EntitySystem for Other {
        fn accepts(&self, _component_type: TypeId) -> bool {
            false
        }

        fn process(&mut self, _component: &ComponentRef, _removal: bool) {}
    }

    #[test]
    fn test_insertions_keep_global_sort_order() {
        let mut registry = SystemRegistry::new();
        registry.insert(TypeId::of::<()>(), "thirty", Box::new(Ordered { order: 30 }));
        registry.insert(TypeId::of::<u8>(), "ten", Box::new(Ordered { order: 10 }));
        registry.insert(TypeId::of::<u16>(), "twenty", Box::new(Ordered { order: 20 }));

        assert_eq!(registry.type_names(), vec!["ten", "twenty", "thirty"]);
    }

    #[test]
    fn test_equal_orders_keep_insertion_order() {
        let mut registry = SystemRegistry::new();
        registry.insert(TypeId::of::<u8>(), "first", Box::new(Ordered { order: 5 }));
        registry.insert(TypeId::of::<u16>(), "second", Box::new(Ordered { order: 5 }));

        assert_eq!(registry.type_names(), vec!["first", "second"]);
    }

    #[test]
    fn test_contains_type_follows_registration() {
        let mut registry = SystemRegistry::new();
        assert!(!registry.contains_type(TypeId::of::<Other>()));

        registry.insert_system(Other);

        assert!(registry.contains_type(TypeId::of::<Other>()));
        assert_eq!(registry.len(), 1);
    }
}
