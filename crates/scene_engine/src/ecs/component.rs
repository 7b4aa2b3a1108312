//! Component trait, typed component slots, and data access guards.

use std::any::{type_name, Any, TypeId};
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use crate::ecs::entity::{Entity, EntityInner};
use crate::ecs::system::SystemRecipe;

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a component slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId(u64);

/// A typed unit of data attached to exactly one entity.
///
/// The concrete type of a component determines which systems process it. A
/// component type may additionally declare the systems it expects to be
/// running via [`Component::default_systems`]; the dispatcher provisions any
/// declared system missing from its registry the first time the type is
/// activated.
pub trait Component: Any + Send + Sync {
    /// The systems this component type expects, declared per type and
    /// independent of any instance. Defaults to none.
    fn default_systems() -> Vec<SystemRecipe>
    where
        Self: Sized,
    {
        Vec::new()
    }
}

/// Shared handle to a component slot.
///
/// Cloning the handle shares the slot; equality and hashing follow slot
/// identity, not data value. The slot keeps a non-owning back-reference to
/// the entity it is attached to.
#[derive(Clone)]
pub struct ComponentRef {
    slot: Arc<ComponentSlot>,
}

struct ComponentSlot {
    id: ComponentId,
    type_id: TypeId,
    type_name: &'static str,
    default_systems: fn() -> Vec<SystemRecipe>,
    data: RwLock<Box<dyn Any + Send + Sync>>,
    owner: Mutex<Option<Weak<EntityInner>>>,
}

impl ComponentRef {
    /// Create a detached slot holding `data`.
    pub fn new<T: Component>(data: T) -> Self {
        Self {
            slot: Arc::new(ComponentSlot {
                id: ComponentId(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed)),
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                default_systems: T::default_systems,
                data: RwLock::new(Box::new(data)),
                owner: Mutex::new(None),
            }),
        }
    }

    /// Slot identity.
    pub fn id(&self) -> ComponentId {
        self.slot.id
    }

    /// `TypeId` of the stored component data.
    pub fn component_type(&self) -> TypeId {
        self.slot.type_id
    }

    /// Name of the stored component data type.
    pub fn type_name(&self) -> &'static str {
        self.slot.type_name
    }

    /// Whether the stored data is of type `T`.
    pub fn is<T: Component>(&self) -> bool {
        self.slot.type_id == TypeId::of::<T>()
    }

    /// Read the component data, or `None` if it is not of type `T`.
    pub fn read<T: Component>(&self) -> Option<ComponentRead<'_, T>> {
        let guard = self.slot.data.read().unwrap();
        if (**guard).is::<T>() {
            Some(ComponentRead {
                guard,
                _marker: PhantomData,
            })
        } else {
            None
        }
    }

    /// Write the component data, or `None` if it is not of type `T`.
    pub fn write<T: Component>(&self) -> Option<ComponentWrite<'_, T>> {
        let guard = self.slot.data.write().unwrap();
        if (**guard).is::<T>() {
            Some(ComponentWrite {
                guard,
                _marker: PhantomData,
            })
        } else {
            None
        }
    }

    /// The entity this component is attached to, if any.
    pub fn entity(&self) -> Option<Entity> {
        self.slot
            .owner
            .lock()
            .unwrap()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Entity::from_inner)
    }

    pub(crate) fn default_systems(&self) -> Vec<SystemRecipe> {
        (self.slot.default_systems)()
    }

    /// Record the owning entity.
    ///
    /// # Panics
    ///
    /// Panics if the component is already attached to a live entity.
    pub(crate) fn attach(&self, entity: &Entity) {
        let mut owner = self.slot.owner.lock().unwrap();
        if let Some(existing) = owner.as_ref().and_then(Weak::upgrade) {
            panic!(
                "component {} ({:?}) is already attached to entity {:?}",
                self.slot.type_name,
                self.slot.id,
                existing.id()
            );
        }
        *owner = Some(Arc::downgrade(entity.inner()));
    }

    /// Clear the owning-entity back-reference.
    pub(crate) fn detach(&self) {
        *self.slot.owner.lock().unwrap() = None;
    }
}

impl PartialEq for ComponentRef {
    fn eq(&self, other: &Self) -> bool {
        self.slot.id == other.slot.id
    }
}

impl Eq for ComponentRef {}

impl std::hash::Hash for ComponentRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.slot.id.hash(state);
    }
}

impl std::fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRef")
            .field("id", &self.slot.id)
            .field("type", &self.slot.type_name)
            .finish()
    }
}

/// Shared read guard over component data of type `T`.
pub struct ComponentRead<'a, T> {
    guard: RwLockReadGuard<'a, Box<dyn Any + Send + Sync>>,
    _marker: PhantomData<T>,
}

impl<T: Component> Deref for ComponentRead<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Type checked when the guard was acquired.
        (**self.guard).downcast_ref::<T>().unwrap()
    }
}

/// Exclusive write guard over component data of type `T`.
pub struct ComponentWrite<'a, T> {
    guard: RwLockWriteGuard<'a, Box<dyn Any + Send + Sync>>,
    _marker: PhantomData<T>,
}

impl<T: Component> Deref for ComponentWrite<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        (**self.guard).downcast_ref::<T>().unwrap()
    }
}

impl<T: Component> DerefMut for ComponentWrite<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        (**self.guard).downcast_mut::<T>().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health {
        points: i32,
    }

    impl Component for Health {}

    struct Armor;

    impl Component for Armor {}

    #[test]
    fn test_typed_read_and_write() {
        let component = ComponentRef::new(Health { points: 10 });

        assert!(component.is::<Health>());
        assert_eq!(component.read::<Health>().unwrap().points, 10);

        component.write::<Health>().unwrap().points = 25;
        assert_eq!(component.read::<Health>().unwrap().points, 25);
    }

    #[test]
    fn test_wrong_type_access_returns_none() {
        let component = ComponentRef::new(Health { points: 1 });
        assert!(!component.is::<Armor>());
        assert!(component.read::<Armor>().is_none());
        assert!(component.write::<Armor>().is_none());
    }

    #[test]
    fn test_detached_component_has_no_entity() {
        let component = ComponentRef::new(Armor);
        assert!(component.entity().is_none());
    }

    #[test]
    fn test_identity_equality_ignores_data() {
        let a = ComponentRef::new(Health { points: 5 });
        let b = ComponentRef::new(Health { points: 5 });
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn test_double_attach_panics() {
        let component = ComponentRef::new(Armor);
        let first = Entity::new();
        let second = Entity::new();
        component.attach(&first);
        component.attach(&second);
    }
}
