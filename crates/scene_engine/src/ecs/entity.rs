//! Entities: identity-bearing containers of components.

use std::any::TypeId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::ecs::component::{Component, ComponentRef};
use crate::ecs::observer::{CollectionObserver, ListChange, Subscribers, SubscriptionId};

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Unique entity identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

/// An identity-bearing, observable container of components.
///
/// Cloning the handle shares the entity; equality and hashing follow
/// identity, not component values. Every structural edit synchronously
/// notifies subscribed observers before the edit call returns.
///
/// The container does not guard against concurrent edits of the same entity
/// from multiple threads; callers needing that must synchronize externally.
#[derive(Clone)]
pub struct Entity {
    inner: Arc<EntityInner>,
}

pub(crate) struct EntityInner {
    id: EntityId,
    components: Mutex<Vec<ComponentRef>>,
    subscribers: Subscribers<ComponentRef>,
}

impl EntityInner {
    pub(crate) fn id(&self) -> EntityId {
        self.id
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::new()
    }
}

impl Entity {
    /// Create an empty entity with a fresh identity.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EntityInner {
                id: EntityId(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed)),
                components: Mutex::new(Vec::new()),
                subscribers: Subscribers::new(),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<EntityInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> &Arc<EntityInner> {
        &self.inner
    }

    /// Entity identity.
    pub fn id(&self) -> EntityId {
        self.inner.id
    }

    /// Attach a new component holding `data` and return its handle.
    pub fn add<T: Component>(&self, data: T) -> ComponentRef {
        let component = ComponentRef::new(data);
        self.add_ref(component.clone());
        component
    }

    /// Attach an existing component slot to this entity.
    ///
    /// # Panics
    ///
    /// Panics if the component is already attached to a live entity.
    pub fn add_ref(&self, component: ComponentRef) {
        component.attach(self);
        let index = {
            let mut components = self.inner.components.lock().unwrap();
            components.push(component.clone());
            components.len() - 1
        };
        self.inner.subscribers.notify(&ListChange::Added {
            index,
            item: component,
        });
    }

    /// Detach a component by identity. Returns whether it was present.
    ///
    /// The removal event is delivered while the component still carries its
    /// owning-entity back-reference; the back-reference is cleared afterwards.
    pub fn remove(&self, component: &ComponentRef) -> bool {
        let index = {
            let mut components = self.inner.components.lock().unwrap();
            let Some(index) = components.iter().position(|c| c == component) else {
                return false;
            };
            components.remove(index);
            index
        };
        self.inner.subscribers.notify(&ListChange::Removed {
            index,
            item: component.clone(),
        });
        component.detach();
        true
    }

    /// Exchange the component at `index` for a new one holding `data`.
    /// Returns the replaced component.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn replace<T: Component>(&self, index: usize, data: T) -> ComponentRef {
        let new = ComponentRef::new(data);
        new.attach(self);
        let old = {
            let mut components = self.inner.components.lock().unwrap();
            std::mem::replace(&mut components[index], new.clone())
        };
        self.inner.subscribers.notify(&ListChange::Replaced {
            index,
            old: old.clone(),
            new,
        });
        old.detach();
        old
    }

    /// Detach every component, delivering a single reset event carrying the
    /// previous membership snapshot.
    pub fn clear(&self) {
        let removed = {
            let mut components = self.inner.components.lock().unwrap();
            std::mem::take(&mut *components)
        };
        if removed.is_empty() {
            return;
        }
        self.inner.subscribers.notify(&ListChange::Reset {
            removed: removed.clone(),
        });
        for component in removed {
            component.detach();
        }
    }

    /// First attached component whose data is of type `T`.
    pub fn get<T: Component>(&self) -> Option<ComponentRef> {
        self.inner
            .components
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.component_type() == TypeId::of::<T>())
            .cloned()
    }

    /// Snapshot of the attached components in index order.
    pub fn components(&self) -> Vec<ComponentRef> {
        self.inner.components.lock().unwrap().clone()
    }

    /// Number of attached components.
    pub fn len(&self) -> usize {
        self.inner.components.lock().unwrap().len()
    }

    /// Whether no components are attached.
    pub fn is_empty(&self) -> bool {
        self.inner.components.lock().unwrap().is_empty()
    }

    /// Subscribe to component-list changes.
    pub fn subscribe(
        &self,
        observer: Arc<dyn CollectionObserver<ComponentRef>>,
    ) -> SubscriptionId {
        self.inner.subscribers.subscribe(observer)
    }

    /// Remove a previously registered subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.subscribers.unsubscribe(id)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Entity {}

impl std::hash::Hash for Entity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.inner.id)
            .field("components", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    struct Tag(&'static str);

    impl Component for Tag {}

    struct Marker;

    impl Component for Marker {}

    struct Recorder {
        events: StdMutex<Vec<String>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: StdMutex::new(Vec::new()),
            })
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl CollectionObserver<ComponentRef> for Recorder {
        fn changed(&self, change: &ListChange<ComponentRef>) {
            let tag = match change {
                ListChange::Added { item, .. } => format!("add {}", item.type_name()),
                ListChange::Removed { item, .. } => format!("remove {}", item.type_name()),
                ListChange::Replaced { .. } => "replace".to_string(),
                ListChange::Moved { .. } => "move".to_string(),
                ListChange::Reset { removed } => format!("reset {}", removed.len()),
            };
            self.events.lock().unwrap().push(tag);
        }
    }

    #[test]
    fn test_new_entities_have_distinct_ids() {
        assert_ne!(Entity::new().id(), Entity::new().id());
    }

    #[test]
    fn test_add_sets_back_reference_and_notifies() {
        let entity = Entity::new();
        let recorder = Recorder::new();
        entity.subscribe(recorder.clone());

        let component = entity.add(Tag("player"));

        assert_eq!(component.entity().unwrap(), entity);
        assert_eq!(entity.len(), 1);
        assert_eq!(recorder.events().len(), 1);
    }

    #[test]
    fn test_remove_clears_back_reference_after_event() {
        let entity = Entity::new();
        let component = entity.add(Marker);

        assert!(entity.remove(&component));
        assert!(component.entity().is_none());
        assert!(entity.is_empty());

        // Removing again is a no-op.
        assert!(!entity.remove(&component));
    }

    #[test]
    fn test_get_finds_first_of_type() {
        let entity = Entity::new();
        let first = entity.add(Tag("a"));
        entity.add(Tag("b"));
        entity.add(Marker);

        assert_eq!(entity.get::<Tag>().unwrap(), first);
        assert!(entity.get::<Marker>().is_some());
    }

    #[test]
    fn test_replace_emits_single_replaced_event() {
        let entity = Entity::new();
        let recorder = Recorder::new();
        let old = entity.add(Tag("old"));
        entity.subscribe(recorder.clone());

        let returned = entity.replace(0, Tag("new"));

        assert_eq!(returned, old);
        assert!(old.entity().is_none());
        assert_eq!(recorder.events(), vec!["replace"]);
        assert_eq!(entity.len(), 1);
    }

    #[test]
    fn test_clear_delivers_reset_with_snapshot() {
        let entity = Entity::new();
        let recorder = Recorder::new();
        entity.add(Tag("a"));
        entity.add(Marker);
        entity.subscribe(recorder.clone());

        entity.clear();

        assert_eq!(recorder.events(), vec!["reset 2"]);
        assert!(entity.is_empty());

        // Clearing an empty entity emits nothing.
        entity.clear();
        assert_eq!(recorder.events().len(), 1);
    }
}
