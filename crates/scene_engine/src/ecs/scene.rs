//! Scenes: ordered, observable containers of entities.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::ecs::entity::Entity;
use crate::ecs::observer::{CollectionObserver, ListChange, Subscribers, SubscriptionId};

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);

/// Unique scene identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

/// An ordered, observable container of entities.
///
/// Cloning the handle shares the scene; equality follows identity. Every
/// structural edit synchronously notifies subscribed observers before the
/// edit call returns. The container does not prevent an entity from being
/// placed in more than one scene; single-scene membership is a convention of
/// the surrounding application.
#[derive(Clone)]
pub struct Scene {
    inner: Arc<SceneInner>,
}

struct SceneInner {
    id: SceneId,
    entities: Mutex<Vec<Entity>>,
    subscribers: Subscribers<Entity>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SceneInner {
                id: SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed)),
                entities: Mutex::new(Vec::new()),
                subscribers: Subscribers::new(),
            }),
        }
    }

    /// Scene identity.
    pub fn id(&self) -> SceneId {
        self.inner.id
    }

    /// Append an entity.
    pub fn add(&self, entity: Entity) {
        let index = {
            let mut entities = self.inner.entities.lock().unwrap();
            entities.push(entity.clone());
            entities.len() - 1
        };
        self.inner.subscribers.notify(&ListChange::Added {
            index,
            item: entity,
        });
    }

    /// Insert an entity at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is greater than the current length.
    pub fn insert(&self, index: usize, entity: Entity) {
        {
            let mut entities = self.inner.entities.lock().unwrap();
            entities.insert(index, entity.clone());
        }
        self.inner.subscribers.notify(&ListChange::Added {
            index,
            item: entity,
        });
    }

    /// Remove an entity by identity. Returns whether it was present.
    pub fn remove(&self, entity: &Entity) -> bool {
        let index = {
            let mut entities = self.inner.entities.lock().unwrap();
            let Some(index) = entities.iter().position(|e| e == entity) else {
                return false;
            };
            entities.remove(index);
            index
        };
        self.inner.subscribers.notify(&ListChange::Removed {
            index,
            item: entity.clone(),
        });
        true
    }

    /// Exchange the entity at `index` for another. Returns the replaced
    /// entity.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn replace(&self, index: usize, entity: Entity) -> Entity {
        let old = {
            let mut entities = self.inner.entities.lock().unwrap();
            std::mem::replace(&mut entities[index], entity.clone())
        };
        self.inner.subscribers.notify(&ListChange::Replaced {
            index,
            old: old.clone(),
            new: entity,
        });
        old
    }

    /// Move the entity at `from` to position `to`. Membership is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn move_entity(&self, from: usize, to: usize) {
        let item = {
            let mut entities = self.inner.entities.lock().unwrap();
            let entity = entities.remove(from);
            entities.insert(to, entity.clone());
            entity
        };
        self.inner
            .subscribers
            .notify(&ListChange::Moved { from, to, item });
    }

    /// Remove every entity, delivering a single reset event carrying the
    /// previous membership snapshot.
    pub fn clear(&self) {
        let removed = {
            let mut entities = self.inner.entities.lock().unwrap();
            std::mem::take(&mut *entities)
        };
        if removed.is_empty() {
            return;
        }
        self.inner.subscribers.notify(&ListChange::Reset { removed });
    }

    /// Snapshot of the entities in index order.
    pub fn entities(&self) -> Vec<Entity> {
        self.inner.entities.lock().unwrap().clone()
    }

    /// Number of entities in the scene.
    pub fn len(&self) -> usize {
        self.inner.entities.lock().unwrap().len()
    }

    /// Whether the scene holds no entities.
    pub fn is_empty(&self) -> bool {
        self.inner.entities.lock().unwrap().is_empty()
    }

    /// Subscribe to entity-list changes.
    pub fn subscribe(&self, observer: Arc<dyn CollectionObserver<Entity>>) -> SubscriptionId {
        self.inner.subscribers.subscribe(observer)
    }

    /// Remove a previously registered subscription.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.subscribers.unsubscribe(id)
    }
}

impl PartialEq for Scene {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Scene {}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.inner.id)
            .field("entities", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

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

    impl CollectionObserver<Entity> for Recorder {
        fn changed(&self, change: &ListChange<Entity>) {
            let tag = match change {
                ListChange::Added { index, .. } => format!("add@{index}"),
                ListChange::Removed { index, .. } => format!("remove@{index}"),
                ListChange::Replaced { index, .. } => format!("replace@{index}"),
                ListChange::Moved { from, to, .. } => format!("move {from}->{to}"),
                ListChange::Reset { removed } => format!("reset {}", removed.len()),
            };
            self.events.lock().unwrap().push(tag);
        }
    }

    #[test]
    fn test_add_and_remove_notify_in_index_order() {
        let scene = Scene::new();
        let recorder = Recorder::new();
        scene.subscribe(recorder.clone());

        let a = Entity::new();
        let b = Entity::new();
        scene.add(a.clone());
        scene.add(b.clone());
        assert!(scene.remove(&a));
        assert!(!scene.remove(&a));

        assert_eq!(recorder.events(), vec!["add@0", "add@1", "remove@0"]);
        assert_eq!(scene.entities(), vec![b]);
    }

    #[test]
    fn test_move_keeps_membership() {
        let scene = Scene::new();
        let recorder = Recorder::new();
        let a = Entity::new();
        let b = Entity::new();
        scene.add(a.clone());
        scene.add(b.clone());
        scene.subscribe(recorder.clone());

        scene.move_entity(0, 1);

        assert_eq!(recorder.events(), vec!["move 0->1"]);
        assert_eq!(scene.entities(), vec![b, a]);
    }

    #[test]
    fn test_clear_emits_reset_snapshot() {
        let scene = Scene::new();
        let recorder = Recorder::new();
        scene.add(Entity::new());
        scene.add(Entity::new());
        scene.subscribe(recorder.clone());

        scene.clear();
        scene.clear();

        assert_eq!(recorder.events(), vec!["reset 2"]);
        assert!(scene.is_empty());
    }

    #[test]
    fn test_scene_identity() {
        let scene = Scene::new();
        let alias = scene.clone();
        assert_eq!(scene, alias);
        assert_ne!(scene, Scene::new());
    }
}
