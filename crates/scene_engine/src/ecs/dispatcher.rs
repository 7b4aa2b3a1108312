//! The scene dispatcher: the orchestrator that watches structural change
//! events from the scene graph, keeps the component-type index and system
//! registry consistent, and runs the per-frame update/draw sweep.
//!
//! ## Concurrency
//!
//! The registry, the component-type index, and the tracked-entity set are
//! guarded by a single mutex owned by the dispatcher. One `update` or `draw`
//! sweep and one structural-mutation reaction (including provisioning and
//! registry re-sorting) each hold the guard for their entire duration, so a
//! frame sweep never observes a partially-applied mutation and vice versa.
//! Structural edits may therefore originate from any thread, typically from
//! asynchronous scene-load completions.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use log::{debug, info, trace};

use crate::assets::{ContentError, ContentManager};
use crate::config::SceneConfig;
use crate::ecs::component::ComponentRef;
use crate::ecs::entity::{Entity, EntityId};
use crate::ecs::observer::{CollectionObserver, ListChange, SubscriptionId};
use crate::ecs::registry::{SystemId, SystemRegistry};
use crate::ecs::scene::Scene;
use crate::ecs::system::EntitySystem;
use crate::services::Services;

/// Orchestrates a root scene, a registry of processing systems, and the
/// per-frame sweep over them.
///
/// Systems are registered either up front via
/// [`register_system`](Self::register_system) or lazily, the first time a
/// component type declaring them is activated. The registry exclusively owns
/// system instances from registration until [`dispose`](Self::dispose).
pub struct SceneDispatcher {
    shared: Arc<DispatcherShared>,
    config: SceneConfig,
}

struct DispatcherShared {
    services: Services,
    state: Mutex<DispatchState>,
}

struct DispatchState {
    registry: SystemRegistry,
    /// Memoized mapping from component type to the systems that accept it.
    /// The source of truth is always `EntitySystem::accepts`; entries are
    /// stored even when empty so later components of the type skip the scan.
    index: HashMap<TypeId, Vec<SystemId>>,
    tracked: HashMap<EntityId, TrackedEntity>,
    root: Option<Scene>,
    root_subscription: Option<SubscriptionId>,
    disposed: bool,
}

struct TrackedEntity {
    entity: Entity,
    subscription: SubscriptionId,
}

/// Adapter feeding a scene's entity-list changes into the dispatcher.
struct SceneEvents {
    shared: Weak<DispatcherShared>,
}

impl CollectionObserver<Entity> for SceneEvents {
    fn changed(&self, change: &ListChange<Entity>) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        match change {
            ListChange::Added { item, .. } => shared.entity_added(item),
            ListChange::Removed { item, .. } => shared.entity_removed(item),
            ListChange::Replaced { old, new, .. } => {
                shared.entity_removed(old);
                shared.entity_added(new);
            }
            ListChange::Reset { removed } => {
                for entity in removed {
                    shared.entity_removed(entity);
                }
            }
            // Membership unchanged; system assignment is order-independent.
            ListChange::Moved { .. } => {}
        }
    }
}

/// Adapter feeding an entity's component-list changes into the dispatcher.
struct ComponentEvents {
    shared: Weak<DispatcherShared>,
}

impl CollectionObserver<ComponentRef> for ComponentEvents {
    fn changed(&self, change: &ListChange<ComponentRef>) {
        let Some(shared) = self.shared.upgrade() else {
            return;
        };
        match change {
            ListChange::Added { item, .. } => shared.component_added(item),
            ListChange::Removed { item, .. } => shared.component_removed(item),
            ListChange::Replaced { old, new, .. } => {
                shared.component_removed(old);
                shared.component_added(new);
            }
            ListChange::Reset { removed } => {
                for component in removed {
                    shared.component_removed(component);
                }
            }
            ListChange::Moved { .. } => {}
        }
    }
}

impl SceneDispatcher {
    /// Create a dispatcher with default configuration.
    pub fn new(services: Services) -> Self {
        Self::with_config(services, SceneConfig::default())
    }

    /// Create a dispatcher with an explicit scene configuration.
    pub fn with_config(services: Services, config: SceneConfig) -> Self {
        Self {
            shared: Arc::new(DispatcherShared {
                services,
                state: Mutex::new(DispatchState {
                    registry: SystemRegistry::new(),
                    index: HashMap::new(),
                    tracked: HashMap::new(),
                    root: None,
                    root_subscription: None,
                    disposed: false,
                }),
            }),
            config,
        }
    }

    /// The service handle forwarded to provisioned systems.
    pub fn services(&self) -> &Services {
        &self.shared.services
    }

    /// Register a system up front, before any component type declares it.
    ///
    /// Component types already indexed are not re-matched against the new
    /// system; registration is intended for startup, before the scene graph
    /// is populated.
    pub fn register_system<S: EntitySystem + 'static>(&self, system: S) {
        let mut state = self.shared.state.lock().unwrap();
        state.registry.insert_system(system);
    }

    /// The current root scene, if any.
    pub fn root_scene(&self) -> Option<Scene> {
        self.shared.state.lock().unwrap().root.clone()
    }

    /// Replace the root scene.
    ///
    /// Assigning the current root again is a no-op. Otherwise the old root
    /// (if any) is unsubscribed and every entity beneath it deactivated
    /// before the new root is walked and activated. The new value becomes
    /// the root even if a panic escapes partway through the walk; activation
    /// and deactivation are idempotent, so there is no rollback.
    pub fn set_root_scene(&self, scene: Option<Scene>) {
        let mut state = self.shared.state.lock().unwrap();
        if state.root == scene {
            return;
        }

        if let Some(old) = state.root.take() {
            info!("detaching root scene {:?}", old.id());
            if let Some(subscription) = state.root_subscription.take() {
                old.unsubscribe(subscription);
            }
            for entity in old.entities() {
                self.shared.untrack_entity(&mut state, &entity);
            }
        }

        state.root = scene.clone();

        if let Some(new) = scene {
            info!("attaching root scene {:?}", new.id());
            for entity in new.entities() {
                self.shared.track_entity(&mut state, &entity);
            }
            state.root_subscription = Some(new.subscribe(Arc::new(SceneEvents {
                shared: Arc::downgrade(&self.shared),
            })));
        }
    }

    /// Resolve the configured startup scene, if any, and install it as root.
    ///
    /// Load failures propagate to the caller; nothing is retried.
    pub fn load_content(&self, content: &ContentManager) -> Result<(), ContentError> {
        if let Some(path) = &self.config.initial_scene_path {
            info!("loading initial scene `{path}`");
            let scene = content.load::<Scene>(path)?;
            self.set_root_scene(Some(Scene::clone(&scene)));
        }
        Ok(())
    }

    /// Notify the dispatcher that an entity joined the root scene.
    ///
    /// Normally driven by the root-scene subscription; exposed for hosts
    /// that manage scene membership themselves. Idempotent for entities
    /// already tracked.
    pub fn entity_added(&self, entity: &Entity) {
        self.shared.entity_added(entity);
    }

    /// Notify the dispatcher that an entity left the root scene. No-op for
    /// entities not currently tracked.
    pub fn entity_removed(&self, entity: &Entity) {
        self.shared.entity_removed(entity);
    }

    /// Notify the dispatcher that a component was activated.
    ///
    /// # Panics
    ///
    /// Panics if the component is not attached to an entity.
    pub fn component_added(&self, component: &ComponentRef) {
        self.shared.component_added(component);
    }

    /// Notify the dispatcher that a component was deactivated.
    ///
    /// # Panics
    ///
    /// Panics if the component is not attached to an entity.
    pub fn component_removed(&self, component: &ComponentRef) {
        self.shared.component_removed(component);
    }

    /// Run one update sweep over every system in registry order.
    pub fn update(&self, delta: Duration) {
        let mut state = self.shared.state.lock().unwrap();
        trace!("update sweep over {} systems", state.registry.len());
        for entry in state.registry.iter_mut() {
            entry.system_mut().update(delta);
        }
    }

    /// Run one draw sweep over every system in registry order.
    pub fn draw(&self, delta: Duration) {
        let mut state = self.shared.state.lock().unwrap();
        for entry in state.registry.iter_mut() {
            entry.system_mut().draw(delta);
        }
    }

    /// Dispose every system in the registry. Terminal: the registry is not
    /// cleared, and repeated calls are no-ops.
    pub fn dispose(&self) {
        let mut state = self.shared.state.lock().unwrap();
        if state.disposed {
            return;
        }
        state.disposed = true;
        info!("disposing {} systems", state.registry.len());
        for entry in state.registry.iter_mut() {
            entry.system_mut().dispose();
        }
    }

    /// Number of systems currently registered.
    pub fn system_count(&self) -> usize {
        self.shared.state.lock().unwrap().registry.len()
    }

    /// Type names of the registered systems in sweep order.
    pub fn system_names(&self) -> Vec<&'static str> {
        self.shared.state.lock().unwrap().registry.type_names()
    }

    /// Number of entities currently tracked beneath the root.
    pub fn entity_count(&self) -> usize {
        self.shared.state.lock().unwrap().tracked.len()
    }
}

impl DispatcherShared {
    fn entity_added(self: &Arc<Self>, entity: &Entity) {
        let mut state = self.state.lock().unwrap();
        self.track_entity(&mut state, entity);
    }

    fn entity_removed(self: &Arc<Self>, entity: &Entity) {
        let mut state = self.state.lock().unwrap();
        self.untrack_entity(&mut state, entity);
    }

    fn component_added(self: &Arc<Self>, component: &ComponentRef) {
        let mut state = self.state.lock().unwrap();
        self.check_component(&mut state, component, false);
    }

    fn component_removed(self: &Arc<Self>, component: &ComponentRef) {
        let mut state = self.state.lock().unwrap();
        self.check_component(&mut state, component, true);
    }

    /// Start tracking an entity: mark it tracked, subscribe to its
    /// component-list changes, then activate its current components.
    /// Idempotent, which guards against duplicate event delivery.
    ///
    /// The tracked mark goes in first so the sibling refresh runs while the
    /// activation walk delivers the entity's components one by one.
    fn track_entity(self: &Arc<Self>, state: &mut DispatchState, entity: &Entity) {
        if state.tracked.contains_key(&entity.id()) {
            return;
        }
        debug!("tracking entity {:?}", entity.id());

        let subscription = entity.subscribe(Arc::new(ComponentEvents {
            shared: Arc::downgrade(self),
        }));
        state.tracked.insert(
            entity.id(),
            TrackedEntity {
                entity: entity.clone(),
                subscription,
            },
        );

        for component in entity.components() {
            self.check_component(state, &component, false);
        }
    }

    /// Stop tracking an entity: unsubscribe from its component-list changes,
    /// then deactivate its components. No-op if the entity is not tracked.
    fn untrack_entity(self: &Arc<Self>, state: &mut DispatchState, entity: &Entity) {
        let Some(tracked) = state.tracked.remove(&entity.id()) else {
            return;
        };
        debug!("untracking entity {:?}", entity.id());
        tracked.entity.unsubscribe(tracked.subscription);

        for component in entity.components() {
            self.check_component(state, &component, true);
        }
    }

    /// Determine the systems interested in a component and deliver
    /// `process(component, removal)` to each, building (and, on first
    /// activation of a type, provisioning for) the component-type index
    /// entry as needed. Finishes with the sibling refresh pass, skipped
    /// when the owning entity is no longer tracked.
    ///
    /// # Panics
    ///
    /// Panics if the component has no owning entity: a component must be
    /// attached before it can be processed.
    fn check_component(&self, state: &mut DispatchState, component: &ComponentRef, removal: bool) {
        let Some(entity) = component.entity() else {
            panic!(
                "component {} must be attached to an entity before it is processed",
                component.type_name()
            );
        };

        let component_type = component.component_type();
        if let Some(ids) = state.index.get(&component_type).cloned() {
            for id in ids {
                if let Some(entry) = state.registry.get_mut(id) {
                    entry.system_mut().process(component, removal);
                }
            }
        } else {
            // First time this component type is seen. Provision declared
            // systems before the accept-matching pass so they are eligible
            // to accept the triggering component; removal never provisions.
            if !removal {
                self.provision(state, component);
            }

            let mut interested = Vec::new();
            for entry in state.registry.iter_mut() {
                if entry.system_mut().accepts(component_type) {
                    entry.system_mut().process(component, removal);
                    interested.push(entry.id());
                }
            }
            debug!(
                "indexed component type {} -> {} systems",
                component.type_name(),
                interested.len()
            );
            state.index.insert(component_type, interested);
        }

        // The refresh pass only runs while the owning entity is still
        // tracked. During entity teardown every component is being
        // deactivated in turn; refreshing there would re-register siblings
        // whose removal was already delivered.
        if state.tracked.contains_key(&entity.id()) {
            self.refresh_siblings(state, &entity, component);
        }
    }

    /// Instantiate and register every default system the component's type
    /// declares that is not yet present in the registry.
    fn provision(&self, state: &mut DispatchState, component: &ComponentRef) {
        for recipe in component.default_systems() {
            if state.registry.contains_type(recipe.system_type()) {
                continue;
            }
            info!(
                "provisioning {} declared by component type {}",
                recipe.system_name(),
                component.type_name()
            );
            let system = recipe.construct(&self.services);
            state
                .registry
                .insert(recipe.system_type(), recipe.system_name(), system);
        }
    }

    /// Re-deliver every other component on the same entity to the systems
    /// already indexed for it, so systems depending on sibling component
    /// data can refresh their view. Always delivered as an activation
    /// (`removal == false`), even when the triggering event was a removal.
    fn refresh_siblings(&self, state: &mut DispatchState, entity: &Entity, skip: &ComponentRef) {
        for sibling in entity.components() {
            if sibling == *skip {
                continue;
            }
            let Some(ids) = state.index.get(&sibling.component_type()).cloned() else {
                continue;
            };
            for id in ids {
                if let Some(entry) = state.registry.get_mut(id) {
                    entry.system_mut().process(&sibling, false);
                }
            }
        }
    }
}
