//! Processing systems and their provisioning recipes.

use std::any::{type_name, TypeId};
use std::time::Duration;

use crate::ecs::component::ComponentRef;
use crate::services::Services;

/// Sort key for registry ordering.
///
/// Lower values run earlier in the per-frame sweep; ties keep insertion
/// order. A system that must run before another (a layout system before a
/// rendering system, say) declares a smaller order and relies on traversal
/// order, not explicit calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SystemOrder(pub i32);

impl SystemOrder {
    /// The default position in the sweep.
    pub const DEFAULT: Self = Self(0);
}

impl Default for SystemOrder {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A polymorphic processor over one or more component types.
///
/// A system learns about the components it should work on through
/// [`process`](Self::process) calls from the dispatcher and keeps its own
/// view of them; the per-frame [`update`](Self::update) and
/// [`draw`](Self::draw) iterate that view, never the scene graph.
///
/// Implementations must not structurally mutate the scene graph (add or
/// remove entities or components) from within any of these callbacks; the
/// dispatcher holds its mutation guard while calling them.
pub trait EntitySystem: Send {
    /// Relative position of this system in the per-frame sweep.
    fn order(&self) -> SystemOrder {
        SystemOrder::DEFAULT
    }

    /// Whether this system processes components of the given concrete type.
    fn accepts(&self, component_type: TypeId) -> bool;

    /// Notification that a component this system accepts was activated
    /// (`removal == false`) or deactivated (`removal == true`).
    ///
    /// The dispatcher additionally re-delivers sibling components of an
    /// entity whenever any one of them changes, always with
    /// `removal == false`; implementations should treat repeated activation
    /// of a known component as a refresh, not an error.
    fn process(&mut self, component: &ComponentRef, removal: bool);

    /// Per-frame logic step.
    fn update(&mut self, _delta: Duration) {}

    /// Per-frame draw step.
    fn draw(&mut self, _delta: Duration) {}

    /// Terminal cleanup, called once when the dispatcher is disposed.
    fn dispose(&mut self) {}
}

/// Factory declaration naming a system a component type expects.
///
/// Recipes are returned from `Component::default_systems`; the dispatcher
/// constructs the named system with its own service handle when the declaring
/// component type is first activated and no system of that type is registered
/// yet.
#[derive(Clone)]
pub struct SystemRecipe {
    system_type: TypeId,
    system_name: &'static str,
    construct: fn(&Services) -> Box<dyn EntitySystem>,
}

impl SystemRecipe {
    /// Declare a recipe for system type `S`.
    pub fn new<S: EntitySystem + 'static>(construct: fn(&Services) -> Box<dyn EntitySystem>) -> Self {
        Self {
            system_type: TypeId::of::<S>(),
            system_name: type_name::<S>(),
            construct,
        }
    }

    /// `TypeId` of the declared system.
    pub fn system_type(&self) -> TypeId {
        self.system_type
    }

    /// Name of the declared system type.
    pub fn system_name(&self) -> &'static str {
        self.system_name
    }

    pub(crate) fn construct(&self, services: &Services) -> Box<dyn EntitySystem> {
        (self.construct)(services)
    }
}

impl std::fmt::Debug for SystemRecipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemRecipe")
            .field("system", &self.system_name)
            .finish()
    }
}
