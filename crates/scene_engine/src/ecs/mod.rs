//! Scene-graph entity/component model and the dispatch runtime.
//!
//! The graph is a root [`Scene`] of [`Entity`] containers, each holding
//! typed components behind [`ComponentRef`] handles. A [`SceneDispatcher`]
//! observes structural changes to the graph and routes components to the
//! [`EntitySystem`] instances that accept them, provisioning declared
//! systems on demand and sweeping the registry once per frame.

mod component;
mod dispatcher;
mod entity;
mod observer;
mod registry;
mod scene;
mod system;

pub mod components;
pub mod systems;

pub use component::{Component, ComponentId, ComponentRead, ComponentRef, ComponentWrite};
pub use dispatcher::SceneDispatcher;
pub use entity::{Entity, EntityId};
pub use observer::{CollectionObserver, ListChange, SubscriptionId};
pub use registry::{SystemId, SystemRegistry};
pub use scene::{Scene, SceneId};
pub use system::{EntitySystem, SystemOrder, SystemRecipe};
