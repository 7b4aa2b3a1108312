//! # Scene Engine
//!
//! A scene-graph entity-component engine core with dynamically provisioned
//! processing systems.
//!
//! ## Features
//!
//! - **Observable Scene Graph**: Scenes and entities emit synchronous change
//!   events for every structural edit
//! - **Dynamic System Provisioning**: Systems are instantiated lazily the
//!   first time a component type that declares them appears
//! - **Ordered Dispatch**: Systems run in a declared, stable order every frame
//! - **Thread-Safe Mutation**: Structural edits may originate from any thread
//!   and are serialized against the frame sweep
//! - **Content Management**: Typed asset loading with path-based reference
//!   counting
//!
//! ## Quick Start
//!
//! ```rust
//! use scene_engine::prelude::*;
//! use std::time::Duration;
//!
//! let services = Services::new();
//! let dispatcher = SceneDispatcher::new(services);
//!
//! let scene = Scene::new();
//! let entity = Entity::new();
//! entity.add(TransformComponent::identity());
//! entity.add(MotionComponent::with_velocity(nalgebra::Vector3::new(1.0, 0.0, 0.0)));
//! scene.add(entity);
//!
//! dispatcher.set_root_scene(Some(scene));
//! dispatcher.update(Duration::from_millis(16));
//! dispatcher.draw(Duration::from_millis(16));
//! dispatcher.dispose();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod ecs;
pub mod foundation;
pub mod services;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetLoader, ContentError, ContentManager, LoadHandle},
        config::{ApplicationConfig, Config, ConfigError, EngineConfig, SceneConfig},
        ecs::{
            components::{MotionComponent, RenderableComponent, TransformComponent},
            systems::{DrawCommand, DrawQueue},
            Component, ComponentRef, Entity, EntitySystem, ListChange, Scene, SceneDispatcher,
            SystemOrder, SystemRecipe,
        },
        foundation::time::Timer,
        services::Services,
    };
}
