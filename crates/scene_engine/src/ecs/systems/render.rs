//! Draw-command emission for renderable entities.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::warn;

use crate::ecs::component::{ComponentId, ComponentRef};
use crate::ecs::components::{RenderableComponent, TransformComponent};
use crate::ecs::system::{EntitySystem, SystemOrder};
use crate::ecs::systems::{DrawCommand, DrawQueue};
use crate::services::Services;

struct RenderRecord {
    renderable: ComponentRef,
    transform: Option<ComponentRef>,
}

/// Emits one [`DrawCommand`] per visible [`RenderableComponent`] each draw
/// sweep, ordered by layer.
///
/// The sink is the [`DrawQueue`] registered in `Services` at construction
/// time; without one the system tracks entities but draws nothing.
pub struct RenderSystem {
    queue: Option<Arc<DrawQueue>>,
    records: HashMap<ComponentId, RenderRecord>,
}

impl RenderSystem {
    /// Create a system draining into the `DrawQueue` found in `services`.
    pub fn new(services: &Services) -> Self {
        let queue = services.get::<DrawQueue>();
        if queue.is_none() {
            warn!("no draw queue registered; draw commands will be discarded");
        }
        Self {
            queue,
            records: HashMap::new(),
        }
    }

    /// Number of renderable components currently tracked.
    pub fn tracked(&self) -> usize {
        self.records.len()
    }
}

impl EntitySystem for RenderSystem {
    fn order(&self) -> SystemOrder {
        SystemOrder(200)
    }

    fn accepts(&self, component_type: TypeId) -> bool {
        component_type == TypeId::of::<RenderableComponent>()
    }

    fn process(&mut self, component: &ComponentRef, removal: bool) {
        if removal {
            self.records.remove(&component.id());
            return;
        }
        let Some(entity) = component.entity() else {
            return;
        };
        self.records.insert(
            component.id(),
            RenderRecord {
                renderable: component.clone(),
                transform: entity.get::<TransformComponent>(),
            },
        );
    }

    fn draw(&mut self, _delta: Duration) {
        let Some(queue) = &self.queue else {
            return;
        };

        let mut commands = Vec::new();
        for record in self.records.values() {
            let Some(renderable) = record.renderable.read::<RenderableComponent>() else {
                continue;
            };
            if !renderable.visible {
                continue;
            }
            let world = record
                .transform
                .as_ref()
                .and_then(|t| t.read::<TransformComponent>().map(|t| t.to_matrix()))
                .unwrap_or_else(nalgebra::Matrix4::identity);
            commands.push(DrawCommand {
                mesh: renderable.mesh.clone(),
                layer: renderable.layer,
                world,
            });
        }

        commands.sort_by_key(|command| command.layer);
        for command in commands {
            queue.submit(command);
        }
    }
}
