//! Integration of motion into transforms.

use std::any::TypeId;
use std::collections::HashMap;
use std::time::Duration;

use crate::ecs::component::{ComponentId, ComponentRef};
use crate::ecs::components::{MotionComponent, TransformComponent};
use crate::ecs::system::{EntitySystem, SystemOrder};

struct MovementRecord {
    motion: ComponentRef,
    transform: Option<ComponentRef>,
}

/// Integrates each [`MotionComponent`] into the sibling
/// [`TransformComponent`] every update.
///
/// An entity with motion but no transform is tracked and left alone until a
/// transform appears; the sibling refresh re-links it then.
#[derive(Default)]
pub struct MovementSystem {
    records: HashMap<ComponentId, MovementRecord>,
}

impl MovementSystem {
    /// Create a system tracking no entities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of motion components currently tracked.
    pub fn tracked(&self) -> usize {
        self.records.len()
    }
}

impl EntitySystem for MovementSystem {
    fn order(&self) -> SystemOrder {
        SystemOrder(100)
    }

    fn accepts(&self, component_type: TypeId) -> bool {
        component_type == TypeId::of::<MotionComponent>()
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
            MovementRecord {
                motion: component.clone(),
                transform: entity.get::<TransformComponent>(),
            },
        );
    }

    fn update(&mut self, delta: Duration) {
        let dt = delta.as_secs_f32();
        for record in self.records.values() {
            let Some(transform) = &record.transform else {
                continue;
            };
            let velocity = {
                let Some(mut motion) = record.motion.write::<MotionComponent>() else {
                    continue;
                };
                let acceleration = motion.acceleration;
                motion.velocity += acceleration * dt;
                motion.velocity
            };
            if let Some(mut transform) = transform.write::<TransformComponent>() {
                transform.position += velocity * dt;
            }
        }
    }
}
