//! Linear motion component.

use nalgebra::Vector3;

use crate::ecs::component::Component;
use crate::ecs::system::SystemRecipe;
use crate::ecs::systems::MovementSystem;

/// Velocity and acceleration of an entity.
///
/// Declares [`MovementSystem`], which integrates this component into the
/// sibling [`TransformComponent`](super::TransformComponent) every update.
#[derive(Debug, Clone, Default)]
pub struct MotionComponent {
    /// Velocity in units per second
    pub velocity: Vector3<f32>,
    /// Acceleration in units per second squared
    pub acceleration: Vector3<f32>,
}

impl MotionComponent {
    /// Motion at rest.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constant motion at `velocity`.
    pub fn with_velocity(velocity: Vector3<f32>) -> Self {
        Self {
            velocity,
            acceleration: Vector3::zeros(),
        }
    }
}

impl Component for MotionComponent {
    fn default_systems() -> Vec<SystemRecipe> {
        vec![SystemRecipe::new::<MovementSystem>(|_services| {
            Box::new(MovementSystem::new())
        })]
    }
}
