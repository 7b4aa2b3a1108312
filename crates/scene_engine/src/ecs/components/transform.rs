//! Spatial placement component.

use nalgebra::{Matrix4, UnitQuaternion, Vector3};

use crate::ecs::component::Component;

/// Position, orientation, and scale of an entity.
///
/// Declares no systems of its own; motion and rendering systems read and
/// write it as a sibling of their own component types.
#[derive(Debug, Clone)]
pub struct TransformComponent {
    /// World-space position
    pub position: Vector3<f32>,
    /// World-space orientation
    pub rotation: UnitQuaternion<f32>,
    /// Per-axis scale
    pub scale: Vector3<f32>,
}

impl TransformComponent {
    /// The identity placement at the origin.
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Identity placement translated to `position`.
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Homogeneous world matrix combining position, rotation, and scale.
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::identity()
    }
}

impl Component for TransformComponent {}
