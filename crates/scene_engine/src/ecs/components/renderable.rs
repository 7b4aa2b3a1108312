//! Drawable marker component.

use crate::ecs::component::Component;
use crate::ecs::system::SystemRecipe;
use crate::ecs::systems::RenderSystem;

/// Marks an entity as drawable.
///
/// Declares [`RenderSystem`], which emits a draw command per visible
/// renderable each draw sweep, positioned by the sibling
/// [`TransformComponent`](super::TransformComponent).
#[derive(Debug, Clone)]
pub struct RenderableComponent {
    /// Content path of the mesh to draw
    pub mesh: String,
    /// Draw-order layer; lower layers draw first
    pub layer: i32,
    /// Whether the entity is currently drawn
    pub visible: bool,
}

impl RenderableComponent {
    /// Visible renderable on layer zero.
    pub fn new(mesh: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            layer: 0,
            visible: true,
        }
    }

    /// Place the renderable on a layer.
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }
}

impl Component for RenderableComponent {
    fn default_systems() -> Vec<SystemRecipe> {
        vec![SystemRecipe::new::<RenderSystem>(|services| {
            Box::new(RenderSystem::new(services))
        })]
    }
}
