//! Stock component types.

mod motion;
mod renderable;
mod transform;

pub use motion::MotionComponent;
pub use renderable::RenderableComponent;
pub use transform::TransformComponent;
