//! Stock processing systems and the draw-command sink they feed.

mod movement;
mod render;

use std::sync::Mutex;

use nalgebra::Matrix4;

pub use movement::MovementSystem;
pub use render::RenderSystem;

/// One resolved draw request.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    /// Content path of the mesh to draw
    pub mesh: String,
    /// Draw-order layer
    pub layer: i32,
    /// World matrix at the time the command was emitted
    pub world: Matrix4<f32>,
}

/// Sink collecting the draw commands of one frame.
///
/// Register an instance in `Services` for [`RenderSystem`] to find; a
/// presentation backend drains it once per frame with [`take`](Self::take).
#[derive(Debug, Default)]
pub struct DrawQueue {
    commands: Mutex<Vec<DrawCommand>>,
}

impl DrawQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command.
    pub fn submit(&self, command: DrawCommand) {
        self.commands.lock().unwrap().push(command);
    }

    /// Drain every queued command in submission order.
    pub fn take(&self) -> Vec<DrawCommand> {
        std::mem::take(&mut *self.commands.lock().unwrap())
    }

    /// Number of queued commands.
    pub fn len(&self) -> usize {
        self.commands.lock().unwrap().len()
    }

    /// Whether the queue holds no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.lock().unwrap().is_empty()
    }
}
