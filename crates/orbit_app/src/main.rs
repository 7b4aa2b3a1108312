//! Headless demo: a handful of orbiting bodies driven by the scene dispatch
//! runtime, drawing into an in-memory queue instead of a GPU backend.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::info;
use nalgebra::Vector3;
use scene_engine::foundation::logging;
use scene_engine::prelude::*;

const FRAME_BUDGET: Duration = Duration::from_millis(16);
const FRAMES: u32 = 120;

/// Build the demo scene procedurally. Registered as the `Scene` loader so
/// the dispatcher can resolve it through the content manager like any other
/// asset.
fn build_scene(path: &str) -> Result<Scene, ContentError> {
    info!("building scene `{path}`");
    let scene = Scene::new();

    let sun = Entity::new();
    sun.add(TransformComponent::identity());
    sun.add(RenderableComponent::new("meshes/sun").with_layer(0));
    scene.add(sun);

    for (index, radius) in [2.0f32, 4.0, 7.5].into_iter().enumerate() {
        let planet = Entity::new();
        planet.add(TransformComponent::at(Vector3::new(radius, 0.0, 0.0)));
        planet.add(MotionComponent::with_velocity(Vector3::new(
            0.0,
            1.0 / radius,
            0.0,
        )));
        planet.add(RenderableComponent::new(format!("meshes/planet_{index}")).with_layer(1));
        scene.add(planet);
    }

    Ok(scene)
}

fn main() {
    logging::init();

    let services = Services::new();
    let draw_queue = Arc::new(DrawQueue::new());
    services.insert_arc(draw_queue.clone());

    let content = ContentManager::new();
    content.register_loader::<Scene, _>(build_scene);

    let config = SceneConfig::new().with_initial_scene("scenes/orbits");
    let dispatcher = SceneDispatcher::with_config(services, config);

    if let Err(error) = dispatcher.load_content(&content) {
        eprintln!("failed to load startup scene: {error}");
        std::process::exit(1);
    }
    info!(
        "scene loaded: {} entities, systems: {:?}",
        dispatcher.entity_count(),
        dispatcher.system_names()
    );

    let mut timer = Timer::new();
    for frame in 0..FRAMES {
        let delta = timer.tick();
        dispatcher.update(delta);
        dispatcher.draw(delta);

        let commands = draw_queue.take();
        if frame % 30 == 0 {
            info!("frame {frame}: {} draw commands", commands.len());
        }

        if let Some(remaining) = FRAME_BUDGET.checked_sub(timer.delta()) {
            thread::sleep(remaining);
        }
    }

    info!(
        "ran {} frames at {:.1} fps average",
        timer.frame_count(),
        timer.average_fps()
    );
    dispatcher.dispose();
}
