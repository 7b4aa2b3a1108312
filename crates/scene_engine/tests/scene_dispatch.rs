//! End-to-end dispatch over the stock components and systems.

use std::sync::Arc;
use std::time::Duration;

use approx::assert_relative_eq;
use nalgebra::Vector3;
use scene_engine::foundation::logging;
use scene_engine::prelude::*;

fn dispatcher_with_queue() -> (SceneDispatcher, Arc<DrawQueue>) {
    logging::init_for_tests();
    let services = Services::new();
    let queue = Arc::new(DrawQueue::new());
    services.insert_arc(queue.clone());
    (SceneDispatcher::new(services), queue)
}

#[test]
fn moving_renderable_entity_is_integrated_and_drawn() {
    let (dispatcher, queue) = dispatcher_with_queue();

    let scene = Scene::new();
    let ship = Entity::new();
    let transform = ship.add(TransformComponent::identity());
    ship.add(MotionComponent::with_velocity(Vector3::new(3.0, 0.0, 0.0)));
    ship.add(RenderableComponent::new("meshes/ship"));
    scene.add(ship);

    dispatcher.set_root_scene(Some(scene));

    // Both systems were provisioned from the component declarations, in
    // declared order.
    assert_eq!(dispatcher.system_names().len(), 2);
    assert!(dispatcher.system_names()[0].ends_with("MovementSystem"));
    assert!(dispatcher.system_names()[1].ends_with("RenderSystem"));

    dispatcher.update(Duration::from_secs(1));
    let position = transform
        .read::<TransformComponent>()
        .expect("transform data")
        .position;
    assert_relative_eq!(position, Vector3::new(3.0, 0.0, 0.0));

    dispatcher.draw(Duration::from_millis(16));
    let commands = queue.take();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].mesh, "meshes/ship");
    assert_relative_eq!(commands[0].world[(0, 3)], 3.0);
}

#[test]
fn removed_entity_stops_moving_and_drawing() {
    let (dispatcher, queue) = dispatcher_with_queue();

    let scene = Scene::new();
    let ship = Entity::new();
    let transform = ship.add(TransformComponent::identity());
    ship.add(MotionComponent::with_velocity(Vector3::new(1.0, 0.0, 0.0)));
    ship.add(RenderableComponent::new("meshes/ship"));
    scene.add(ship.clone());
    dispatcher.set_root_scene(Some(scene.clone()));

    scene.remove(&ship);

    dispatcher.update(Duration::from_secs(1));
    dispatcher.draw(Duration::from_millis(16));

    let position = transform
        .read::<TransformComponent>()
        .expect("transform data")
        .position;
    assert_relative_eq!(position, Vector3::zeros());
    assert!(queue.is_empty());
    assert_eq!(dispatcher.entity_count(), 0);
}

#[test]
fn transform_added_after_motion_is_picked_up_by_refresh() {
    let (dispatcher, _queue) = dispatcher_with_queue();

    let scene = Scene::new();
    let drifting = Entity::new();
    drifting.add(MotionComponent::with_velocity(Vector3::new(0.0, 2.0, 0.0)));
    scene.add(drifting.clone());
    dispatcher.set_root_scene(Some(scene));

    // No transform yet; the update has nothing to integrate into.
    dispatcher.update(Duration::from_secs(1));

    let transform = drifting.add(TransformComponent::identity());
    dispatcher.update(Duration::from_secs(1));

    let position = transform
        .read::<TransformComponent>()
        .expect("transform data")
        .position;
    assert_relative_eq!(position, Vector3::new(0.0, 2.0, 0.0));
}

#[test]
fn startup_scene_loads_through_content_manager() {
    logging::init_for_tests();
    let services = Services::new();
    let content = ContentManager::new();
    content.register_loader::<Scene, _>(|_path: &str| {
        let scene = Scene::new();
        let entity = Entity::new();
        entity.add(TransformComponent::identity());
        scene.add(entity);
        Ok(scene)
    });

    let config = SceneConfig::new().with_initial_scene("scenes/start");
    let dispatcher = SceneDispatcher::with_config(services, config);
    dispatcher.load_content(&content).expect("startup scene");

    assert!(dispatcher.root_scene().is_some());
    assert_eq!(dispatcher.entity_count(), 1);
    assert!(content.is_loaded("scenes/start"));
}

#[test]
fn concurrent_spawning_thread_and_frame_loop() {
    let (dispatcher, queue) = dispatcher_with_queue();
    let dispatcher = Arc::new(dispatcher);

    let scene = Scene::new();
    dispatcher.set_root_scene(Some(scene.clone()));

    let spawner = {
        let scene = scene.clone();
        std::thread::spawn(move || {
            for index in 0..50 {
                let entity = Entity::new();
                entity.add(TransformComponent::at(Vector3::new(index as f32, 0.0, 0.0)));
                entity.add(RenderableComponent::new("meshes/rock"));
                scene.add(entity);
            }
        })
    };

    for _ in 0..100 {
        dispatcher.update(Duration::from_micros(500));
        dispatcher.draw(Duration::from_micros(500));
        queue.take();
    }
    spawner.join().unwrap();

    dispatcher.draw(Duration::from_millis(16));
    assert_eq!(queue.take().len(), 50);
    assert_eq!(dispatcher.entity_count(), 50);

    dispatcher.dispose();
}
