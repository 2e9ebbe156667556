#[cfg(test)]
mod tests {
    use bevy::ecs::system::RunSystemOnce;
    use bevy::prelude::*;
    use bevy_rapier3d::prelude::{CollisionEvent, Velocity};
    use bevy_rapier3d::rapier::geometry::CollisionEventFlags;

    use crate::config::LocomotionTuning;
    use crate::input::InputSource;
    use crate::physics::rapier::Surface;
    use crate::physics::{ContactPhase, SurfaceTag};
    use crate::plugin::{
        advance_locomotion, apply_facing, track_wall_contacts, HitLanded, LocomotionController,
        LocomotionPlugin, PlayerInput, WallTouches,
    };

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(LocomotionPlugin);
        app
    }

    #[test]
    fn test_wall_touches_phases() {
        let mut world = World::new();
        let wall = world.spawn_empty().id();
        let mut touches = WallTouches::default();

        touches.start(wall);
        assert_eq!(touches.drain(), vec![(wall, ContactPhase::Enter)]);
        assert_eq!(touches.drain(), vec![(wall, ContactPhase::Stay)]);

        touches.stop(wall);
        assert_eq!(touches.drain(), vec![(wall, ContactPhase::Exit)]);
        assert!(touches.drain().is_empty());
    }

    #[test]
    fn test_wall_touches_exit_before_enter() {
        let mut world = World::new();
        let first = world.spawn_empty().id();
        let second = world.spawn_empty().id();
        let mut touches = WallTouches::default();

        touches.start(first);
        touches.drain();
        touches.stop(first);
        touches.start(second);

        assert_eq!(
            touches.drain(),
            vec![(first, ContactPhase::Exit), (second, ContactPhase::Enter)]
        );
    }

    #[test]
    fn test_stop_without_start_is_ignored() {
        let mut world = World::new();
        let wall = world.spawn_empty().id();
        let mut touches = WallTouches::default();

        touches.stop(wall);
        assert!(touches.drain().is_empty());
    }

    #[test]
    fn test_track_wall_contacts_only_walls() {
        let mut app = test_app();
        let world = app.world_mut();

        let character = world.spawn(WallTouches::default()).id();
        let wall = world.spawn(Surface(SurfaceTag::Wall)).id();
        let floor = world.spawn(Surface(SurfaceTag::Ground)).id();

        world.send_event(CollisionEvent::Started(character, wall, CollisionEventFlags::empty()));
        world.send_event(CollisionEvent::Started(floor, character, CollisionEventFlags::empty()));
        world.run_system_once(track_wall_contacts).expect("system ran");

        let touches = world.get::<WallTouches>(character).expect("touches");
        assert_eq!(touches.touching(), &[wall]);
    }

    #[test]
    fn test_stopped_on_despawned_wall_clears_contact() {
        let mut app = test_app();
        let world = app.world_mut();

        let character = world.spawn(WallTouches::default()).id();
        let wall = world.spawn(Surface(SurfaceTag::Wall)).id();

        world.send_event(CollisionEvent::Started(character, wall, CollisionEventFlags::empty()));
        world.run_system_once(track_wall_contacts).expect("system ran");

        world.despawn(wall);
        world.send_event(CollisionEvent::Stopped(
            character,
            wall,
            CollisionEventFlags::REMOVED,
        ));
        world.run_system_once(track_wall_contacts).expect("system ran");

        let touches = world.get::<WallTouches>(character).expect("touches");
        assert!(touches.touching().is_empty());
    }

    #[test]
    fn test_apply_facing_writes_yaw() {
        let mut app = test_app();
        let world = app.world_mut();

        let mut locomotion = LocomotionController::new(LocomotionTuning::default());
        locomotion.controller = locomotion
            .controller
            .clone()
            .with_yaw(std::f32::consts::FRAC_PI_2);
        let entity = world.spawn((locomotion, Transform::default())).id();

        world.run_system_once(apply_facing).expect("system ran");

        let transform = world.get::<Transform>(entity).expect("transform");
        let forward = transform.rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_X).length() < 1e-4, "{forward:?}");
    }

    #[test]
    fn test_plugin_keeps_host_tuning() {
        let mut tuning = LocomotionTuning::default();
        tuning.movement.movement_speed = 7.0;

        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(tuning.clone())
            .add_plugins(LocomotionPlugin);

        assert_eq!(*app.world().resource::<LocomotionTuning>(), tuning);
        assert!(app.world().contains_resource::<Events<HitLanded>>());
    }

    #[test]
    fn test_advance_without_rapier_context_is_noop() {
        let mut app = test_app();
        let world = app.world_mut();

        let mut input = PlayerInput::default();
        input.press_jump();
        let entity = world
            .spawn((
                Transform::default(),
                Velocity::default(),
                LocomotionController::new(LocomotionTuning::default()),
                input,
                WallTouches::default(),
            ))
            .id();

        world.run_system_once(advance_locomotion).expect("system ran");

        // Input не съеден, velocity не тронута
        let mut input = world.get_mut::<PlayerInput>(entity).expect("input");
        assert!(input.take_sample().jump);
        let velocity = world.get::<Velocity>(entity).expect("velocity");
        assert_eq!(velocity.linvel, Vec3::ZERO);
    }
}
