//! LocomotionPlugin: CharacterController внутри Bevy + Rapier
//!
//! Архитектура:
//! - Rapier интегрирует velocity (Dynamic тело, rotation locked)
//! - Контроллер пишет `Velocity.linvel` раз в fixed tick, ДО physics step
//! - Wall контакты приходят из `CollisionEvent` (нужен `ActiveEvents::COLLISION_EVENTS`)
//!
//! Rapier plugin добавляет host (`RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule()`),
//! готовая сборка: `SimulationPlugin`.

mod components;
mod events;
mod systems;

mod plugin_tests;

use bevy::prelude::*;
use bevy_rapier3d::plugin::PhysicsSet;
use bevy_rapier3d::prelude::{
    ActiveEvents, Collider, CollisionEvent, Friction, LockedAxes, RigidBody as RapierRigidBody,
    Velocity,
};

pub use components::{LocomotionController, PlayerInput, WallTouches};
pub use events::{CharacterStateChanged, HitLanded, TetherChanged};
pub use systems::{advance_locomotion, apply_facing, track_wall_contacts};

use crate::config::LocomotionTuning;
use crate::physics::rapier::{player_groups, Surface};

/// Plugin персонажа (FixedUpdate, до Rapier sync)
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app
            // Не перетирает tuning, вставленный host'ом (например из RON)
            .init_resource::<LocomotionTuning>()
            .add_event::<CollisionEvent>()
            .add_event::<HitLanded>()
            .add_event::<CharacterStateChanged>()
            .add_event::<TetherChanged>()
            .register_type::<Surface>()
            .add_systems(
                FixedUpdate,
                (track_wall_contacts, advance_locomotion, apply_facing)
                    .chain()
                    .before(PhysicsSet::SyncBackend),
            );
    }
}

/// Spawn helper для персонажа
///
/// Создает entity с полным набором компонентов:
/// - Transform
/// - LocomotionController / PlayerInput / WallTouches
/// - Rapier: Dynamic тело + capsule + collision events
pub fn spawn_locomotion_character(
    commands: &mut Commands,
    position: Vec3,
    tuning: &LocomotionTuning,
) -> Entity {
    let entity = commands
        .spawn((
            Transform::from_translation(position),
            PlayerInput::default(),
            WallTouches::default(),
            RapierRigidBody::Dynamic,
            Collider::capsule_y(0.5, 0.4), // Высота 1.8m (0.5 * 2 + 0.4 * 2)
            Velocity::default(),
            LockedAxes::ROTATION_LOCKED,
            Friction::coefficient(0.0),
            ActiveEvents::COLLISION_EVENTS,
            player_groups(),
        ))
        .id();

    commands
        .entity(entity)
        .insert(LocomotionController::for_entity(entity, tuning.clone()));

    entity
}

/// Статический коллайдер уровня с тегом поверхности
pub fn spawn_level_box(
    commands: &mut Commands,
    center: Vec3,
    half_extents: Vec3,
    surface: Surface,
) -> Entity {
    commands
        .spawn((
            Transform::from_translation(center),
            RapierRigidBody::Fixed,
            Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
            surface.groups(),
            surface,
        ))
        .id()
}
