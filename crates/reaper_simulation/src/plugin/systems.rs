use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionEvent, ReadRapierContext, Velocity};

use super::components::{LocomotionController, PlayerInput, WallTouches};
use super::events::{CharacterStateChanged, HitLanded, TetherChanged};
use crate::input::InputSource;
use crate::physics::rapier::{RapierBody, RapierProbe, Surface};
use crate::physics::{ContactPhase, SurfaceTag};

/// Rapier collision events → `WallTouches`
///
/// Учитываются только коллайдеры с `Surface(Wall)`; Stopped снимает контакт всегда
/// (коллайдер мог быть despawned).
pub fn track_wall_contacts(
    mut events: EventReader<CollisionEvent>,
    surfaces: Query<&Surface>,
    mut characters: Query<&mut WallTouches>,
) {
    for event in events.read() {
        let (a, b, started) = match *event {
            CollisionEvent::Started(a, b, _) => (a, b, true),
            CollisionEvent::Stopped(a, b, _) => (a, b, false),
        };

        for (character, other) in [(a, b), (b, a)] {
            let Ok(mut touches) = characters.get_mut(character) else {
                continue;
            };

            if !started {
                touches.stop(other);
                continue;
            }

            let is_wall = surfaces
                .get(other)
                .is_ok_and(|surface| surface.0 == SurfaceTag::Wall);
            if is_wall {
                touches.start(other);
            }
        }
    }
}

/// Один fixed tick контроллера для каждого персонажа
pub fn advance_locomotion(
    time: Res<Time<Fixed>>,
    rapier_context: ReadRapierContext,
    surfaces: Query<&Surface>,
    mut characters: Query<(
        Entity,
        &Transform,
        &mut Velocity,
        &mut LocomotionController,
        &mut PlayerInput,
        &mut WallTouches,
    )>,
    mut state_events: EventWriter<CharacterStateChanged>,
    mut hit_events: EventWriter<HitLanded>,
    mut tether_events: EventWriter<TetherChanged>,
) {
    let Ok(context) = rapier_context.single() else {
        return;
    };

    // Шаг fixed schedule (не delta: система может крутиться вне FixedMain)
    let dt = time.timestep().as_secs_f32();
    if dt <= 0.0 {
        return;
    }

    let surface_of = |entity: Entity| surfaces.get(entity).ok().map(|surface| surface.0);

    for (entity, transform, mut velocity, mut locomotion, mut input, mut touches) in
        characters.iter_mut()
    {
        let probe = RapierProbe::new(&context, &surface_of, locomotion.ground_probe_distance)
            .excluding(entity);
        let position = transform.translation;

        for (wall, phase) in touches.drain() {
            let point = match phase {
                ContactPhase::Exit => position,
                ContactPhase::Enter | ContactPhase::Stay => {
                    let Some(point) = probe.closest_point_on(wall, position) else {
                        continue;
                    };
                    point
                }
            };
            locomotion.controller.wall_contact_event(phase, point);
        }

        let sample = input.take_sample();
        let mut body = RapierBody::new(position, &mut velocity);
        let report = locomotion.controller.advance(dt, sample, &probe, &mut body);

        if let Some(transition) = report.transition {
            state_events.write(CharacterStateChanged {
                entity,
                from: transition.from,
                to: transition.to,
            });
        }

        for hit in report.hits {
            hit_events.write(HitLanded {
                attacker: entity,
                target: hit.target,
                target_entity: Entity::try_from_bits(hit.target.0).ok(),
                damage: hit.damage,
                point: hit.point,
            });
        }

        if let Some(event) = report.grapple {
            tether_events.write(TetherChanged { entity, event });
        }
    }
}

/// Yaw контроллера → rotation тела
pub fn apply_facing(mut characters: Query<(&LocomotionController, &mut Transform)>) {
    for (locomotion, mut transform) in characters.iter_mut() {
        let rotation = locomotion.controller.look().body_rotation();
        if transform.rotation != rotation {
            transform.rotation = rotation;
        }
    }
}
