use bevy::prelude::*;

use crate::controller::GrappleEvent;
use crate::movement::CharacterState;
use crate::physics::ColliderId;

/// Melee попадание
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HitLanded {
    pub attacker: Entity,
    pub target: ColliderId,
    /// `None` если id не восстанавливается в Entity
    pub target_entity: Option<Entity>,
    pub damage: u32,
    pub point: Vec3,
}

/// Переход locomotion FSM
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterStateChanged {
    pub entity: Entity,
    pub from: CharacterState,
    pub to: CharacterState,
}

/// Launch / attach / miss / release grapple (для визуала троса)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TetherChanged {
    pub entity: Entity,
    pub event: GrappleEvent,
}
