use bevy::prelude::*;

use crate::config::LocomotionTuning;
use crate::controller::CharacterController;
use crate::input::{BufferedInput, InputSample, InputSource};
use crate::physics::rapier::collider_id;
use crate::physics::ContactPhase;

/// Расстояние ground луча от центра capsule (половина высоты + запас)
pub const DEFAULT_GROUND_PROBE_DISTANCE: f32 = 1.025;

/// CharacterController как ECS компонент
#[derive(Component, Debug, Clone)]
pub struct LocomotionController {
    pub controller: CharacterController,
    pub ground_probe_distance: f32,
}

impl LocomotionController {
    pub fn new(tuning: LocomotionTuning) -> Self {
        Self {
            controller: CharacterController::new(tuning),
            ground_probe_distance: DEFAULT_GROUND_PROBE_DISTANCE,
        }
    }

    /// Контроллер, который знает собственный коллайдер (grapple его пропускает)
    pub fn for_entity(entity: Entity, tuning: LocomotionTuning) -> Self {
        Self {
            controller: CharacterController::new(tuning).with_collider(collider_id(entity)),
            ground_probe_distance: DEFAULT_GROUND_PROBE_DISTANCE,
        }
    }
}

/// Input игрока: host пишет `press_*` из своих input систем
#[derive(Component, Debug, Clone, Default, Deref, DerefMut)]
pub struct PlayerInput(pub BufferedInput);

impl InputSource for PlayerInput {
    fn take_sample(&mut self) -> InputSample {
        self.0.take_sample()
    }
}

/// Стены, которых касается персонаж (из Rapier collision events)
///
/// `drain()` раз в tick отдаёт фазы: сначала Exit, потом Enter/Stay.
#[derive(Component, Debug, Clone, Default)]
pub struct WallTouches {
    touching: Vec<Entity>,
    entered: Vec<Entity>,
    exited: Vec<Entity>,
}

impl WallTouches {
    pub fn touching(&self) -> &[Entity] {
        &self.touching
    }

    pub fn start(&mut self, wall: Entity) {
        if !self.touching.contains(&wall) {
            self.touching.push(wall);
            self.touching.sort();
        }
        self.exited.retain(|other| *other != wall);
        if !self.entered.contains(&wall) {
            self.entered.push(wall);
        }
    }

    /// Stopped приходит и для despawned коллайдеров
    pub fn stop(&mut self, wall: Entity) {
        let was_touching = self.touching.contains(&wall);
        self.touching.retain(|other| *other != wall);
        self.entered.retain(|other| *other != wall);
        if was_touching && !self.exited.contains(&wall) {
            self.exited.push(wall);
        }
    }

    pub fn drain(&mut self) -> Vec<(Entity, ContactPhase)> {
        let mut phases: Vec<(Entity, ContactPhase)> = self
            .exited
            .drain(..)
            .map(|wall| (wall, ContactPhase::Exit))
            .collect();

        for wall in &self.touching {
            let phase = if self.entered.contains(wall) {
                ContactPhase::Enter
            } else {
                ContactPhase::Stay
            };
            phases.push((*wall, phase));
        }
        self.entered.clear();

        phases
    }
}
