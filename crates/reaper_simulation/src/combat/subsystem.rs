//! CombatSubsystem: владеет окном атаки

use bevy::prelude::*;

use super::attack::{AttackWindow, HitEvent};
use crate::config::CombatTuning;
use crate::logger;
use crate::movement::air::flatten;
use crate::physics::{checked_raycast, CollisionProbe, RigidBody};

/// Результат одного tick атаки
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CombatTick {
    pub hits: Vec<HitEvent>,
    /// Окно закончилось, velocity возвращается movement
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct CombatSubsystem {
    tuning: CombatTuning,
    window: Option<AttackWindow>,
}

impl CombatSubsystem {
    pub fn new(tuning: CombatTuning) -> Self {
        Self {
            tuning,
            window: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.window.is_none()
    }

    pub fn window(&self) -> Option<&AttackWindow> {
        self.window.as_ref()
    }

    /// Открыть окно (`false`, если уже атакуем)
    pub fn start(&mut self) -> bool {
        if self.window.is_some() {
            return false;
        }
        self.window = Some(AttackWindow::new(&self.tuning));
        logger::log("Combat: attack started");
        true
    }

    pub fn cancel(&mut self) {
        self.window = None;
    }

    /// Один tick активного окна
    ///
    /// Velocity = flattened forward × attack_velocity (вертикаль сохраняется),
    /// затем forward луч из `body + attack_height` ищет врагов.
    pub fn advance(
        &mut self,
        dt: f32,
        probe: &dyn CollisionProbe,
        body: &mut dyn RigidBody,
        forward: Vec3,
    ) -> CombatTick {
        let Some(window) = self.window.as_mut() else {
            return CombatTick::default();
        };

        let direction = flatten(forward).normalize_or_zero();
        let vertical = body.velocity().y;
        body.set_velocity(direction * self.tuning.attack_velocity + Vec3::Y * vertical);

        let mut tick = CombatTick::default();
        let origin = body.position() + Vec3::Y * self.tuning.attack_height;
        if let Some(hit) = checked_raycast(probe, origin, direction, window.range, window.hit_mask) {
            if let Some(event) = window.register_hit(hit.collider, hit.point) {
                logger::log_info(&format!(
                    "Combat: hit {:?} for {} at {:?}",
                    event.target, event.damage, event.point
                ));
                tick.hits.push(event);
            }
        }

        window.tick(dt);
        if window.is_finished() {
            logger::log(&format!("Combat: window closed after {:.3}s", window.elapsed()));
            self.window = None;
            tick.finished = true;
        }

        tick
    }
}
