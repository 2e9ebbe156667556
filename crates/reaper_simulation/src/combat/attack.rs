//! Окно melee атаки
//!
//! One-shot по таймеру: тело толкается вперёд, forward луч каждый tick
//! ищет врагов

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::CombatTuning;
use crate::physics::{ColliderId, LayerMask, ATTACK_MASK};
use crate::timer::StateTimer;

// ============================================================================
// Hit policy
// ============================================================================

/// Сколько раз одно окно может ударить одну и ту же цель
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
pub enum HitPolicy {
    /// Hit каждый tick, пока луч попадает
    #[default]
    PerTick,
    /// Не больше одного hit на коллайдер за окно
    OncePerTarget,
}

/// Событие урона для host (`OnHit(target, damage)`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitEvent {
    pub target: ColliderId,
    pub damage: u32,
    pub point: Vec3,
}

// ============================================================================
// Attack window
// ============================================================================

/// Активная атака
///
/// Создаётся по attack input, живёт пока `elapsed < duration`.
/// `struck` — уже ударенные коллайдеры (для `OncePerTarget`).
#[derive(Debug, Clone, PartialEq)]
pub struct AttackWindow {
    timer: StateTimer,
    pub duration: f32,
    pub damage: u32,
    pub range: f32,
    pub hit_mask: LayerMask,
    pub policy: HitPolicy,
    struck: Vec<ColliderId>,
}

impl AttackWindow {
    pub fn new(tuning: &CombatTuning) -> Self {
        Self {
            timer: StateTimer::new(),
            duration: tuning.attack_time,
            damage: tuning.attack_damage,
            range: tuning.attack_range,
            hit_mask: ATTACK_MASK,
            policy: tuning.hit_policy,
            struck: Vec::new(),
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.timer.elapsed()
    }

    pub fn tick(&mut self, dt: f32) {
        self.timer.tick(dt);
    }

    pub fn is_finished(&self) -> bool {
        self.timer.reached(self.duration)
    }

    /// Hit луча → событие, если policy разрешает
    pub fn register_hit(&mut self, target: ColliderId, point: Vec3) -> Option<HitEvent> {
        if self.policy == HitPolicy::OncePerTarget {
            if self.struck.contains(&target) {
                return None;
            }
            self.struck.push(target);
        }

        Some(HitEvent {
            target,
            damage: self.damage,
            point,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_tick_repeats_hits() {
        let mut window = AttackWindow::new(&CombatTuning::default());
        assert!(window.register_hit(ColliderId(3), Vec3::ZERO).is_some());
        assert!(window.register_hit(ColliderId(3), Vec3::ZERO).is_some());
    }

    #[test]
    fn test_once_per_target() {
        let tuning = CombatTuning {
            hit_policy: HitPolicy::OncePerTarget,
            ..default()
        };
        let mut window = AttackWindow::new(&tuning);

        let hit = window.register_hit(ColliderId(3), Vec3::X).expect("first hit");
        assert_eq!(hit.damage, tuning.attack_damage);
        assert!(window.register_hit(ColliderId(3), Vec3::X).is_none());
        // Другая цель — свой первый hit
        assert!(window.register_hit(ColliderId(4), Vec3::X).is_some());
    }

    #[test]
    fn test_window_expires_at_duration() {
        let tuning = CombatTuning {
            attack_time: 1.0,
            ..default()
        };
        let mut window = AttackWindow::new(&tuning);
        for _ in 0..59 {
            window.tick(1.0 / 60.0);
        }
        assert!(!window.is_finished());
        window.tick(1.0 / 60.0);
        assert!(window.is_finished());
    }
}
