//! Tether data: anchor + spring-damper joint
//!
//! Joint — не жёсткий стержень: пока тело внутри `[min, max]` от якоря,
//! сила нулевая; снаружи — пружина + демпфер вдоль линии к якорю.
//! Результат — изменение velocity (без телепорта позиции).

use bevy::prelude::*;

/// Фаза tether
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum TetherPhase {
    /// Виртуальный якорь летит по лучу камеры
    Searching,
    /// Якорь в стене, идёт тяга
    Attached,
}

/// Tether: создаётся при запуске grapple, уничтожается при release/miss
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrappleTether {
    pub anchor_point: Vec3,
    pub phase: TetherPhase,
    /// Время в текущей фазе (секунды)
    pub elapsed: f32,
    /// Velocity тела сразу после kick на attach
    pub initial_pull_velocity: Vec3,
    /// Направление поиска (camera forward на момент запуска)
    pub direction: Vec3,
    /// Пройденная якорем дистанция при поиске
    pub travelled: f32,
}

impl GrappleTether {
    pub fn searching(origin: Vec3, direction: Vec3) -> Self {
        Self {
            anchor_point: origin,
            phase: TetherPhase::Searching,
            elapsed: 0.0,
            initial_pull_velocity: Vec3::ZERO,
            direction,
            travelled: 0.0,
        }
    }
}

/// Упругое ограничение расстояния до якоря
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TetherJoint {
    pub anchor: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    pub spring: f32,
    pub damper: f32,
    pub mass: f32,
}

impl TetherJoint {
    /// Изменение velocity за `dt`
    ///
    /// Внутри `[min, max]` → ноль. Снаружи: F = k·x − c·v (вдоль линии к якорю), dv = F/m·dt.
    pub fn velocity_change(&self, position: Vec3, velocity: Vec3, dt: f32) -> Vec3 {
        let offset = self.anchor - position;
        let distance = offset.length();
        if distance < 1e-6 || self.mass <= 0.0 || self.is_slack(position) {
            return Vec3::ZERO;
        }
        let toward = offset / distance;

        // Положительная = летим к якорю
        let closing_speed = velocity.dot(toward);

        let stretch = if distance > self.max_distance {
            distance - self.max_distance
        } else {
            distance - self.min_distance
        };
        let force = self.spring * stretch - self.damper * closing_speed;

        toward * (force / self.mass * dt)
    }

    /// Тело внутри `[min, max]`: joint не действует
    pub fn is_slack(&self, position: Vec3) -> bool {
        let distance = self.anchor.distance(position);
        (self.min_distance..=self.max_distance).contains(&distance)
    }
}
