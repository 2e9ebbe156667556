//! Таймеры состояний на accumulated simulated time
//!
//! Dash, Jumping, окно атаки, release delay и pull timeout считают время
//! одинаково: `elapsed += dt` каждый tick, срабатывание при
//! `elapsed + TIME_EPSILON >= duration`. Число tick'ов = `ceil(duration / dt)`
//! независимо от шума накопления float.

/// Допуск сравнения накопленного времени (секунды)
pub const TIME_EPSILON: f32 = 1e-4;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StateTimer {
    elapsed: f32,
}

impl StateTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }

    pub fn tick(&mut self, dt: f32) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Прошло ли `duration` секунд
    pub fn reached(&self, duration: f32) -> bool {
        self.elapsed + TIME_EPSILON >= duration
    }

    /// Оставшееся время (не меньше 0)
    pub fn remaining(&self, duration: f32) -> f32 {
        (duration - self.elapsed).max(0.0)
    }
}
