//! Stamina: целочисленный ресурс для dash
//!
//! Инвариант: `0 <= current <= max`.

/// Счётчик stamina (заряды dash)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamina {
    current: u32,
    max: u32,
}

impl Stamina {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn can_dash(&self) -> bool {
        self.current > 0
    }

    /// Потратить один заряд. `false` если пусто (ничего не меняется)
    pub fn consume(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn refill(&mut self) {
        self.current = self.max;
    }
}
