//! Player input → `InputSample`
//!
//! Архитектура:
//! - Host (Bevy input system, скрипт теста) пишет в `BufferedInput`
//! - Раз в fixed tick контроллер забирает `InputSample` через `take_sample()`
//! - Edge-кнопки (jump, dash, ...) "consume once": после take они сброшены
//!
//! Binding клавиш — вне ядра.

use bevy::prelude::*;

/// Снимок input на один tick (immutable)
///
/// # Coordinate System
/// - `move_axis.x`: -1.0 (left) → +1.0 (right)
/// - `move_axis.y`: -1.0 (backward) → +1.0 (forward)
/// - `look_delta`: mouse delta, x — yaw, y — pitch
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSample {
    pub move_axis: Vec2,
    pub look_delta: Vec2,
    pub jump: bool,
    pub crouch_toggle: bool,
    pub dash: bool,
    pub attack: bool,
    /// Запуск grapple; во время тяги — release
    pub grapple: bool,
}

impl InputSample {
    /// Clamp осей в [-1, 1], NaN/inf → 0
    pub fn sanitized(mut self) -> Self {
        self.move_axis = sanitize_axis(self.move_axis).clamp(Vec2::NEG_ONE, Vec2::ONE);
        self.look_delta = sanitize_axis(self.look_delta);
        self
    }

    pub fn has_move_input(&self) -> bool {
        self.move_axis != Vec2::ZERO
    }

    /// Builder helpers (тесты, scripted input)
    pub fn with_axis(mut self, x: f32, y: f32) -> Self {
        self.move_axis = Vec2::new(x, y);
        self
    }

    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    pub fn with_dash(mut self) -> Self {
        self.dash = true;
        self
    }

    pub fn with_attack(mut self) -> Self {
        self.attack = true;
        self
    }

    pub fn with_grapple(mut self) -> Self {
        self.grapple = true;
        self
    }

    pub fn with_crouch_toggle(mut self) -> Self {
        self.crouch_toggle = true;
        self
    }
}

fn sanitize_axis(value: Vec2) -> Vec2 {
    Vec2::new(
        if value.x.is_finite() { value.x } else { 0.0 },
        if value.y.is_finite() { value.y } else { 0.0 },
    )
}

/// Источник input сэмплов (один на tick)
pub trait InputSource {
    fn take_sample(&mut self) -> InputSample;
}

/// Буфер input между кадрами рендера и fixed tick
///
/// Host вызывает `press_*` когда кнопка нажата (just_pressed), `set_*` для осей.
/// Look delta накапливается до следующего tick.
#[derive(Debug, Clone, Default)]
pub struct BufferedInput {
    move_axis: Vec2,
    look_delta: Vec2,
    jump: bool,
    crouch_toggle: bool,
    dash: bool,
    attack: bool,
    grapple: bool,
}

impl BufferedInput {
    pub fn set_move_axis(&mut self, axis: Vec2) {
        self.move_axis = axis;
    }

    pub fn add_look_delta(&mut self, delta: Vec2) {
        self.look_delta += delta;
    }

    pub fn press_jump(&mut self) {
        self.jump = true;
    }

    pub fn press_crouch_toggle(&mut self) {
        // Два toggle между tick'ами гасят друг друга
        self.crouch_toggle = !self.crouch_toggle;
    }

    pub fn press_dash(&mut self) {
        self.dash = true;
    }

    pub fn press_attack(&mut self) {
        self.attack = true;
    }

    pub fn press_grapple(&mut self) {
        self.grapple = true;
    }
}

impl InputSource for BufferedInput {
    fn take_sample(&mut self) -> InputSample {
        let sample = InputSample {
            move_axis: self.move_axis,
            look_delta: self.look_delta,
            jump: self.jump,
            crouch_toggle: self.crouch_toggle,
            dash: self.dash,
            attack: self.attack,
            grapple: self.grapple,
        };

        // Consume once: edges и накопленный look сбрасываются, ось остаётся (held)
        self.look_delta = Vec2::ZERO;
        self.jump = false;
        self.crouch_toggle = false;
        self.dash = false;
        self.attack = false;
        self.grapple = false;

        sample.sanitized()
    }
}

/// Scripted input: заранее записанная последовательность (тесты, headless)
///
/// После конца скрипта отдаёт пустые сэмплы.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    samples: std::collections::VecDeque<InputSample>,
}

impl ScriptedInput {
    pub fn new(samples: impl IntoIterator<Item = InputSample>) -> Self {
        Self {
            samples: samples.into_iter().collect(),
        }
    }

    pub fn push(&mut self, sample: InputSample) {
        self.samples.push_back(sample);
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl InputSource for ScriptedInput {
    fn take_sample(&mut self) -> InputSample {
        self.samples.pop_front().unwrap_or_default().sanitized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_clamps_axis() {
        let sample = InputSample::default().with_axis(3.0, -7.5).sanitized();
        assert_eq!(sample.move_axis, Vec2::new(1.0, -1.0));
    }

    #[test]
    fn test_sanitize_drops_nan() {
        let sample = InputSample {
            move_axis: Vec2::new(f32::NAN, 0.5),
            look_delta: Vec2::new(f32::INFINITY, 2.0),
            ..default()
        }
        .sanitized();

        assert_eq!(sample.move_axis, Vec2::new(0.0, 0.5));
        assert_eq!(sample.look_delta, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn test_edges_consumed_once() {
        let mut input = BufferedInput::default();
        input.set_move_axis(Vec2::new(0.0, 1.0));
        input.press_jump();
        input.press_dash();

        let first = input.take_sample();
        assert!(first.jump);
        assert!(first.dash);
        assert_eq!(first.move_axis, Vec2::new(0.0, 1.0));

        let second = input.take_sample();
        assert!(!second.jump);
        assert!(!second.dash);
        // Ось — held state, не edge
        assert_eq!(second.move_axis, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_look_delta_accumulates_until_take() {
        let mut input = BufferedInput::default();
        input.add_look_delta(Vec2::new(1.0, 0.0));
        input.add_look_delta(Vec2::new(2.0, -1.0));

        assert_eq!(input.take_sample().look_delta, Vec2::new(3.0, -1.0));
        assert_eq!(input.take_sample().look_delta, Vec2::ZERO);
    }

    #[test]
    fn test_double_crouch_toggle_cancels() {
        let mut input = BufferedInput::default();
        input.press_crouch_toggle();
        input.press_crouch_toggle();
        assert!(!input.take_sample().crouch_toggle);
    }

    #[test]
    fn test_scripted_input_runs_out() {
        let mut script = ScriptedInput::new([InputSample::default().with_jump()]);
        assert_eq!(script.remaining(), 1);
        assert!(script.take_sample().jump);
        assert_eq!(script.take_sample(), InputSample::default());
    }
}
