//! Mouse look: yaw тела + pitch камеры
//!
//! Yaw (радианы) вращает тело вокруг +Y, pitch (градусы, + = вниз) — только камеру.
//! Forward тела = `yaw * -Z`, right = `yaw * +X`.

use bevy::prelude::*;

use crate::config::LookTuning;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LookState {
    yaw: f32,
    pitch: f32,
}

impl LookState {
    pub fn new(yaw: f32) -> Self {
        Self { yaw, pitch: 0.0 }
    }

    /// Применить look delta: positive dx поворачивает вправо, positive dy — вверх
    pub fn apply(&mut self, delta: Vec2, tuning: &LookTuning) {
        self.yaw -= (delta.x * tuning.sensitivity_x).to_radians();
        self.yaw = self.yaw.rem_euclid(std::f32::consts::TAU);

        self.pitch -= delta.y * tuning.sensitivity_y;
        // Tuning мог не пройти validate(): max_pitch < 0 или NaN без паники
        let limit = tuning.max_pitch.abs();
        self.pitch = self.pitch.max(-limit).min(limit);
    }

    /// Yaw в радианах
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Pitch в градусах (+ вниз)
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn body_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Flattened forward тела (unit)
    pub fn forward(&self) -> Vec3 {
        self.body_rotation() * Vec3::NEG_Z
    }

    /// Flattened right тела (unit)
    pub fn right(&self) -> Vec3 {
        self.body_rotation() * Vec3::X
    }

    /// Forward камеры с учётом pitch (луч grapple)
    pub fn camera_forward(&self) -> Vec3 {
        let pitch = Quat::from_rotation_x(-self.pitch.to_radians());
        (self.body_rotation() * pitch * Vec3::NEG_Z).normalize_or_zero()
    }
}

/// Наклон камеры (градусы): сильнее при движении по стене
pub fn camera_tilt(axis_x: f32, on_wall: bool, tuning: &LookTuning) -> f32 {
    let max_tilt = if on_wall {
        tuning.wall_tilt
    } else {
        tuning.strafe_tilt
    };
    -axis_x * max_tilt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        a.distance(b) < 1e-4
    }

    #[test]
    fn test_default_axes() {
        let look = LookState::default();
        assert!(approx(look.forward(), Vec3::NEG_Z));
        assert!(approx(look.right(), Vec3::X));
        assert!(approx(look.camera_forward(), Vec3::NEG_Z));
    }

    #[test]
    fn test_positive_dx_turns_right() {
        let tuning = LookTuning {
            sensitivity_x: 1.0,
            ..default()
        };
        let mut look = LookState::default();
        look.apply(Vec2::new(90.0, 0.0), &tuning);

        // Повернулись на 90° вправо: forward смотрит туда, где был right
        assert!(approx(look.forward(), Vec3::X), "forward = {:?}", look.forward());
    }

    #[test]
    fn test_pitch_clamped() {
        let tuning = LookTuning {
            sensitivity_y: 1.0,
            ..default()
        };
        let mut look = LookState::default();
        look.apply(Vec2::new(0.0, 500.0), &tuning);
        assert_eq!(look.pitch(), -tuning.max_pitch);

        look.apply(Vec2::new(0.0, -1000.0), &tuning);
        assert_eq!(look.pitch(), tuning.max_pitch);
    }

    #[test]
    fn test_negative_max_pitch_uses_magnitude() {
        let tuning = LookTuning {
            sensitivity_y: 1.0,
            max_pitch: -45.0,
            ..default()
        };
        let mut look = LookState::default();
        look.apply(Vec2::new(0.0, 500.0), &tuning);
        assert_eq!(look.pitch(), -45.0);

        look.apply(Vec2::new(0.0, -1000.0), &tuning);
        assert_eq!(look.pitch(), 45.0);
    }

    #[test]
    fn test_nan_max_pitch_does_not_panic() {
        let tuning = LookTuning {
            sensitivity_y: 1.0,
            max_pitch: f32::NAN,
            ..default()
        };
        let mut look = LookState::default();
        look.apply(Vec2::new(0.0, 10.0), &tuning);
        assert!(look.camera_forward().is_finite());
    }

    #[test]
    fn test_camera_looks_up_on_positive_dy() {
        let tuning = LookTuning {
            sensitivity_y: 1.0,
            ..default()
        };
        let mut look = LookState::default();
        look.apply(Vec2::new(0.0, 30.0), &tuning);
        assert!(look.camera_forward().y > 0.4);
        // Тело не наклоняется
        assert!(approx(look.forward(), Vec3::NEG_Z));
    }

    #[test]
    fn test_tilt_uses_wall_amount_on_wall() {
        let tuning = LookTuning::default();
        assert_eq!(camera_tilt(1.0, false, &tuning), -tuning.strafe_tilt);
        assert_eq!(camera_tilt(-1.0, true, &tuning), tuning.wall_tilt);
    }
}
