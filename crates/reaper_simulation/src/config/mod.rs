//! Tuning параметры (все константы скоростей/сил/дальностей/времён)
//!
//! Меняются без перекомпиляции: `LocomotionTuning::load("assets/locomotion.ron")`.
//! Любое поле можно опустить в RON — берётся `Default`.

mod loader;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::HitPolicy;

pub use loader::ConfigError;

/// Полный набор tuning параметров персонажа
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionTuning {
    pub movement: MovementTuning,
    pub grapple: GrappleTuning,
    pub combat: CombatTuning,
    pub look: LookTuning,
}

/// Locomotion: бег, прыжок, dash, slide, воздух, стены
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    // Running and jumping
    pub movement_speed: f32,
    pub jump_force: f32,
    /// Сколько держится Jumping до перехода в InAir (секунды)
    pub jump_hold_time: f32,

    // Sliding and dashing
    pub slide_speed: f32,
    /// Lerp фактор затухания slide скорости за tick (0..1)
    pub slide_decay: f32,
    /// Постоянный bias вниз во время slide (m/s²)
    pub slide_fall_increase: f32,
    pub slide_movement_multiplier: f32,
    /// Насколько падение ускоряет затухание slide
    pub slide_fall_multiplier: f32,
    /// Ниже этой slide скорости без input → Crouch
    pub crouch_enter_speed: f32,
    pub dash_force: f32,
    pub dash_time: f32,
    pub max_stamina: u32,

    // Air movement
    pub air_control: f32,
    pub max_air_speed: f32,

    // Walls
    pub max_wall_jumps: u32,
    pub wall_jump_force: f32,
    pub wall_run_speed: f32,
    /// Скорость сползания по стене (положительная, применяется вниз)
    pub wall_slide_fall_speed: f32,
    /// Допуск угла между input и направлением на стену (градусы)
    pub wall_slide_angle: f32,
    /// Минимальная скорость вдоль стены для wall run
    pub wall_run_trigger_speed: f32,

    // Ledge
    pub ledge_low_height: f32,
    pub ledge_high_height: f32,
    pub ledge_ray_distance: f32,
    pub ledge_jump_velocity: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            movement_speed: 10.0,
            jump_force: 15.0,
            jump_hold_time: 0.25,

            slide_speed: 20.0,
            slide_decay: 0.1,
            slide_fall_increase: 5.0,
            slide_movement_multiplier: 0.5,
            slide_fall_multiplier: 1.5,
            crouch_enter_speed: 0.5,
            dash_force: 30.0,
            dash_time: 0.2,
            max_stamina: 2,

            air_control: 0.5,
            max_air_speed: 10.0,

            max_wall_jumps: 2,
            wall_jump_force: 10.0,
            wall_run_speed: 10.0,
            wall_slide_fall_speed: 8.0,
            wall_slide_angle: 60.0,
            wall_run_trigger_speed: 4.0,

            ledge_low_height: -0.5,
            ledge_high_height: 0.8,
            ledge_ray_distance: 1.0,
            ledge_jump_velocity: 8.0,
        }
    }
}

/// Grapple: поиск якоря + упругая тяга
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrappleTuning {
    /// Скорость движения виртуального якоря при поиске (m/s)
    pub search_speed: f32,
    pub range: f32,
    /// Высота камеры над позицией тела (origin луча поиска)
    pub eye_height: f32,
    /// Мгновенный горизонтальный kick к якорю при attach
    pub pull_kick: f32,
    pub pull_vertical_kick: f32,
    pub min_distance_fraction: f32,
    pub max_distance_fraction: f32,
    pub spring: f32,
    pub damper: f32,
    pub mass: f32,
    /// Пауза перед возвратом управления movement после release (секунды)
    pub release_delay: f32,
    /// `None` — тяга без таймаута (держится до release)
    pub max_pull_time: Option<f32>,
    /// `Some(d)` — auto release когда тело ближе `d` к якорю
    pub release_distance: Option<f32>,
}

impl Default for GrappleTuning {
    fn default() -> Self {
        Self {
            search_speed: 120.0,
            range: 100.0,
            eye_height: 0.6,
            pull_kick: 12.0,
            pull_vertical_kick: 6.0,
            min_distance_fraction: 0.25,
            max_distance_fraction: 0.8,
            spring: 45.0,
            damper: 7.0,
            mass: 4.5,
            release_delay: 0.1,
            max_pull_time: None,
            release_distance: None,
        }
    }
}

/// Melee атака
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub attack_time: f32,
    pub attack_velocity: f32,
    pub attack_range: f32,
    pub attack_damage: u32,
    /// Высота луча атаки над позицией тела
    pub attack_height: f32,
    pub hit_policy: HitPolicy,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            attack_time: 0.35,
            attack_velocity: 14.0,
            attack_range: 2.5,
            attack_damage: 25,
            attack_height: 0.4,
            hit_policy: HitPolicy::PerTick,
        }
    }
}

/// Mouse look
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookTuning {
    /// Градусы yaw на единицу look delta по X
    pub sensitivity_x: f32,
    /// Градусы pitch на единицу look delta по Y
    pub sensitivity_y: f32,
    pub max_pitch: f32,
    /// Наклон камеры при strafe (градусы на полный input)
    pub strafe_tilt: f32,
    /// Наклон камеры при движении по стене
    pub wall_tilt: f32,
}

impl Default for LookTuning {
    fn default() -> Self {
        Self {
            sensitivity_x: 0.1,
            sensitivity_y: 0.1,
            max_pitch: 89.0,
            strafe_tilt: 2.0,
            wall_tilt: 12.0,
        }
    }
}

impl LocomotionTuning {
    /// Проверка диапазонов (отрицательные времена, нулевая масса и т.п.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.movement;
        let g = &self.grapple;
        let c = &self.combat;

        let non_negative = [
            ("movement.movement_speed", m.movement_speed),
            ("movement.jump_force", m.jump_force),
            ("movement.jump_hold_time", m.jump_hold_time),
            ("movement.slide_speed", m.slide_speed),
            ("movement.slide_fall_increase", m.slide_fall_increase),
            ("movement.slide_movement_multiplier", m.slide_movement_multiplier),
            ("movement.slide_fall_multiplier", m.slide_fall_multiplier),
            ("movement.crouch_enter_speed", m.crouch_enter_speed),
            ("movement.dash_force", m.dash_force),
            ("movement.air_control", m.air_control),
            ("movement.max_air_speed", m.max_air_speed),
            ("movement.wall_jump_force", m.wall_jump_force),
            ("movement.wall_run_speed", m.wall_run_speed),
            ("movement.wall_slide_fall_speed", m.wall_slide_fall_speed),
            ("movement.wall_slide_angle", m.wall_slide_angle),
            ("movement.wall_run_trigger_speed", m.wall_run_trigger_speed),
            ("movement.ledge_ray_distance", m.ledge_ray_distance),
            ("grapple.eye_height", g.eye_height),
            ("grapple.pull_kick", g.pull_kick),
            ("grapple.pull_vertical_kick", g.pull_vertical_kick),
            ("grapple.spring", g.spring),
            ("grapple.damper", g.damper),
            ("grapple.release_delay", g.release_delay),
            ("combat.attack_velocity", c.attack_velocity),
            ("combat.attack_range", c.attack_range),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::invalid(field, format!("must be >= 0, got {value}")));
            }
        }

        let positive = [
            ("movement.dash_time", m.dash_time),
            ("grapple.search_speed", g.search_speed),
            ("grapple.range", g.range),
            ("grapple.mass", g.mass),
            ("combat.attack_time", c.attack_time),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::invalid(field, format!("must be > 0, got {value}")));
            }
        }

        if !(0.0..=1.0).contains(&m.slide_decay) {
            return Err(ConfigError::invalid(
                "movement.slide_decay",
                format!("must be in [0, 1], got {}", m.slide_decay),
            ));
        }

        if g.min_distance_fraction <= 0.0 || g.min_distance_fraction > g.max_distance_fraction {
            return Err(ConfigError::invalid(
                "grapple.min_distance_fraction",
                format!(
                    "need 0 < min ({}) <= max ({})",
                    g.min_distance_fraction, g.max_distance_fraction
                ),
            ));
        }

        if let Some(limit) = g.max_pull_time {
            if limit <= 0.0 {
                return Err(ConfigError::invalid(
                    "grapple.max_pull_time",
                    format!("must be > 0 when set, got {limit}"),
                ));
            }
        }

        if self.look.max_pitch <= 0.0 || self.look.max_pitch > 90.0 {
            return Err(ConfigError::invalid(
                "look.max_pitch",
                format!("must be in (0, 90], got {}", self.look.max_pitch),
            ));
        }

        Ok(())
    }
}
