//! InAir: air control + поведение у стены
//!
//! Порядок у стены (позднее перекрывает раннее):
//! 1. wall jump (jump edge, лимит прыжков)
//! 2. ledge (верхний луч попал, нижний нет → подброс)
//! 3. wall slide → wall run
//!
//! Горизонталь везде считается в world space, вертикаль отдельно.

use bevy::prelude::*;

use crate::config::MovementTuning;
use crate::physics::{checked_raycast, CollisionProbe, WallContact, LEDGE_PROBE_MASK};

/// Горизонтальная часть вектора
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Ограничить горизонтальную скорость, не трогая вертикаль
#[inline]
pub fn clamp_horizontal(v: Vec3, max: f32) -> Vec3 {
    flatten(v).clamp_length_max(max.max(0.0)) + Vec3::Y * v.y
}

/// Air control за один tick
///
/// `horizontal` — горизонталь аккумулятора, `wish` — world направление input
/// (forward * y + right * x). Если стартовали медленнее 1.5 × movement_speed,
/// обычный input не разгоняет выше movement_speed. Потолок max_air_speed — всегда.
pub fn air_accelerate(horizontal: Vec3, wish: Vec3, dt: f32, tuning: &MovementTuning) -> Vec3 {
    let start_speed = flatten(horizontal).length();
    let accel = tuning.movement_speed * tuning.air_control * dt;

    let mut next = flatten(horizontal) + flatten(wish) * accel;
    if start_speed < tuning.movement_speed * 1.5 {
        next = next.clamp_length_max(tuning.movement_speed);
    }

    next.clamp_length_max(tuning.max_air_speed)
}

/// Что сделала стена за этот tick (для tilt камеры и логов)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallOutcome {
    pub wall_jumped: bool,
    pub ledge_boost: bool,
    pub wall_sliding: bool,
    pub wall_running: bool,
}

impl WallOutcome {
    pub fn on_wall(&self) -> bool {
        self.wall_sliding || self.wall_running
    }
}

/// Входные данные для стеночной логики
pub struct WallInput<'a> {
    pub contact: WallContact,
    pub position: Vec3,
    pub forward: Vec3,
    pub axis: Vec2,
    pub wish: Vec3,
    pub jump: bool,
    pub probe: &'a dyn CollisionProbe,
}

/// Стеночное поведение поверх air velocity
///
/// `wall_jumps` — счётчик прыжков от стены с последнего входа в InAir.
pub fn apply_wall_behaviour(
    velocity: Vec3,
    wall: &WallInput<'_>,
    wall_jumps: &mut u32,
    tuning: &MovementTuning,
) -> (Vec3, WallOutcome) {
    let mut velocity = velocity;
    let mut outcome = WallOutcome::default();

    if !wall.contact.is_active {
        return (velocity, outcome);
    }

    // Wall jump: от точки контакта, по горизонтали
    if wall.jump && *wall_jumps < tuning.max_wall_jumps {
        let away = flatten(wall.position - wall.contact.contact_point).normalize_or_zero();
        velocity = away * tuning.wall_jump_force + Vec3::Y * tuning.jump_force;
        *wall_jumps += 1;
        outcome.wall_jumped = true;
    }

    // Ledge: стена на уровне плеч есть, у ног нет
    if detect_ledge(wall.probe, wall.position, wall.forward, tuning) {
        velocity.y = tuning.ledge_jump_velocity;
        outcome.ledge_boost = true;
    }

    // Wall slide: input смотрит в стену, падаем
    let to_wall = flatten(wall.contact.contact_point - wall.position).normalize_or_zero();
    let wish_dir = flatten(wall.wish).normalize_or_zero();
    if wish_dir != Vec3::ZERO && to_wall != Vec3::ZERO && velocity.y < 0.0 {
        let angle = wish_dir.angle_between(to_wall).to_degrees();
        if angle <= tuning.wall_slide_angle {
            // Скорость вдоль стены до override
            let tangent = wall_tangent(to_wall, velocity);
            let along = flatten(velocity).dot(tangent);

            velocity = wall.wish * tuning.movement_speed;
            velocity.y = -tuning.wall_slide_fall_speed;
            outcome.wall_sliding = true;

            if along > tuning.wall_run_trigger_speed && wall.axis.y > 0.0 {
                velocity = tangent * tuning.wall_run_speed;
                outcome.wall_running = true;
                outcome.wall_sliding = false;
            }
        }
    }

    (velocity, outcome)
}

/// Касательная к стене, направленная по текущему горизонтальному движению
fn wall_tangent(to_wall: Vec3, velocity: Vec3) -> Vec3 {
    let tangent = Vec3::Y.cross(to_wall).normalize_or_zero();
    if flatten(velocity).dot(tangent) < 0.0 {
        -tangent
    } else {
        tangent
    }
}

/// Два луча вперёд: на `ledge_high_height` попал, на `ledge_low_height` нет
pub fn detect_ledge(
    probe: &dyn CollisionProbe,
    position: Vec3,
    forward: Vec3,
    tuning: &MovementTuning,
) -> bool {
    let direction = flatten(forward).normalize_or_zero();
    let low = checked_raycast(
        probe,
        position + Vec3::Y * tuning.ledge_low_height,
        direction,
        tuning.ledge_ray_distance,
        LEDGE_PROBE_MASK,
    );
    let high = checked_raycast(
        probe,
        position + Vec3::Y * tuning.ledge_high_height,
        direction,
        tuning.ledge_ray_distance,
        LEDGE_PROBE_MASK,
    );

    high.is_some() && low.is_none()
}
