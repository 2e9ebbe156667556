//! GrappleSubsystem: Idle → Searching → Pulling → Idle
//!
//! Searching не пишет velocity (movement остаётся owner).
//! Pulling пишет velocity через `TetherJoint`, movement выключен.

use bevy::prelude::*;

use super::tether::{GrappleTether, TetherJoint, TetherPhase};
use crate::config::GrappleTuning;
use crate::logger;
use crate::movement::air::flatten;
use crate::physics::{
    checked_raycast, CollisionProbe, ColliderId, RigidBody, SurfaceTag, GRAPPLE_SEARCH_MASK,
};
use crate::timer::StateTimer;

/// Допуск сравнения пройденной дистанции с range
const RANGE_EPSILON: f32 = 1e-4;

/// Фаза подсистемы
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum GrappleState {
    #[default]
    Idle,
    Searching,
    Pulling,
}

/// Результат одного tick поиска
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchOutcome {
    /// Якорь ещё летит
    Travelling,
    /// Попали в стену, якорь зафиксирован
    Attached { anchor: Vec3 },
    /// Дальность исчерпана, tether удалён
    Missed,
}

/// Причина окончания тяги
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseReason {
    Input,
    Timeout,
    Distance,
}

/// Результат одного tick тяги
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PullOutcome {
    Holding,
    Released {
        velocity: Vec3,
        reason: ReleaseReason,
    },
}

#[derive(Debug, Clone)]
pub struct GrappleSubsystem {
    tuning: GrappleTuning,
    tether: Option<GrappleTether>,
    joint: Option<TetherJoint>,
    pull_timer: StateTimer,
    /// Точка камеры на последнем tick (начало tether для рендера)
    origin: Vec3,
}

impl GrappleSubsystem {
    pub fn new(tuning: GrappleTuning) -> Self {
        Self {
            tuning,
            tether: None,
            joint: None,
            pull_timer: StateTimer::new(),
            origin: Vec3::ZERO,
        }
    }

    pub fn state(&self) -> GrappleState {
        match self.tether.map(|t| t.phase) {
            Some(TetherPhase::Searching) => GrappleState::Searching,
            Some(TetherPhase::Attached) => GrappleState::Pulling,
            None => GrappleState::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state() == GrappleState::Idle
    }

    pub fn joint(&self) -> Option<&TetherJoint> {
        self.joint.as_ref()
    }

    /// (камера, якорь) пока Searching/Pulling
    pub fn tether_endpoints(&self) -> Option<(Vec3, Vec3)> {
        self.tether.map(|t| (self.origin, t.anchor_point))
    }

    /// Позиция камеры для тела в `position`
    pub fn eye(&self, position: Vec3) -> Vec3 {
        position + Vec3::Y * self.tuning.eye_height
    }

    /// Запуск поиска из камеры вдоль `direction`
    pub fn launch(&mut self, eye: Vec3, direction: Vec3) -> bool {
        if !self.is_idle() {
            return false;
        }
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return false;
        }

        self.origin = eye;
        self.tether = Some(GrappleTether::searching(eye, direction));
        logger::log(&format!("Grapple: launched from {:?} dir {:?}", eye, direction));
        true
    }

    /// Один tick поиска
    ///
    /// Луч из текущей точки якоря на дистанцию, которую он сейчас пройдёт.
    /// Собственный коллайдер и не-стены пропускаются (якорь летит дальше).
    pub fn advance_search(
        &mut self,
        dt: f32,
        probe: &dyn CollisionProbe,
        eye: Vec3,
        own_collider: Option<ColliderId>,
    ) -> SearchOutcome {
        self.origin = eye;
        let Some(tether) = self.tether.as_mut() else {
            return SearchOutcome::Missed;
        };
        if tether.phase != TetherPhase::Searching {
            return SearchOutcome::Travelling;
        }

        let remaining = (self.tuning.range - tether.travelled).max(0.0);
        let step = (self.tuning.search_speed * dt).min(remaining);
        tether.elapsed += dt;

        let hit = checked_raycast(
            probe,
            tether.anchor_point,
            tether.direction,
            step,
            GRAPPLE_SEARCH_MASK,
        )
        .filter(|hit| Some(hit.collider) != own_collider);

        if let Some(hit) = hit.filter(|hit| hit.surface == SurfaceTag::Wall) {
            let distance = tether.travelled + tether.anchor_point.distance(hit.point);
            tether.anchor_point = hit.point;
            tether.phase = TetherPhase::Attached;
            tether.elapsed = 0.0;
            logger::log_info(&format!("Grapple: attached at {:?} ({:.1}m)", hit.point, distance));
            return SearchOutcome::Attached { anchor: hit.point };
        }

        tether.anchor_point += tether.direction * step;
        tether.travelled += step;

        if tether.travelled + RANGE_EPSILON >= self.tuning.range {
            logger::log_info(&format!("Grapple: missed (range {:.0} exhausted)", self.tuning.range));
            self.tether = None;
            return SearchOutcome::Missed;
        }

        SearchOutcome::Travelling
    }

    /// Вход в тягу: kick к якорю + сборка joint
    pub fn attach(&mut self, body: &mut dyn RigidBody) {
        let Some(tether) = self.tether.as_mut() else {
            return;
        };

        let position = body.position();
        let offset = tether.anchor_point - position;
        let distance = offset.length();
        let horizontal = flatten(offset).normalize_or_zero();

        body.add_velocity(horizontal * self.tuning.pull_kick + Vec3::Y * self.tuning.pull_vertical_kick);
        tether.initial_pull_velocity = body.velocity();

        self.joint = Some(TetherJoint {
            anchor: tether.anchor_point,
            min_distance: distance * self.tuning.min_distance_fraction,
            max_distance: distance * self.tuning.max_distance_fraction,
            spring: self.tuning.spring,
            damper: self.tuning.damper,
            mass: self.tuning.mass,
        });
        self.pull_timer.reset();
    }

    /// Один tick тяги
    ///
    /// Release: новый grapple edge, `max_pull_time` (если задан), `release_distance` (если задан).
    /// На release velocity захватывается и пишется обратно, joint удаляется.
    pub fn advance_pull(
        &mut self,
        dt: f32,
        body: &mut dyn RigidBody,
        eye: Vec3,
        release_pressed: bool,
    ) -> PullOutcome {
        self.origin = eye;
        let (Some(tether), Some(joint)) = (self.tether.as_mut(), self.joint) else {
            return PullOutcome::Holding;
        };

        let position = body.position();
        let reason = if release_pressed {
            Some(ReleaseReason::Input)
        } else if self
            .tuning
            .max_pull_time
            .is_some_and(|limit| self.pull_timer.reached(limit))
        {
            Some(ReleaseReason::Timeout)
        } else if self
            .tuning
            .release_distance
            .is_some_and(|limit| position.distance(joint.anchor) <= limit)
        {
            Some(ReleaseReason::Distance)
        } else {
            None
        };

        if let Some(reason) = reason {
            let velocity = body.velocity();
            body.set_velocity(velocity);
            self.tether = None;
            self.joint = None;
            logger::log_info(&format!("Grapple: released ({:?}), velocity {:?}", reason, velocity));
            return PullOutcome::Released { velocity, reason };
        }

        let dv = joint.velocity_change(position, body.velocity(), dt);
        body.add_velocity(dv);
        self.pull_timer.tick(dt);
        tether.elapsed = self.pull_timer.elapsed();

        PullOutcome::Holding
    }

    /// Сброс без событий (kill)
    pub fn cancel(&mut self) {
        self.tether = None;
        self.joint = None;
    }
}
