//! Physics boundary
//!
//! Ядро НЕ владеет физикой. Host (Rapier, sandbox, тесты) передаёт в каждый
//! `advance` две borrowed capability:
//! - `CollisionProbe` — ray queries + ground check
//! - `RigidBody` — position/velocity тела персонажа
//!
//! Гравитация, интеграция и разрешение коллизий — на стороне host.

pub mod layers;
pub mod rapier;
pub mod sandbox;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub use layers::{
    LayerMask, ATTACK_MASK, GRAPPLE_SEARCH_MASK, GROUND_PROBE_MASK, LEDGE_PROBE_MASK,
};
pub use sandbox::{SandboxBox, SandboxWorld};

/// Opaque identity коллайдера (Rapier: `Entity::to_bits()`, sandbox: индекс)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColliderId(pub u64);

/// Тип поверхности, в которую попал луч
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
pub enum SurfaceTag {
    Ground,
    Wall,
    Enemy,
    #[default]
    Other,
}

impl SurfaceTag {
    /// Слой коллайдера с этим тегом
    pub fn layers(self) -> LayerMask {
        match self {
            SurfaceTag::Wall => LayerMask::WALL,
            SurfaceTag::Enemy => LayerMask::ENEMY,
            SurfaceTag::Ground | SurfaceTag::Other => LayerMask::ENVIRONMENT,
        }
    }
}

/// Результат raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub surface: SurfaceTag,
    pub collider: ColliderId,
}

impl RayHit {
    /// Hit с NaN/inf точкой (уничтоженный коллайдер, битый query) = нет hit
    pub fn is_valid(&self) -> bool {
        self.point.is_finite()
    }
}

/// World queries, которые нужны state machine
pub trait CollisionProbe {
    /// Луч из `origin` по `direction` (unit) на `max_distance`, только слои из `mask`
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit>;

    /// Короткий луч вниз от `position` по всем слоям кроме игрока
    fn is_grounded(&self, position: Vec3) -> bool;
}

/// Тело персонажа (velocity — world space)
pub trait RigidBody {
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);

    fn add_velocity(&mut self, delta: Vec3) {
        let current = self.velocity();
        self.set_velocity(current + delta);
    }
}

/// Raycast с фильтрацией невалидных hit'ов
///
/// Все вызовы ядра идут через этот helper: битый результат probe → `None`.
pub fn checked_raycast(
    probe: &dyn CollisionProbe,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    mask: LayerMask,
) -> Option<RayHit> {
    if max_distance <= 0.0 || !direction.is_finite() || direction.length_squared() < 1e-8 {
        return None;
    }

    probe
        .raycast(origin, direction, max_distance, mask)
        .filter(RayHit::is_valid)
}

/// Фаза контакта со стеной (enter/stay/exit от physics boundary)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
}

/// Контакт со стеной
///
/// Инвариант: существует только пока тело непрерывно касается wall слоя.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallContact {
    pub contact_point: Vec3,
    pub is_active: bool,
}

impl WallContact {
    /// Применить событие контакта к текущему значению
    pub fn apply(current: Option<WallContact>, phase: ContactPhase, point: Vec3) -> Option<WallContact> {
        match phase {
            ContactPhase::Enter | ContactPhase::Stay if point.is_finite() => Some(WallContact {
                contact_point: point,
                is_active: true,
            }),
            // Битая точка на Stay — оставляем последнюю валидную
            ContactPhase::Enter | ContactPhase::Stay => current,
            ContactPhase::Exit => None,
        }
    }
}
