//! Sandbox мир: axis-aligned боксы + точечное тело со сферой
//!
//! Детерминированная замена Rapier для headless прогона и тестов.
//! Никакой трение/restitution: только gravity, интеграция позиции и
//! выталкивание сферы из боксов (минимальная ось проникновения).
//!
//! Порядок одного tick (см. `SandboxWorld::tick`):
//! 1. контроллер пишет velocity (`advance`)
//! 2. `step(dt)` — gravity + интеграция + resolve
//! 3. wall контакты этого step отдаются контроллеру (видны со следующего tick)

use bevy::prelude::*;

use super::{
    checked_raycast, CollisionProbe, ColliderId, ContactPhase, LayerMask, RayHit, RigidBody,
    SurfaceTag, GROUND_PROBE_MASK,
};
use crate::controller::{CharacterController, TickReport};
use crate::input::InputSample;

/// Зазор, в пределах которого сфера считается касающейся стены
const CONTACT_SKIN: f32 = 0.05;

/// Статический бокс уровня
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SandboxBox {
    pub id: ColliderId,
    pub min: Vec3,
    pub max: Vec3,
    pub surface: SurfaceTag,
    pub layers: LayerMask,
}

impl SandboxBox {
    /// Бокс по центру и половинным размерам
    pub fn from_center(center: Vec3, half_extents: Vec3, surface: SurfaceTag) -> Self {
        Self {
            // id присваивается в `SandboxLevel::add_box`
            id: ColliderId(0),
            min: center - half_extents,
            max: center + half_extents,
            surface,
            layers: surface.layers(),
        }
    }

    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// Slab test: расстояние до входа луча в бокс
    ///
    /// Луч, стартующий строго внутри бокса, его не видит; с грани — hit на 0.
    fn ray_entry(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        let inside = origin.cmpgt(self.min).all() && origin.cmplt(self.max).all();
        if inside {
            return None;
        }

        Some(t_min)
    }
}

/// Геометрия уровня (реализует `CollisionProbe`)
#[derive(Debug, Clone)]
pub struct SandboxLevel {
    boxes: Vec<SandboxBox>,
    /// Длина ground луча от центра тела
    pub ground_probe_distance: f32,
}

impl Default for SandboxLevel {
    fn default() -> Self {
        Self {
            boxes: Vec::new(),
            ground_probe_distance: 0.6,
        }
    }
}

impl SandboxLevel {
    /// Добавить бокс, вернуть его id (индекс + 1, 0 зарезервирован)
    pub fn add_box(&mut self, mut bx: SandboxBox) -> ColliderId {
        let id = ColliderId(self.boxes.len() as u64 + 1);
        bx.id = id;
        self.boxes.push(bx);
        id
    }

    pub fn boxes(&self) -> &[SandboxBox] {
        &self.boxes
    }
}

impl CollisionProbe for SandboxLevel {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        self.boxes
            .iter()
            .filter(|bx| bx.layers.intersects(mask))
            .filter_map(|bx| {
                bx.ray_entry(origin, direction, max_distance)
                    .map(|t| (t, bx))
            })
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(t, bx)| RayHit {
                point: origin + direction * t,
                surface: bx.surface,
                collider: bx.id,
            })
    }

    fn is_grounded(&self, position: Vec3) -> bool {
        checked_raycast(
            self,
            position,
            Vec3::NEG_Y,
            self.ground_probe_distance,
            GROUND_PROBE_MASK,
        )
        .is_some()
    }
}

/// Тело персонажа: сфера радиуса `radius`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SandboxBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub radius: f32,
}

impl Default for SandboxBody {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            radius: 0.5,
        }
    }
}

impl RigidBody for SandboxBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }
}

/// Wall контакт, полученный из step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SandboxContact {
    pub collider: ColliderId,
    pub phase: ContactPhase,
    pub point: Vec3,
}

/// Полный sandbox: уровень + тело + gravity
#[derive(Debug, Clone)]
pub struct SandboxWorld {
    pub level: SandboxLevel,
    pub body: SandboxBody,
    pub gravity: Vec3,
    /// Стены, которых тело касалось в прошлом step (отсортированы по id)
    touching: Vec<ColliderId>,
    pending_contacts: Vec<SandboxContact>,
}

impl Default for SandboxWorld {
    fn default() -> Self {
        Self {
            level: SandboxLevel::default(),
            body: SandboxBody::default(),
            gravity: Vec3::new(0.0, -9.81, 0.0),
            touching: Vec::new(),
            pending_contacts: Vec::new(),
        }
    }
}

impl SandboxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Мир с плоским полом (верх пола на y = 0) и телом, стоящим на нём
    pub fn with_floor(half_size: f32) -> Self {
        let mut world = Self::default();
        world.level.add_box(SandboxBox::from_center(
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(half_size, 0.5, half_size),
            SurfaceTag::Ground,
        ));
        world.body.position = Vec3::new(0.0, world.body.radius, 0.0);
        world
    }

    pub fn add_box(&mut self, bx: SandboxBox) -> ColliderId {
        self.level.add_box(bx)
    }

    /// Стена по центру/половинам (wall слой)
    pub fn add_wall(&mut self, center: Vec3, half_extents: Vec3) -> ColliderId {
        self.add_box(SandboxBox::from_center(center, half_extents, SurfaceTag::Wall))
    }

    /// Враг (enemy слой, цель melee)
    pub fn add_enemy(&mut self, center: Vec3, half_extents: Vec3) -> ColliderId {
        self.add_box(SandboxBox::from_center(center, half_extents, SurfaceTag::Enemy))
    }

    /// Раздельный borrow: probe (immutable) + тело (mutable)
    pub fn split(&mut self) -> (&SandboxLevel, &mut SandboxBody) {
        (&self.level, &mut self.body)
    }

    /// Один physics step: gravity, интеграция, resolve, wall контакты
    pub fn step(&mut self, dt: f32) -> &[SandboxContact] {
        self.body.velocity += self.gravity * dt;
        self.body.position += self.body.velocity * dt;

        let radius = self.body.radius;
        for bx in &self.level.boxes {
            let closest = bx.closest_point(self.body.position);
            let offset = self.body.position - closest;
            let distance = offset.length();

            let (normal, target) = if distance > 1e-6 {
                if distance >= radius {
                    continue;
                }
                let normal = offset / distance;
                (normal, closest + normal * radius)
            } else {
                // Центр внутри бокса: выталкиваем через ближайшую грань
                let (normal, face_point) = exit_face(bx, self.body.position);
                (normal, face_point + normal * radius)
            };
            self.body.position = target;

            let into = self.body.velocity.dot(normal);
            if into < 0.0 {
                self.body.velocity -= normal * into;
            }
        }

        self.collect_wall_contacts();
        &self.pending_contacts
    }

    fn collect_wall_contacts(&mut self) {
        let radius = self.body.radius;
        let position = self.body.position;

        let mut now: Vec<(ColliderId, Vec3)> = self
            .level
            .boxes
            .iter()
            .filter(|bx| bx.layers.intersects(LayerMask::WALL))
            .filter_map(|bx| {
                let point = bx.closest_point(position);
                (point.distance(position) <= radius + CONTACT_SKIN).then_some((bx.id, point))
            })
            .collect();
        now.sort_by_key(|(id, _)| *id);

        self.pending_contacts.clear();

        // Exit раньше Enter/Stay: контакт с другой стеной переживает отрыв от первой
        for id in &self.touching {
            if !now.iter().any(|(other, _)| other == id) {
                self.pending_contacts.push(SandboxContact {
                    collider: *id,
                    phase: ContactPhase::Exit,
                    point: position,
                });
            }
        }
        for (id, point) in &now {
            let phase = if self.touching.contains(id) {
                ContactPhase::Stay
            } else {
                ContactPhase::Enter
            };
            self.pending_contacts.push(SandboxContact {
                collider: *id,
                phase,
                point: *point,
            });
        }

        self.touching = now.into_iter().map(|(id, _)| id).collect();
    }

    /// Полный tick: контроллер → physics step → wall контакты в контроллер
    pub fn tick(
        &mut self,
        controller: &mut CharacterController,
        input: InputSample,
        dt: f32,
    ) -> TickReport {
        let report = {
            let (level, body) = self.split();
            controller.advance(dt, input, level, body)
        };

        self.step(dt);
        for contact in &self.pending_contacts {
            controller.wall_contact_event(contact.phase, contact.point);
        }

        report
    }
}

impl CollisionProbe for SandboxWorld {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        self.level.raycast(origin, direction, max_distance, mask)
    }

    fn is_grounded(&self, position: Vec3) -> bool {
        self.level.is_grounded(position)
    }
}

impl RigidBody for SandboxWorld {
    fn position(&self) -> Vec3 {
        self.body.position
    }

    fn velocity(&self) -> Vec3 {
        self.body.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.body.velocity = velocity;
    }
}

/// Ближайшая грань для точки внутри бокса: (нормаль, проекция точки на грань)
fn exit_face(bx: &SandboxBox, point: Vec3) -> (Vec3, Vec3) {
    let candidates = [
        (point.x - bx.min.x, Vec3::NEG_X, Vec3::new(bx.min.x, point.y, point.z)),
        (bx.max.x - point.x, Vec3::X, Vec3::new(bx.max.x, point.y, point.z)),
        (point.y - bx.min.y, Vec3::NEG_Y, Vec3::new(point.x, bx.min.y, point.z)),
        (bx.max.y - point.y, Vec3::Y, Vec3::new(point.x, bx.max.y, point.z)),
        (point.z - bx.min.z, Vec3::NEG_Z, Vec3::new(point.x, point.y, bx.min.z)),
        (bx.max.z - point.z, Vec3::Z, Vec3::new(point.x, point.y, bx.max.z)),
    ];

    candidates
        .iter()
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, normal, face)| (*normal, *face))
        .unwrap_or((Vec3::Y, point))
}
