//! Rapier adapters: `CollisionProbe` и `RigidBody` поверх bevy_rapier3d
//!
//! Слои: `CollisionGroups.memberships` коллайдера = биты `LayerMask`
//! (см. `Surface::groups`). Тег поверхности — компонент `Surface`.
//!
//! Коллайдер без `Surface` (или уже despawned) для ядра не существует:
//! probe возвращает `None`.

use bevy::prelude::*;
use bevy_rapier3d::prelude::{CollisionGroups, Group, QueryFilter, RapierContext, Velocity};

use super::{
    checked_raycast, CollisionProbe, ColliderId, LayerMask, RayHit, RigidBody, SurfaceTag,
    GROUND_PROBE_MASK,
};

/// Дальность поиска точки контакта от центра тела (с запасом над capsule)
const CONTACT_PROJECTION_RANGE: f32 = 4.0;

/// Тег поверхности на entity коллайдера
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
#[reflect(Component)]
pub struct Surface(pub SurfaceTag);

impl Surface {
    pub fn layers(&self) -> LayerMask {
        self.0.layers()
    }

    /// Collision groups для коллайдера уровня
    pub fn groups(&self) -> CollisionGroups {
        CollisionGroups::new(
            Group::from_bits_truncate(self.layers().bits()),
            Group::ALL,
        )
    }
}

/// Collision groups тела персонажа
pub fn player_groups() -> CollisionGroups {
    CollisionGroups::new(
        Group::from_bits_truncate(LayerMask::PLAYER.bits()),
        Group::ALL,
    )
}

/// `ColliderId` для entity коллайдера
#[inline]
pub fn collider_id(entity: Entity) -> ColliderId {
    ColliderId(entity.to_bits())
}

/// Read-only view на Rapier query pipeline для одного tick
pub struct RapierProbe<'a, 'c> {
    context: &'a RapierContext<'c>,
    surface_of: &'a dyn Fn(Entity) -> Option<SurfaceTag>,
    /// Тело персонажа (его коллайдеры исключаются из запросов)
    exclude: Option<Entity>,
    ground_probe_distance: f32,
}

impl<'a, 'c> RapierProbe<'a, 'c> {
    pub fn new(
        context: &'a RapierContext<'c>,
        surface_of: &'a dyn Fn(Entity) -> Option<SurfaceTag>,
        ground_probe_distance: f32,
    ) -> Self {
        Self {
            context,
            surface_of,
            exclude: None,
            ground_probe_distance,
        }
    }

    pub fn excluding(mut self, body: Entity) -> Self {
        self.exclude = Some(body);
        self
    }

    fn filter(&self, mask: LayerMask) -> QueryFilter<'static> {
        let groups = CollisionGroups::new(Group::ALL, Group::from_bits_truncate(mask.bits()));
        let filter = QueryFilter::default().groups(groups);
        match self.exclude {
            Some(body) => filter.exclude_rigid_body(body),
            None => filter,
        }
    }

    /// Ближайшая точка коллайдера `collider` к `point` (точка контакта со стеной)
    pub fn closest_point_on(&self, collider: Entity, point: Vec3) -> Option<Vec3> {
        let only = |entity: Entity| entity == collider;
        let filter = QueryFilter::default().predicate(&only);
        self.context
            .project_point(point, CONTACT_PROJECTION_RANGE, true, filter)
            .map(|(_, projection)| projection.point)
            .filter(|point| point.is_finite())
    }
}

impl CollisionProbe for RapierProbe<'_, '_> {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<RayHit> {
        let (entity, intersection) = self.context.cast_ray_and_get_normal(
            origin,
            direction,
            max_distance,
            true,
            self.filter(mask),
        )?;

        let surface = (self.surface_of)(entity)?;
        Some(RayHit {
            point: intersection.point,
            surface,
            collider: collider_id(entity),
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

/// Тело персонажа: позиция из `Transform`, velocity пишется в Rapier `Velocity`
pub struct RapierBody<'a> {
    position: Vec3,
    velocity: &'a mut Velocity,
}

impl<'a> RapierBody<'a> {
    pub fn new(position: Vec3, velocity: &'a mut Velocity) -> Self {
        Self { position, velocity }
    }
}

impl RigidBody for RapierBody<'_> {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity.linvel
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity.linvel = velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_groups_match_layers() {
        let wall = Surface(SurfaceTag::Wall).groups();
        assert_eq!(wall.memberships.bits(), LayerMask::WALL.bits());
        assert_eq!(wall.filters, Group::ALL);

        let ground = Surface(SurfaceTag::Ground).groups();
        assert_eq!(ground.memberships.bits(), LayerMask::ENVIRONMENT.bits());
    }

    #[test]
    fn test_player_not_in_ground_probe_mask() {
        let player = player_groups();
        assert_eq!(player.memberships.bits() & GROUND_PROBE_MASK.bits(), 0);
    }

    #[test]
    fn test_rapier_body_writes_linvel() {
        let mut velocity = Velocity::default();
        {
            let mut body = RapierBody::new(Vec3::ONE, &mut velocity);
            body.set_velocity(Vec3::new(1.0, 2.0, 3.0));
            body.add_velocity(Vec3::X);
            assert_eq!(body.position(), Vec3::ONE);
        }
        assert_eq!(velocity.linvel, Vec3::new(2.0, 2.0, 3.0));
        assert_eq!(velocity.angvel, Vec3::ZERO);
    }
}
