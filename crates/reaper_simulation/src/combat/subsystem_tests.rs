//! Tests for CombatSubsystem.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::combat::{CombatSubsystem, HitPolicy};
    use crate::config::CombatTuning;
    use crate::physics::{SandboxWorld, SurfaceTag};

    const DT: f32 = 1.0 / 60.0;

    /// Пол + враг в 2м перед телом (forward = -Z)
    fn arena() -> SandboxWorld {
        let mut world = SandboxWorld::with_floor(20.0);
        world.add_enemy(Vec3::new(0.0, 1.0, -2.5), Vec3::new(0.5, 1.0, 0.5));
        world
    }

    fn run_window(combat: &mut CombatSubsystem, world: &mut SandboxWorld) -> (usize, u32) {
        let mut ticks = 0;
        let mut hits = 0;
        loop {
            let (level, body) = world.split();
            let tick = combat.advance(DT, level, body, Vec3::NEG_Z);
            ticks += 1;
            hits += tick.hits.len() as u32;
            if tick.finished {
                return (ticks, hits);
            }
            assert!(ticks < 1000, "window never closed");
        }
    }

    #[test]
    fn test_velocity_override_keeps_vertical() {
        let mut world = arena();
        world.body.velocity = Vec3::new(5.0, -3.0, 5.0);
        let mut combat = CombatSubsystem::new(CombatTuning::default());
        assert!(combat.start());

        let (level, body) = world.split();
        combat.advance(DT, level, body, Vec3::NEG_Z);

        assert!((world.body.velocity.z + 14.0).abs() < 1e-5);
        assert_eq!(world.body.velocity.x, 0.0);
        assert_eq!(world.body.velocity.y, -3.0);
    }

    #[test]
    fn test_per_tick_hits_every_tick() {
        let mut world = arena();
        let tuning = CombatTuning {
            attack_time: 0.1,
            ..default()
        };
        let mut combat = CombatSubsystem::new(tuning);
        combat.start();

        // Тело не двигаем (нет step), ray попадает каждый tick
        let (ticks, hits) = run_window(&mut combat, &mut world);
        assert_eq!(ticks, 6);
        assert_eq!(hits, 6);
        assert!(combat.is_idle());
    }

    #[test]
    fn test_once_per_target_hits_once() {
        let mut world = arena();
        let tuning = CombatTuning {
            attack_time: 0.1,
            hit_policy: HitPolicy::OncePerTarget,
            ..default()
        };
        let mut combat = CombatSubsystem::new(tuning);
        combat.start();

        let (_, hits) = run_window(&mut combat, &mut world);
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_out_of_range_misses() {
        let mut world = SandboxWorld::with_floor(20.0);
        world.add_enemy(Vec3::new(0.0, 1.0, -8.0), Vec3::splat(0.5));
        let mut combat = CombatSubsystem::new(CombatTuning::default());
        combat.start();

        let (_, hits) = run_window(&mut combat, &mut world);
        assert_eq!(hits, 0);
    }

    #[test]
    fn test_walls_are_not_targets() {
        let mut world = SandboxWorld::with_floor(20.0);
        let wall = world.add_wall(Vec3::new(0.0, 1.0, -2.0), Vec3::splat(0.5));
        let surface = world.level.boxes().iter().find(|bx| bx.id == wall).map(|bx| bx.surface);
        assert_eq!(surface, Some(SurfaceTag::Wall));

        let mut combat = CombatSubsystem::new(CombatTuning::default());
        combat.start();
        let (_, hits) = run_window(&mut combat, &mut world);
        assert_eq!(hits, 0);
    }

    #[test]
    fn test_start_while_attacking_refused() {
        let mut combat = CombatSubsystem::new(CombatTuning::default());
        assert!(combat.start());
        assert!(!combat.start());

        combat.cancel();
        assert!(combat.is_idle());
    }

    #[test]
    fn test_idle_advance_does_nothing() {
        let mut world = arena();
        world.body.velocity = Vec3::new(1.0, 2.0, 3.0);
        let mut combat = CombatSubsystem::new(CombatTuning::default());

        let (level, body) = world.split();
        let tick = combat.advance(DT, level, body, Vec3::NEG_Z);
        assert!(tick.hits.is_empty());
        assert!(!tick.finished);
        assert_eq!(world.body.velocity, Vec3::new(1.0, 2.0, 3.0));
    }
}
