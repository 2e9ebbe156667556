//! Tests for MovementStateMachine.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use crate::config::MovementTuning;
    use crate::input::InputSample;
    use crate::movement::{CharacterState, MovementContext, MovementStateMachine, Transition};
    use crate::physics::{
        CollisionProbe, ColliderId, LayerMask, RayHit, RigidBody, SurfaceTag, WallContact,
    };

    const DT: f32 = 1.0 / 60.0;

    struct TestBody {
        position: Vec3,
        velocity: Vec3,
    }

    impl RigidBody for TestBody {
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

    /// Probe: grounded флаг + опциональная стена выше заданной высоты
    #[derive(Default)]
    struct TestProbe {
        grounded: bool,
        wall_above: Option<f32>,
    }

    impl CollisionProbe for TestProbe {
        fn raycast(&self, origin: Vec3, direction: Vec3, _: f32, _: LayerMask) -> Option<RayHit> {
            let threshold = self.wall_above?;
            (origin.y >= threshold).then(|| RayHit {
                point: origin + direction * 0.5,
                surface: SurfaceTag::Wall,
                collider: ColliderId(1),
            })
        }

        fn is_grounded(&self, _: Vec3) -> bool {
            self.grounded
        }
    }

    struct Rig {
        machine: MovementStateMachine,
        probe: TestProbe,
        body: TestBody,
        wall: Option<WallContact>,
    }

    impl Rig {
        fn grounded(tuning: MovementTuning) -> Self {
            Self {
                machine: MovementStateMachine::new(tuning),
                probe: TestProbe {
                    grounded: true,
                    wall_above: None,
                },
                body: TestBody {
                    position: Vec3::ZERO,
                    velocity: Vec3::ZERO,
                },
                wall: None,
            }
        }

        fn tick(&mut self, input: InputSample) -> Option<Transition> {
            let mut ctx = MovementContext {
                probe: &self.probe,
                body: &mut self.body,
                forward: Vec3::NEG_Z,
                right: Vec3::X,
                wall_contact: self.wall,
            };
            self.machine.advance(DT, input, &mut ctx)
        }

        fn resume(&mut self) -> Option<Transition> {
            let mut ctx = MovementContext {
                probe: &self.probe,
                body: &mut self.body,
                forward: Vec3::NEG_Z,
                right: Vec3::X,
                wall_contact: self.wall,
            };
            self.machine.resume(&mut ctx)
        }

        fn horizontal_speed(&self) -> f32 {
            Vec2::new(self.body.velocity.x, self.body.velocity.z).length()
        }
    }

    fn idle() -> InputSample {
        InputSample::default()
    }

    #[test]
    fn test_idle_with_zero_input_stays_idle() {
        let mut rig = Rig::grounded(MovementTuning::default());
        rig.body.velocity = Vec3::new(3.0, -1.0, 2.0);

        for _ in 0..30 {
            assert!(rig.tick(idle()).is_none());
        }

        assert_eq!(rig.machine.state(), CharacterState::Idle);
        assert_eq!(rig.horizontal_speed(), 0.0);
        // Вертикаль не трогаем
        assert_eq!(rig.body.velocity.y, -1.0);
    }

    #[test]
    fn test_running_velocity_applies_next_tick() {
        let mut rig = Rig::grounded(MovementTuning::default());
        let right = idle().with_axis(1.0, 0.0);

        let transition = rig.tick(right);
        assert_eq!(
            transition,
            Some(Transition {
                from: CharacterState::Idle,
                to: CharacterState::Running,
            })
        );
        assert_eq!(rig.horizontal_speed(), 0.0);

        assert!(rig.tick(right).is_none());
        assert_eq!(rig.machine.state(), CharacterState::Running);
        assert!((rig.body.velocity - Vec3::new(10.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_running_exits_in_priority_order() {
        let mut rig = Rig::grounded(MovementTuning::default());
        let forward = idle().with_axis(0.0, 1.0);
        rig.tick(forward);

        // Нет input → Idle раньше всего остального
        let transition = rig.tick(idle().with_jump());
        assert_eq!(transition.map(|t| t.to), Some(CharacterState::Idle));

        rig.tick(forward);
        rig.probe.grounded = false;
        let transition = rig.tick(forward);
        assert_eq!(transition.map(|t| t.to), Some(CharacterState::InAir));
    }

    #[test]
    fn test_jump_writes_velocity_on_entry() {
        let mut rig = Rig::grounded(MovementTuning::default());

        let transition = rig.tick(idle().with_jump());
        assert_eq!(transition.map(|t| t.to), Some(CharacterState::Jumping));
        assert_eq!(rig.body.velocity.y, 15.0);

        // Jumping держится jump_hold_time (0.25s = 15 tick при 60Hz)
        rig.probe.grounded = false;
        let mut ticks = 0;
        while rig.machine.state() == CharacterState::Jumping {
            rig.tick(idle());
            ticks += 1;
            assert!(ticks < 100, "Jumping never ended");
        }
        assert_eq!(ticks, 15);
        assert_eq!(rig.machine.state(), CharacterState::InAir);
    }

    #[test]
    fn test_jump_requires_ground() {
        let mut rig = Rig::grounded(MovementTuning::default());
        rig.probe.grounded = false;
        assert!(rig.tick(idle().with_jump()).is_none());
        assert_eq!(rig.machine.state(), CharacterState::Idle);
    }

    /// Tick'и с dash velocity, начиная с entry tick
    fn dash_velocity_ticks(rig: &mut Rig, speed: f32) -> u32 {
        let mut input = idle().with_axis(0.0, 1.0).with_dash();
        let mut ticks = 0;
        for _ in 0..100 {
            rig.tick(input);
            input = idle();
            if (rig.body.velocity.z + speed).abs() > 1e-5 {
                break;
            }
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn test_dash_lasts_dash_time() {
        let mut rig = Rig::grounded(MovementTuning::default());

        // 0.2s при 60Hz = 12 tick на dash скорости, entry tick включён
        assert_eq!(dash_velocity_ticks(&mut rig, 30.0), 12);
        assert_eq!(rig.machine.state(), CharacterState::Idle);
        assert_eq!(rig.machine.stamina(), 2);
    }

    #[test]
    fn test_dash_entry_writes_velocity_and_spends_stamina() {
        let mut rig = Rig::grounded(MovementTuning::default());
        let transition = rig.tick(idle().with_axis(0.0, 1.0).with_dash());

        assert_eq!(transition.map(|t| t.to), Some(CharacterState::Dash));
        assert_eq!(rig.machine.stamina(), 1);
        assert!((rig.body.velocity.z + 30.0).abs() < 1e-5);
    }

    #[test]
    fn test_dash_shorter_than_tick_lasts_one_tick() {
        let tuning = MovementTuning {
            dash_time: 0.01,
            ..default()
        };
        let mut rig = Rig::grounded(tuning);

        assert_eq!(dash_velocity_ticks(&mut rig, 30.0), 1);
        // Tick после entry уже без dash скорости, и сразу выход
        assert_eq!(rig.machine.state(), CharacterState::Idle);
    }

    #[test]
    fn test_dash_declined_without_stamina() {
        let tuning = MovementTuning {
            max_stamina: 0,
            ..default()
        };
        let mut rig = Rig::grounded(tuning);

        assert!(rig.tick(idle().with_dash()).is_none());
        assert_eq!(rig.machine.state(), CharacterState::Idle);
        assert_eq!(rig.machine.stamina(), 0);
    }

    #[test]
    fn test_air_dashes_spend_stamina_without_refill() {
        let mut rig = Rig::grounded(MovementTuning::default());
        rig.probe.grounded = false;
        rig.tick(idle().with_axis(0.0, 1.0));
        rig.tick(idle().with_axis(0.0, 1.0));
        assert_eq!(rig.machine.state(), CharacterState::InAir);

        let dash = idle().with_axis(1.0, 0.0).with_dash();
        for expected_stamina in [1, 0] {
            assert_eq!(rig.tick(dash).map(|t| t.to), Some(CharacterState::Dash));
            assert_eq!(rig.machine.stamina(), expected_stamina);
            while rig.machine.state() == CharacterState::Dash {
                rig.tick(idle());
            }
            assert_eq!(rig.machine.state(), CharacterState::InAir);
        }

        // Третий dash в воздухе — отказ
        assert!(rig.tick(dash).is_none());
        assert_eq!(rig.machine.stamina(), 0);

        // Приземлились → Idle → stamina снова полная
        rig.probe.grounded = true;
        rig.tick(idle());
        rig.tick(idle());
        assert_eq!(rig.machine.stamina(), 2);
    }

    #[test]
    fn test_dash_edge_ignored_while_dashing() {
        let mut rig = Rig::grounded(MovementTuning::default());
        let dash = idle().with_axis(0.0, 1.0).with_dash();
        rig.tick(dash);

        assert!(rig.tick(dash).is_none());
        assert_eq!(rig.machine.stamina(), 1);
    }

    #[test]
    fn test_in_air_horizontal_speed_bounded() {
        let mut rig = Rig::grounded(MovementTuning::default());
        rig.probe.grounded = false;
        // Влетаем в InAir с большой скоростью (как после grapple)
        rig.body.velocity = Vec3::new(40.0, 5.0, -40.0);
        rig.resume();
        assert_eq!(rig.machine.state(), CharacterState::InAir);

        for _ in 0..120 {
            rig.tick(idle().with_axis(1.0, 1.0));
            assert!(rig.horizontal_speed() <= rig.machine.tuning().max_air_speed + 1e-4);
        }
    }

    #[test]
    fn test_in_air_lands_to_idle() {
        let mut rig = Rig::grounded(MovementTuning::default());
        rig.probe.grounded = false;
        rig.tick(idle().with_axis(0.0, 1.0));
        rig.tick(idle().with_axis(0.0, 1.0));
        assert_eq!(rig.machine.state(), CharacterState::InAir);

        rig.probe.grounded = true;
        assert_eq!(rig.tick(idle()).map(|t| t.to), Some(CharacterState::Idle));
    }

    #[test]
    fn test_wall_jump_counter_resets_on_fresh_entry() {
        let mut rig = Rig::grounded(MovementTuning::default());
        rig.probe.grounded = false;
        rig.tick(idle().with_axis(0.0, 1.0));
        rig.tick(idle().with_axis(0.0, 1.0));

        rig.wall = Some(WallContact {
            contact_point: Vec3::new(0.5, 0.0, 0.0),
            is_active: true,
        });
        rig.tick(idle().with_jump());
        rig.tick(idle().with_jump());
        rig.tick(idle().with_jump());
        assert_eq!(rig.machine.wall_jumps(), 2);
        // Отталкивание от стены справа → влево
        assert!(rig.body.velocity.x < 0.0);

        rig.probe.grounded = true;
        rig.tick(idle());
        rig.probe.grounded = false;
        rig.tick(idle().with_axis(0.0, 1.0));
        rig.tick(idle().with_axis(0.0, 1.0));
        assert_eq!(rig.machine.state(), CharacterState::InAir);
        assert_eq!(rig.machine.wall_jumps(), 0);
    }

    #[test]
    fn test_ledge_boost() {
        let tuning = MovementTuning::default();
        let ledge_velocity = tuning.ledge_jump_velocity;
        let mut rig = Rig::grounded(tuning);
        rig.probe.grounded = false;
        rig.resume();
        assert_eq!(rig.machine.state(), CharacterState::InAir);

        // Стена только выше пояса
        rig.probe.wall_above = Some(0.0);
        rig.wall = Some(WallContact {
            contact_point: Vec3::new(0.0, 0.0, -0.5),
            is_active: true,
        });
        rig.body.velocity.y = -2.0;
        rig.tick(idle());
        assert_eq!(rig.body.velocity.y, ledge_velocity);
    }

    #[test]
    fn test_slide_decays_then_crouch() {
        let mut rig = Rig::grounded(MovementTuning::default());
        let forward = idle().with_axis(0.0, 1.0);
        rig.tick(forward);
        rig.machine.toggle_crouch();

        let transition = rig.tick(forward);
        assert_eq!(transition.map(|t| t.to), Some(CharacterState::Slide));
        assert_eq!(rig.machine.slide_speed(), 20.0);

        let mut last = rig.machine.slide_speed();
        for _ in 0..5 {
            rig.tick(forward);
            assert!(rig.machine.slide_speed() < last);
            last = rig.machine.slide_speed();
        }
        // Направление slide зафиксировано: forward
        assert!(rig.body.velocity.z < 0.0);

        // Отпустили input — когда скорость упала, переходим в Crouch
        let mut ticks = 0;
        while rig.machine.state() == CharacterState::Slide {
            rig.tick(idle());
            ticks += 1;
            assert!(ticks < 500);
        }
        assert_eq!(rig.machine.state(), CharacterState::Crouch);
        assert!(rig.machine.slide_speed() < 0.5);
    }

    #[test]
    fn test_slide_falling_speeds_up_decay() {
        let flat = {
            let mut rig = Rig::grounded(MovementTuning::default());
            rig.tick(idle().with_axis(0.0, 1.0));
            rig.machine.toggle_crouch();
            rig.tick(idle().with_axis(0.0, 1.0));
            rig.tick(idle().with_axis(0.0, 1.0));
            rig.machine.slide_speed()
        };
        let falling = {
            let mut rig = Rig::grounded(MovementTuning::default());
            rig.tick(idle().with_axis(0.0, 1.0));
            rig.machine.toggle_crouch();
            rig.tick(idle().with_axis(0.0, 1.0));
            rig.body.velocity.y = -10.0;
            rig.tick(idle().with_axis(0.0, 1.0));
            rig.machine.slide_speed()
        };

        assert!(falling < flat, "falling {falling} vs flat {flat}");
    }

    #[test]
    fn test_slide_exits_on_crouch_release() {
        let mut rig = Rig::grounded(MovementTuning::default());
        rig.tick(idle().with_axis(0.0, 1.0));
        rig.machine.toggle_crouch();
        rig.tick(idle().with_axis(0.0, 1.0));
        assert_eq!(rig.machine.state(), CharacterState::Slide);

        rig.machine.toggle_crouch();
        assert_eq!(rig.tick(idle()).map(|t| t.to), Some(CharacterState::Idle));
    }

    #[test]
    fn test_crouch_zeroes_horizontal_keeps_vertical() {
        let mut rig = Rig::grounded(MovementTuning::default());
        rig.machine.toggle_crouch();
        // Idle → Slide (скорость 0) → Crouch
        rig.tick(idle());
        rig.tick(idle());
        assert_eq!(rig.machine.state(), CharacterState::Crouch);

        rig.body.velocity = Vec3::new(4.0, -2.0, 4.0);
        rig.tick(idle());
        assert_eq!(rig.horizontal_speed(), 0.0);
        assert_eq!(rig.body.velocity.y, -2.0);

        rig.probe.grounded = false;
        assert_eq!(rig.tick(idle()).map(|t| t.to), Some(CharacterState::InAir));
    }

    #[test]
    fn test_dead_is_terminal() {
        let mut rig = Rig::grounded(MovementTuning::default());
        assert!(rig.machine.kill().is_some());
        assert!(rig.machine.kill().is_none());

        rig.body.velocity = Vec3::new(1.0, 2.0, 3.0);
        for input in [idle().with_jump(), idle().with_dash(), idle().with_axis(1.0, 1.0)] {
            assert!(rig.tick(input).is_none());
        }
        assert_eq!(rig.machine.state(), CharacterState::Dead);
        assert_eq!(rig.body.velocity, Vec3::new(1.0, 2.0, 3.0));
        assert!(rig.resume().is_none());
    }

    #[test]
    fn test_resume_airborne_seeds_accumulator() {
        let mut rig = Rig::grounded(MovementTuning::default());
        rig.probe.grounded = false;
        rig.body.velocity = Vec3::new(6.0, 3.0, 0.0);

        assert_eq!(rig.resume().map(|t| t.to), Some(CharacterState::InAir));

        // Без input аккумулятор сохраняет momentum
        rig.tick(idle());
        assert!((rig.body.velocity.x - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_resume_grounded_goes_idle() {
        let mut rig = Rig::grounded(MovementTuning::default());
        assert_eq!(rig.resume().map(|t| t.to), Some(CharacterState::Idle));
    }
}
