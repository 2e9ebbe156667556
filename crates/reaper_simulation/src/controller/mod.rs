//! CharacterController: movement + grapple + combat + look
//!
//! Архитектура:
//! - Ровно один owner velocity за tick (`VelocityOwner`)
//! - Grapple pull и атака вытесняют movement; после них `movement.resume()`
//! - После release grapple — пауза `Coasting` (никто не пишет velocity)
//!
//! Порядок tick:
//! 1. look delta, crouch latch
//! 2. grapple edge → Searching, иначе attack edge → Combat (только при owner Movement/Coasting)
//! 3. шаг поиска grapple (может забрать ownership)
//! 4. dispatch по owner
//! 5. `TickReport`

use bevy::prelude::*;

use crate::combat::{CombatSubsystem, HitEvent};
use crate::config::LocomotionTuning;
use crate::grapple::{GrappleState, GrappleSubsystem, PullOutcome, SearchOutcome};
use crate::input::InputSample;
use crate::logger;
use crate::movement::{
    camera_tilt, CharacterState, LookState, MovementContext, MovementStateMachine, Transition,
};
use crate::physics::{ColliderId, CollisionProbe, ContactPhase, RigidBody, WallContact};
use crate::timer::TIME_EPSILON;


/// Кто пишет velocity в этом tick
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum VelocityOwner {
    #[default]
    Movement,
    Grapple,
    Combat,
    /// Пауза после release grapple
    Coasting { remaining: f32 },
}

/// Событие grapple за tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrappleEvent {
    Launched,
    Attached { anchor: Vec3 },
    Missed,
    Released { velocity: Vec3 },
}

/// Итог одного tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub state: CharacterState,
    pub owner: VelocityOwner,
    pub transition: Option<Transition>,
    pub hits: Vec<HitEvent>,
    pub grapple: Option<GrappleEvent>,
}

#[derive(Debug, Clone)]
pub struct CharacterController {
    tuning: LocomotionTuning,
    movement: MovementStateMachine,
    grapple: GrappleSubsystem,
    combat: CombatSubsystem,
    look: LookState,
    owner: VelocityOwner,
    wall_contact: Option<WallContact>,
    /// Коллайдер самого персонажа (grapple его игнорирует)
    own_collider: Option<ColliderId>,
    last_axis: Vec2,
}

impl CharacterController {
    pub fn new(tuning: LocomotionTuning) -> Self {
        Self {
            movement: MovementStateMachine::new(tuning.movement.clone()),
            grapple: GrappleSubsystem::new(tuning.grapple.clone()),
            combat: CombatSubsystem::new(tuning.combat.clone()),
            look: LookState::default(),
            owner: VelocityOwner::Movement,
            wall_contact: None,
            own_collider: None,
            last_axis: Vec2::ZERO,
            tuning,
        }
    }

    pub fn with_collider(mut self, collider: ColliderId) -> Self {
        self.own_collider = Some(collider);
        self
    }

    /// Начальный yaw (радианы)
    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.look = LookState::new(yaw);
        self
    }

    pub fn tuning(&self) -> &LocomotionTuning {
        &self.tuning
    }

    pub fn state(&self) -> CharacterState {
        self.movement.state()
    }

    pub fn owner(&self) -> VelocityOwner {
        self.owner
    }

    pub fn stamina(&self) -> u32 {
        self.movement.stamina()
    }

    pub fn movement(&self) -> &MovementStateMachine {
        &self.movement
    }

    pub fn grapple(&self) -> &GrappleSubsystem {
        &self.grapple
    }

    pub fn combat(&self) -> &CombatSubsystem {
        &self.combat
    }

    pub fn look(&self) -> &LookState {
        &self.look
    }

    pub fn wall_contact(&self) -> Option<WallContact> {
        self.wall_contact
    }

    /// (камера, якорь) пока Searching/Pulling
    pub fn tether_endpoints(&self) -> Option<(Vec3, Vec3)> {
        self.grapple.tether_endpoints()
    }

    /// Yaw тела (радианы)
    pub fn facing(&self) -> f32 {
        self.look.yaw()
    }

    /// Наклон камеры (градусы)
    pub fn camera_tilt(&self) -> f32 {
        camera_tilt(self.last_axis.x, self.movement.on_wall(), &self.tuning.look)
    }

    /// Wall contact от physics boundary (enter/stay/exit)
    pub fn wall_contact_event(&mut self, phase: ContactPhase, point: Vec3) {
        self.wall_contact = WallContact::apply(self.wall_contact, phase, point);
    }

    /// Host lifecycle: смерть персонажа
    pub fn kill(&mut self) -> Option<Transition> {
        self.grapple.cancel();
        self.combat.cancel();
        self.owner = VelocityOwner::Movement;
        self.movement.kill()
    }

    /// Один fixed tick
    pub fn advance(
        &mut self,
        dt: f32,
        input: InputSample,
        probe: &dyn CollisionProbe,
        body: &mut dyn RigidBody,
    ) -> TickReport {
        let input = input.sanitized();
        let mut report = TickReport {
            state: self.movement.state(),
            owner: self.owner,
            transition: None,
            hits: Vec::new(),
            grapple: None,
        };

        if !self.movement.state().is_alive() {
            return report;
        }

        // 1. Look + crouch latch
        self.look.apply(input.look_delta, &self.tuning.look);
        if input.crouch_toggle {
            self.movement.toggle_crouch();
        }
        self.last_axis = input.move_axis;

        let forward = self.look.forward();
        let right = self.look.right();

        // 2. Новые действия — только когда velocity свободна
        let free = matches!(
            self.owner,
            VelocityOwner::Movement | VelocityOwner::Coasting { .. }
        );
        let both_idle = self.grapple.is_idle() && self.combat.is_idle();
        if free && both_idle {
            if input.grapple {
                let eye = self.grapple.eye(body.position());
                if self.grapple.launch(eye, self.look.camera_forward()) {
                    report.grapple = Some(GrappleEvent::Launched);
                }
            } else if input.attack && self.combat.start() {
                self.owner = VelocityOwner::Combat;
            }
        }

        // 3. Поиск якоря
        let mut attached_now = false;
        if self.grapple.state() == GrappleState::Searching {
            let eye = self.grapple.eye(body.position());
            match self.grapple.advance_search(dt, probe, eye, self.own_collider) {
                SearchOutcome::Travelling => {}
                SearchOutcome::Attached { anchor } => {
                    self.grapple.attach(body);
                    self.owner = VelocityOwner::Grapple;
                    attached_now = true;
                    report.grapple = Some(GrappleEvent::Attached { anchor });
                }
                SearchOutcome::Missed => {
                    report.grapple = Some(GrappleEvent::Missed);
                }
            }
        }

        // 4. Dispatch
        match self.owner {
            VelocityOwner::Movement => {
                let mut ctx = MovementContext {
                    probe,
                    body,
                    forward,
                    right,
                    wall_contact: self.wall_contact,
                };
                report.transition = self.movement.advance(dt, input, &mut ctx);
            }
            VelocityOwner::Grapple => {
                let eye = self.grapple.eye(body.position());
                let release = input.grapple && !attached_now;
                if let PullOutcome::Released { velocity, .. } =
                    self.grapple.advance_pull(dt, body, eye, release)
                {
                    report.grapple = Some(GrappleEvent::Released { velocity });
                    self.owner = VelocityOwner::Coasting {
                        remaining: self.tuning.grapple.release_delay,
                    };
                    if self.tuning.grapple.release_delay <= TIME_EPSILON {
                        report.transition = self.hand_back(probe, body, forward, right);
                    }
                }
            }
            VelocityOwner::Combat => {
                let tick = self.combat.advance(dt, probe, body, forward);
                report.hits = tick.hits;
                if tick.finished {
                    report.transition = self.hand_back(probe, body, forward, right);
                }
            }
            VelocityOwner::Coasting { remaining } => {
                let remaining = remaining - dt;
                if remaining <= TIME_EPSILON {
                    report.transition = self.hand_back(probe, body, forward, right);
                } else {
                    self.owner = VelocityOwner::Coasting { remaining };
                }
            }
        }

        report.state = self.movement.state();
        report.owner = self.owner;
        report
    }

    /// Ownership обратно в movement + свежий вход (InAir/Idle)
    fn hand_back(
        &mut self,
        probe: &dyn CollisionProbe,
        body: &mut dyn RigidBody,
        forward: Vec3,
        right: Vec3,
    ) -> Option<Transition> {
        self.owner = VelocityOwner::Movement;
        logger::log("Controller: velocity back to movement");

        let mut ctx = MovementContext {
            probe,
            body,
            forward,
            right,
            wall_contact: self.wall_contact,
        };
        self.movement.resume(&mut ctx)
    }
}
