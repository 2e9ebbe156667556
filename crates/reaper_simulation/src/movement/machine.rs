//! MovementStateMachine: locomotion FSM
//!
//! Один вызов `advance` = один fixed tick:
//! 1. физический update активного состояния пишет velocity
//! 2. проверки переходов (после update, чтобы tick правильной скорости прошёл)
//! 3. максимум один переход: exit старого, entry нового
//!
//! Entry one-shot состояний (Dash, Jumping) пишет velocity в том же tick.

use bevy::prelude::*;

use super::air::{air_accelerate, apply_wall_behaviour, clamp_horizontal, flatten, WallInput, WallOutcome};
use super::stamina::Stamina;
use super::state::{CharacterState, Transition};
use crate::config::MovementTuning;
use crate::input::InputSample;
use crate::logger;
use crate::physics::{CollisionProbe, RigidBody, WallContact};
use crate::timer::StateTimer;

/// Borrowed мир для одного tick
///
/// `forward`/`right` — flattened unit оси тела (из `LookState`).
pub struct MovementContext<'a> {
    pub probe: &'a dyn CollisionProbe,
    pub body: &'a mut dyn RigidBody,
    pub forward: Vec3,
    pub right: Vec3,
    pub wall_contact: Option<WallContact>,
}

impl MovementContext<'_> {
    /// Body-local → world: `right * x + up * y + forward * z`
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.right * local.x + Vec3::Y * local.y + self.forward * local.z
    }

    /// World направление 2D input (не нормализовано)
    pub fn wish(&self, axis: Vec2) -> Vec3 {
        self.forward * axis.y + self.right * axis.x
    }

    fn is_grounded(&self) -> bool {
        self.probe.is_grounded(self.body.position())
    }
}

/// Locomotion FSM
#[derive(Debug, Clone)]
pub struct MovementStateMachine {
    tuning: MovementTuning,
    state: CharacterState,
    stamina: Stamina,
    /// Latch: переключается crouch_toggle edge
    crouch_held: bool,
    /// Dash / Jumping
    timer: StateTimer,
    /// Горизонталь dash, захваченная на входе
    dash_velocity: Vec3,
    /// InAir аккумулятор (world space)
    air_velocity: Vec3,
    wall_jumps: u32,
    slide_direction: Vec3,
    slide_speed: f32,
    wall: WallOutcome,
}

impl MovementStateMachine {
    pub fn new(tuning: MovementTuning) -> Self {
        let stamina = Stamina::new(tuning.max_stamina);
        Self {
            tuning,
            state: CharacterState::Idle,
            stamina,
            crouch_held: false,
            timer: StateTimer::new(),
            dash_velocity: Vec3::ZERO,
            air_velocity: Vec3::ZERO,
            wall_jumps: 0,
            slide_direction: Vec3::ZERO,
            slide_speed: 0.0,
            wall: WallOutcome::default(),
        }
    }

    pub fn state(&self) -> CharacterState {
        self.state
    }

    pub fn stamina(&self) -> u32 {
        self.stamina.current()
    }

    pub fn crouch_held(&self) -> bool {
        self.crouch_held
    }

    pub fn tuning(&self) -> &MovementTuning {
        &self.tuning
    }

    /// Скорость slide (для HUD/тестов)
    pub fn slide_speed(&self) -> f32 {
        self.slide_speed
    }

    pub fn wall_jumps(&self) -> u32 {
        self.wall_jumps
    }

    /// Движемся по стене в этом tick (slide или run)
    pub fn on_wall(&self) -> bool {
        self.state == CharacterState::InAir && self.wall.on_wall()
    }

    pub fn is_wall_running(&self) -> bool {
        self.state == CharacterState::InAir && self.wall.wall_running
    }

    pub fn toggle_crouch(&mut self) {
        self.crouch_held = !self.crouch_held;
    }

    /// Host lifecycle: единственный вход в Dead
    pub fn kill(&mut self) -> Option<Transition> {
        if self.state == CharacterState::Dead {
            return None;
        }
        let transition = Transition {
            from: self.state,
            to: CharacterState::Dead,
        };
        self.state = CharacterState::Dead;
        logger::log(&format!("Movement: {}", transition));
        Some(transition)
    }

    /// Свежий вход после возврата ownership (grapple/combat)
    ///
    /// В воздухе → InAir (аккумулятор = текущая velocity тела), иначе Idle.
    pub fn resume(&mut self, ctx: &mut MovementContext<'_>) -> Option<Transition> {
        if self.state == CharacterState::Dead {
            return None;
        }

        let to = if ctx.is_grounded() {
            CharacterState::Idle
        } else {
            CharacterState::InAir
        };
        let transition = Transition {
            from: self.state,
            to,
        };
        self.enter(to, 0.0, InputSample::default(), ctx);
        logger::log(&format!("Movement resume: {}", transition));
        Some(transition)
    }

    /// Один tick FSM
    pub fn advance(
        &mut self,
        dt: f32,
        input: InputSample,
        ctx: &mut MovementContext<'_>,
    ) -> Option<Transition> {
        if self.state == CharacterState::Dead {
            return None;
        }

        let grounded = ctx.is_grounded();
        self.update(dt, input, ctx, grounded);

        let to = self.next_state(input, grounded)?;
        let transition = Transition {
            from: self.state,
            to,
        };
        self.enter(to, dt, input, ctx);
        logger::log(&format!("Movement: {}", transition));
        Some(transition)
    }

    // ========================================================================
    // Update (physical step активного состояния)
    // ========================================================================

    fn update(&mut self, dt: f32, input: InputSample, ctx: &mut MovementContext<'_>, grounded: bool) {
        if self.state.is_resting() {
            self.stamina.refill();
        }

        let body_velocity = ctx.body.velocity();

        match self.state {
            CharacterState::Idle => {
                ctx.body.set_velocity(Vec3::Y * body_velocity.y);
            }
            CharacterState::Running => {
                let local = Vec3::new(
                    input.move_axis.x * self.tuning.movement_speed,
                    0.0,
                    input.move_axis.y * self.tuning.movement_speed,
                );
                let velocity = ctx.local_to_world(local);
                ctx.body.set_velocity(velocity);
            }
            CharacterState::Dash => {
                // Entry tick уже засчитан: при dash_time <= dt окно закрылось на нём
                if self.timer.reached(self.tuning.dash_time) {
                    ctx.body.set_velocity(Vec3::Y * body_velocity.y);
                } else {
                    self.timer.tick(dt);
                    ctx.body.set_velocity(self.dash_velocity + Vec3::Y * body_velocity.y);
                }
            }
            CharacterState::Jumping => {
                // Баллистика: velocity задана на входе
                self.timer.tick(dt);
            }
            CharacterState::InAir => {
                self.update_in_air(dt, input, ctx, body_velocity);
            }
            CharacterState::Slide => {
                self.update_slide(dt, input, ctx, grounded, body_velocity);
            }
            CharacterState::Crouch => {
                ctx.body.set_velocity(Vec3::Y * body_velocity.y);
            }
            CharacterState::Dead => {}
        }
    }

    fn update_in_air(
        &mut self,
        dt: f32,
        input: InputSample,
        ctx: &mut MovementContext<'_>,
        body_velocity: Vec3,
    ) {
        let wish = ctx.wish(input.move_axis);
        let horizontal = air_accelerate(self.air_velocity, wish, dt, &self.tuning);
        let mut velocity = horizontal + Vec3::Y * body_velocity.y;

        self.wall = WallOutcome::default();
        if let Some(contact) = ctx.wall_contact {
            let wall = WallInput {
                contact,
                position: ctx.body.position(),
                forward: ctx.forward,
                axis: input.move_axis,
                wish,
                jump: input.jump,
                probe: ctx.probe,
            };
            let (next, outcome) =
                apply_wall_behaviour(velocity, &wall, &mut self.wall_jumps, &self.tuning);
            velocity = next;
            self.wall = outcome;

            if outcome.wall_jumped {
                logger::log(&format!(
                    "Movement: wall jump {}/{}",
                    self.wall_jumps, self.tuning.max_wall_jumps
                ));
            }
        }

        let velocity = clamp_horizontal(velocity, self.tuning.max_air_speed);
        self.air_velocity = velocity;
        ctx.body.set_velocity(velocity);
    }

    fn update_slide(
        &mut self,
        dt: f32,
        input: InputSample,
        ctx: &mut MovementContext<'_>,
        grounded: bool,
        body_velocity: Vec3,
    ) {
        let mut decay = self.tuning.slide_decay;
        if grounded && body_velocity.y < 0.0 {
            decay += body_velocity.y.abs() * self.tuning.slide_fall_multiplier * dt;
        }
        let decay = decay.clamp(0.0, 1.0);
        // lerp(speed, 0, decay)
        self.slide_speed = (self.slide_speed * (1.0 - decay)).max(0.0);

        let steer = ctx.wish(input.move_axis)
            * self.tuning.movement_speed
            * self.tuning.slide_movement_multiplier;
        let vertical = body_velocity.y - self.tuning.slide_fall_increase * dt;

        ctx.body
            .set_velocity(self.slide_direction * self.slide_speed + steer + Vec3::Y * vertical);
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    fn next_state(&self, input: InputSample, grounded: bool) -> Option<CharacterState> {
        use CharacterState::*;

        // Dash: высший приоритет, из любого живого состояния кроме самого Dash
        if input.dash && self.state != Dash {
            if self.stamina.can_dash() {
                return Some(Dash);
            }
            logger::log("Movement: dash declined (no stamina)");
        }

        let has_input = input.has_move_input();
        let slide_ready = self.crouch_held && grounded;
        let jump_ready = input.jump && grounded;

        match self.state {
            Idle => {
                if has_input {
                    Some(Running)
                } else if slide_ready {
                    Some(Slide)
                } else if jump_ready {
                    Some(Jumping)
                } else {
                    None
                }
            }
            Running => {
                if !has_input {
                    Some(Idle)
                } else if slide_ready {
                    Some(Slide)
                } else if jump_ready {
                    Some(Jumping)
                } else if !grounded {
                    Some(InAir)
                } else {
                    None
                }
            }
            Dash => {
                if !self.timer.reached(self.tuning.dash_time) {
                    None
                } else if grounded {
                    Some(Idle)
                } else {
                    Some(InAir)
                }
            }
            Jumping => self
                .timer
                .reached(self.tuning.jump_hold_time)
                .then_some(InAir),
            InAir => grounded.then_some(Idle),
            Slide => {
                if !self.crouch_held {
                    Some(Idle)
                } else if jump_ready {
                    Some(Jumping)
                } else if self.slide_speed < self.tuning.crouch_enter_speed && !has_input {
                    Some(Crouch)
                } else {
                    None
                }
            }
            Crouch => {
                if !self.crouch_held {
                    Some(Idle)
                } else if !grounded {
                    Some(InAir)
                } else {
                    None
                }
            }
            Dead => None,
        }
    }

    /// Entry нового состояния (exit у состояний пустой)
    fn enter(
        &mut self,
        to: CharacterState,
        dt: f32,
        input: InputSample,
        ctx: &mut MovementContext<'_>,
    ) {
        self.state = to;
        self.wall = WallOutcome::default();

        match to {
            CharacterState::Dash => {
                self.stamina.consume();
                // Entry tick тоже шаг на dash скорости
                self.timer.reset();
                self.timer.tick(dt);
                self.dash_velocity = ctx.local_to_world(Vec3::new(
                    input.move_axis.x * self.tuning.dash_force,
                    0.0,
                    input.move_axis.y * self.tuning.dash_force,
                ));
                let vertical = ctx.body.velocity().y;
                ctx.body.set_velocity(self.dash_velocity + Vec3::Y * vertical);
            }
            CharacterState::Jumping => {
                self.timer.reset();
                let velocity = ctx.local_to_world(Vec3::new(
                    input.move_axis.x * self.tuning.movement_speed,
                    self.tuning.jump_force,
                    input.move_axis.y * self.tuning.movement_speed,
                ));
                ctx.body.set_velocity(velocity);
            }
            CharacterState::InAir => {
                self.air_velocity = ctx.body.velocity();
                self.wall_jumps = 0;
            }
            CharacterState::Slide => {
                self.slide_direction = flatten(ctx.forward).normalize_or_zero();
                self.slide_speed = self.tuning.slide_speed * input.move_axis.y.max(0.0);
            }
            CharacterState::Idle
            | CharacterState::Running
            | CharacterState::Crouch
            | CharacterState::Dead => {}
        }
    }
}
