//! REAPER Simulation Core
//!
//! Locomotion персонажа от первого лица: fixed-tick FSM движения, grapple,
//! melee атака и арбитр velocity (`CharacterController`).
//!
//! Архитектура:
//! - Ядро (movement/grapple/combat/controller) НЕ зависит от ECS и физики:
//!   world доступен только через `CollisionProbe` + `RigidBody`
//! - `SandboxWorld` = детерминированный host для тестов и headless бинарника
//! - `LocomotionPlugin` = host для Bevy + Rapier (FixedUpdate 60Hz),
//!   `SimulationPlugin`/`create_headless_app` собирают его вместе с Rapier

use bevy::prelude::*;
use bevy_rapier3d::prelude::{NoUserData, RapierPhysicsPlugin, TimestepMode};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod combat;
pub mod config;
pub mod controller;
pub mod grapple;
pub mod input;
pub mod logger;
pub mod movement;
pub mod physics;
pub mod plugin;
pub mod timer;

// Re-export базовых типов для удобства
pub use combat::{CombatSubsystem, HitEvent, HitPolicy};
pub use config::{ConfigError, LocomotionTuning};
pub use controller::{CharacterController, GrappleEvent, TickReport, VelocityOwner};
pub use grapple::{GrappleState, GrappleSubsystem};
pub use input::{BufferedInput, InputSample, InputSource, ScriptedInput};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use movement::{CharacterState, LookState, MovementStateMachine, Transition};
pub use physics::{CollisionProbe, LayerMask, RayHit, RigidBody, SandboxWorld, SurfaceTag};
pub use plugin::{LocomotionController, LocomotionPlugin, PlayerInput};

/// Частота fixed tick симуляции
pub const SIMULATION_HZ: f64 = 60.0;

/// Главный plugin симуляции: fixed timestep + Rapier в FixedUpdate + locomotion
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let dt = (1.0 / SIMULATION_HZ) as f32;
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(SIMULATION_HZ))
            // Rapier шагает ровно на fixed dt (Variable режим зависит от wall clock)
            .insert_resource(TimestepMode::Fixed { dt, substeps: 1 })
            // ВАЖНО: locomotion раньше Rapier, иначе add_event::<CollisionEvent>
            // увидит готовый resource и не зарегистрирует его update
            .add_plugins(LocomotionPlugin)
            .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule());
    }
}

/// Детерминистичный RNG (seeded): scripted input для headless прогонов и тестов
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции (без рендера)
pub fn create_headless_app() -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins((MinimalPlugins, TransformPlugin))
        .add_plugins(SimulationPlugin);

    app
}

/// Один fixed tick вручную, независимо от wall clock
///
/// `App::update` гоняет FixedUpdate по реальному времени; headless прогону
/// нужен ровно один шаг на вызов.
pub fn run_fixed_tick(app: &mut App) {
    app.world_mut().run_schedule(FixedUpdate);
}
