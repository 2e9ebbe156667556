//! Movement domain: locomotion FSM персонажа
//!
//! Содержит:
//! - CharacterState / Transition
//! - MovementStateMachine (Idle/Running/Dash/InAir/Jumping/Slide/Crouch/Dead)
//! - Stamina (заряды dash)
//! - LookState (yaw тела, pitch камеры)
//! - air: air control, wall jump/slide/run, ledge

pub mod air;
pub mod look;
pub mod machine;
pub mod stamina;
pub mod state;

mod machine_tests;

pub use look::{camera_tilt, LookState};
pub use machine::{MovementContext, MovementStateMachine};
pub use stamina::Stamina;
pub use state::{CharacterState, Transition};
