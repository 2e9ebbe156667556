//! Grapple: поиск якоря + упругая тяга
//!
//! Архитектура:
//! - Searching: виртуальный якорь летит из камеры по лучу (search_speed, range)
//! - Pulling: kick к якорю + `TetherJoint` (spring-damper вне [min, max])
//! - Release: новый grapple edge / опциональный timeout / опциональная дистанция
//!
//! Рендер верёвки — host, по `tether_endpoints()`.

pub mod subsystem;
pub mod tether;


pub use subsystem::{GrappleState, GrappleSubsystem, PullOutcome, ReleaseReason, SearchOutcome};
pub use tether::{GrappleTether, TetherJoint, TetherPhase};
