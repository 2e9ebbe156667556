//! Combat: melee attack window
//!
//! Архитектура:
//! - `AttackWindow` — таймерное окно атаки (velocity override + forward ray)
//! - `CombatSubsystem` — владеет окном, отдаёт `HitEvent` наружу
//! - `HitPolicy` — PerTick (default) / OncePerTarget
//!
//! Реакция врага на удар (анимации, урон по здоровью) — на стороне host.

pub mod attack;
pub mod subsystem;

mod subsystem_tests;

pub use attack::{AttackWindow, HitEvent, HitPolicy};
pub use subsystem::{CombatSubsystem, CombatTick};
