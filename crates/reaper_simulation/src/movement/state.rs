//! CharacterState + Transition

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Режим locomotion (ровно один активен)
///
/// Меняется только переходами state machine, кроме `kill()` (единственный вход в Dead).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Reflect)]
pub enum CharacterState {
    #[default]
    Idle,
    Running,
    Dash,
    InAir,
    Jumping,
    Slide,
    Crouch,
    Dead,
}

impl CharacterState {
    /// Состояния, в которых stamina восполняется до максимума
    pub fn is_resting(self) -> bool {
        matches!(self, Self::Idle | Self::Running | Self::Slide)
    }

    pub fn is_alive(self) -> bool {
        self != Self::Dead
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Dash => "Dash",
            Self::InAir => "InAir",
            Self::Jumping => "Jumping",
            Self::Slide => "Slide",
            Self::Crouch => "Crouch",
            Self::Dead => "Dead",
        }
    }
}

impl fmt::Display for CharacterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Переход, применённый за tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: CharacterState,
    pub to: CharacterState,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from, self.to)
    }
}
