//! Collision layers
//!
//! Битовые маски слоёв — общие для ядра, sandbox мира и Rapier адаптера.
//!
//! ## Layers:
//! - Layer 1 (0b1 = 1): Player (сам персонаж — ground/grapple rays его игнорируют)
//! - Layer 2 (0b10 = 2): Environment (пол, платформы)
//! - Layer 3 (0b100 = 4): Wall (стены для wall jump / wall run / grapple)
//! - Layer 4 (0b1000 = 8): Enemy (цели melee атаки)

use serde::{Deserialize, Serialize};

/// 32-bit маска слоёв
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub const PLAYER: LayerMask = LayerMask(0b1);
    pub const ENVIRONMENT: LayerMask = LayerMask(0b10);
    pub const WALL: LayerMask = LayerMask(0b100);
    pub const ENEMY: LayerMask = LayerMask(0b1000);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn union(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }

    /// Все слои кроме `other` (аналог `~(1 << layer)`)
    pub const fn except(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 & !other.0)
    }

    pub const fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        self.union(rhs)
    }
}

/// Mask: ground probe — всё кроме самого игрока
pub const GROUND_PROBE_MASK: LayerMask = LayerMask::ALL.except(LayerMask::PLAYER);

/// Mask: grapple search ray — всё кроме самого игрока
pub const GRAPPLE_SEARCH_MASK: LayerMask = LayerMask::ALL.except(LayerMask::PLAYER);

/// Mask: ledge rays
pub const LEDGE_PROBE_MASK: LayerMask = LayerMask::WALL;

/// Mask: melee ray — только враги
pub const ATTACK_MASK: LayerMask = LayerMask::ENEMY;
