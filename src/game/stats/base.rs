use serde::{Deserialize, Serialize};

use super::types::HitPoints;

/// Immutable base parameters for the player avatar, before equipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseStats {
    pub max_health: HitPoints,
    /// Melee damage with no weapon equipped.
    pub damage: f32,
    /// Movement per tick in world units.
    pub speed: f32,
    pub armor: f32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            max_health: HitPoints(100.0),
            damage: 1.0,
            speed: 0.1,
            armor: 0.0,
        }
    }
}
