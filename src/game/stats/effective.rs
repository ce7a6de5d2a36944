use serde::{Deserialize, Serialize};

use super::types::HitPoints;

/// Stats derived from base + equipment. Recomputed on every equip change,
/// read during ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveStats {
    pub max_health: HitPoints,
    pub damage: f32,
    pub speed: f32,
    pub armor: f32,
}

impl Default for EffectiveStats {
    fn default() -> Self {
        Self {
            max_health: HitPoints(100.0),
            damage: 1.0,
            speed: 0.1,
            armor: 0.0,
        }
    }
}
