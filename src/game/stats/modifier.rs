use serde::{Deserialize, Serialize};

use super::base::BaseStats;
use super::effective::EffectiveStats;
use super::types::HitPoints;

/// A single stat modifier.
///
/// `replace` swaps the base value out entirely (an equipped weapon's damage
/// replaces the bare-hands damage); `add` applies afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatModifier {
    pub replace: Option<f32>,
    pub add: f32,
}

impl StatModifier {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn replacing(value: f32) -> Self {
        Self {
            replace: Some(value),
            ..Self::identity()
        }
    }

    pub fn adding(value: f32) -> Self {
        Self {
            add: value,
            ..Self::identity()
        }
    }

    pub fn apply(&self, base: f32) -> f32 {
        self.replace.unwrap_or(base) + self.add
    }

    fn merge(&mut self, other: &StatModifier) {
        if other.replace.is_some() {
            self.replace = other.replace;
        }
        self.add += other.add;
    }
}

/// Collection of modifiers for all player stat fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifierSet {
    pub max_health: StatModifier,
    pub damage: StatModifier,
    pub speed: StatModifier,
    pub armor: StatModifier,
}

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another modifier set into this one.
    pub fn merge(&mut self, other: &ModifierSet) {
        self.max_health.merge(&other.max_health);
        self.damage.merge(&other.damage);
        self.speed.merge(&other.speed);
        self.armor.merge(&other.armor);
    }

    /// Compute EffectiveStats from BaseStats + this modifier set.
    pub fn compute_effective(&self, base: &BaseStats) -> EffectiveStats {
        EffectiveStats {
            max_health: HitPoints::new(self.max_health.apply(base.max_health.0).max(1.0)),
            damage: self.damage.apply(base.damage).max(0.0),
            speed: self.speed.apply(base.speed).max(0.0),
            armor: self.armor.apply(base.armor).max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_leaves_base_untouched() {
        let eff = ModifierSet::new().compute_effective(&BaseStats::default());
        assert_eq!(eff, EffectiveStats::default());
    }

    #[test]
    fn replace_wins_over_base_and_add_stacks() {
        let mut set = ModifierSet::new();
        set.damage = StatModifier::replacing(4.0);
        let mut bonus = ModifierSet::new();
        bonus.max_health = StatModifier::adding(20.0);
        bonus.damage = StatModifier::adding(0.5);
        set.merge(&bonus);

        let eff = set.compute_effective(&BaseStats::default());
        assert_eq!(eff.damage, 4.5);
        assert_eq!(eff.max_health.0, 120.0);
    }
}
